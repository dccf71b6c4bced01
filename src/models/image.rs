use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FluxError, Result};

pub const STEPS_RANGE: (u32, u32) = (1, 50);
pub const GUIDANCE_RANGE: (f32, f32) = (1.0, 20.0);
pub const GUIDANCE_STEP: f32 = 0.1;
pub const NUM_IMAGES_RANGE: (u32, u32) = (1, 4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "square_hd")]
    SquareHd,
    #[serde(rename = "square")]
    Square,
    #[serde(rename = "portrait_4_3")]
    Portrait4_3,
    #[serde(rename = "portrait_16_9")]
    Portrait16_9,
    #[serde(rename = "landscape_4_3")]
    Landscape4_3,
    #[serde(rename = "landscape_16_9")]
    Landscape16_9,
}

impl ImageSize {
    pub const ALL: [ImageSize; 6] = [
        ImageSize::SquareHd,
        ImageSize::Square,
        ImageSize::Portrait4_3,
        ImageSize::Portrait16_9,
        ImageSize::Landscape4_3,
        ImageSize::Landscape16_9,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::SquareHd => "square_hd",
            ImageSize::Square => "square",
            ImageSize::Portrait4_3 => "portrait_4_3",
            ImageSize::Portrait16_9 => "portrait_16_9",
            ImageSize::Landscape4_3 => "landscape_4_3",
            ImageSize::Landscape16_9 => "landscape_16_9",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input accepted by the FLUX endpoints. Serializes directly as the request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationSettings {
    pub prompt: String,
    pub image_size: ImageSize,
    pub num_inference_steps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub guidance_scale: f32,
    pub sync_mode: bool,
    pub num_images: u32,
    pub enable_safety_checker: bool,
}

impl Default for ImageGenerationSettings {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            image_size: ImageSize::Landscape4_3,
            num_inference_steps: 28,
            seed: None,
            guidance_scale: 3.5,
            sync_mode: false,
            num_images: 1,
            enable_safety_checker: true,
        }
    }
}

impl ImageGenerationSettings {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn adjust_steps(&mut self, delta: i32) {
        let value = self.num_inference_steps as i64 + delta as i64;
        self.num_inference_steps = value.clamp(STEPS_RANGE.0 as i64, STEPS_RANGE.1 as i64) as u32;
    }

    pub fn adjust_guidance(&mut self, ticks: i32) {
        let value = self.guidance_scale + ticks as f32 * GUIDANCE_STEP;
        // Round to one decimal so repeated ticks do not drift.
        let value = (value * 10.0).round() / 10.0;
        self.guidance_scale = value.clamp(GUIDANCE_RANGE.0, GUIDANCE_RANGE.1);
    }

    pub fn adjust_num_images(&mut self, delta: i32) {
        let value = self.num_images as i64 + delta as i64;
        self.num_images =
            value.clamp(NUM_IMAGES_RANGE.0 as i64, NUM_IMAGES_RANGE.1 as i64) as u32;
    }

    /// Empty text and `0` both mean "random".
    pub fn set_seed_text(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            self.seed = None;
            return Ok(());
        }
        let seed: u64 = text
            .parse()
            .map_err(|_| FluxError::InvalidSetting(format!("seed must be a number: {}", text)))?;
        self.seed = if seed == 0 { None } else { Some(seed) };
        Ok(())
    }

    pub fn seed_text(&self) -> String {
        self.seed.map(|s| s.to_string()).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(FluxError::InvalidSetting("prompt is empty".into()));
        }
        if !(STEPS_RANGE.0..=STEPS_RANGE.1).contains(&self.num_inference_steps) {
            return Err(FluxError::InvalidSetting(format!(
                "num_inference_steps out of range: {}",
                self.num_inference_steps
            )));
        }
        if !(GUIDANCE_RANGE.0..=GUIDANCE_RANGE.1).contains(&self.guidance_scale) {
            return Err(FluxError::InvalidSetting(format!(
                "guidance_scale out of range: {}",
                self.guidance_scale
            )));
        }
        if !(NUM_IMAGES_RANGE.0..=NUM_IMAGES_RANGE.1).contains(&self.num_images) {
            return Err(FluxError::InvalidSetting(format!(
                "num_images out of range: {}",
                self.num_images
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageGenerationResponse {
    pub images: Vec<GeneratedImage>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub has_nsfw_concepts: Vec<bool>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub timings: Option<serde_json::Value>,
}

impl ImageGenerationResponse {
    pub fn image_urls(&self) -> Vec<String> {
        self.images.iter().map(|i| i.url.clone()).collect()
    }
}
