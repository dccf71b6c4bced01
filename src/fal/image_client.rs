use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{
    error::{FluxError, Result},
    fal::{queue::QueueClient, traits::ImageGenerator},
    models::{ImageGenerationResponse, ImageGenerationSettings, QueueStatus},
};

#[derive(Clone)]
pub struct ImageClient {
    queue: QueueClient,
    model: String,
}

impl ImageClient {
    pub fn new(queue: QueueClient, model: impl Into<String>) -> Self {
        Self {
            queue,
            model: model.into(),
        }
    }

    pub fn supported_models() -> Vec<(&'static str, &'static str)> {
        vec![
            ("fal-ai/flux/dev", "FLUX.1 [dev]"),
            ("fal-ai/flux/schnell", "FLUX.1 [schnell]"),
            ("fal-ai/flux-pro", "FLUX.1 [pro]"),
        ]
    }

    /// Bytes of a generated image. Sync-mode results arrive as `data:` URIs;
    /// everything else is downloaded.
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        if url.starts_with("data:") {
            return decode_data_uri(url);
        }

        let response = self
            .queue
            .http()
            .get(url)
            .send()
            .await
            .map_err(|e| FluxError::RequestError(format!("Image download failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FluxError::ApiError {
                status: response.status().as_u16(),
                message: format!("Image download failed for {}", url),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate(
        &self,
        settings: &ImageGenerationSettings,
        on_update: &mut (dyn for<'q> FnMut(&'q QueueStatus) + Send),
    ) -> Result<ImageGenerationResponse> {
        settings.validate()?;
        log::info!(
            "Generating {} image(s) with {} ({}, {} steps)",
            settings.num_images,
            self.model,
            settings.image_size,
            settings.num_inference_steps
        );

        let response: ImageGenerationResponse =
            self.queue.subscribe(&self.model, settings, on_update).await?;

        if response.images.is_empty() {
            return Err(FluxError::ResponseError("No images generated".into()));
        }
        if response.has_nsfw_concepts.iter().any(|flagged| *flagged) {
            log::warn!("Safety checker flagged at least one generated image");
        }
        Ok(response)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Decodes `data:<mime>;base64,<payload>`.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| FluxError::ResponseError("Not a data URI".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| FluxError::ResponseError("Malformed data URI".into()))?;
    if !meta.ends_with(";base64") {
        return Err(FluxError::ResponseError(format!(
            "Unsupported data URI encoding: {}",
            meta
        )));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| FluxError::ResponseError(format!("Invalid base64 image data: {}", e)))
}

/// File extension for an image URL, defaulting to `jpg`.
pub fn image_extension(url: &str) -> &'static str {
    let probe = if let Some(rest) = url.strip_prefix("data:") {
        rest.split(';').next().unwrap_or_default()
    } else {
        url.split(['?', '#']).next().unwrap_or_default()
    };
    let probe = probe.to_ascii_lowercase();
    if probe.ends_with("png") {
        "png"
    } else if probe.ends_with("webp") {
        "webp"
    } else {
        "jpg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_uri() {
        let bytes = decode_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("https://fal.media/a.png").is_err());
        assert!(decode_data_uri("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("https://fal.media/files/x.png?sig=1"), "png");
        assert_eq!(image_extension("data:image/webp;base64,AAAA"), "webp");
        assert_eq!(image_extension("https://fal.media/files/x"), "jpg");
    }

    #[test]
    fn test_supported_models_contains_default() {
        assert!(ImageClient::supported_models()
            .iter()
            .any(|(id, _)| *id == crate::config::DEFAULT_MODEL));
    }

    #[tokio::test]
    async fn test_generate_without_images_is_response_error() {
        let server = crate::fal::test_server::TestServer::bind().await;
        let base_url = server.base_url.clone();
        let requests = server.serve(vec![
            (200, crate::fal::test_server::submission(&base_url)),
            (200, r#"{"status":"COMPLETED"}"#.into()),
            (200, r#"{"images":[],"has_nsfw_concepts":[]}"#.into()),
        ]);

        let client = ImageClient::new(QueueClient::local(&base_url), "fal-ai/flux/dev");
        let result = client
            .generate(&ImageGenerationSettings::new("an empty room"), &mut |_| {})
            .await;

        assert!(matches!(result, Err(FluxError::ResponseError(_))));
        assert_eq!(requests.await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_prompt_without_network() {
        let queue = QueueClient::new(
            "id:secret",
            "http://127.0.0.1:9",
            std::time::Duration::from_millis(1),
        )
        .unwrap();
        let client = ImageClient::new(queue, "fal-ai/flux/dev");
        let mut updates = 0;
        let result = client
            .generate(&ImageGenerationSettings::default(), &mut |_| updates += 1)
            .await;
        assert!(matches!(result, Err(FluxError::InvalidSetting(_))));
        assert_eq!(updates, 0);
    }
}
