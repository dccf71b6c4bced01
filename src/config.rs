use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{FluxError, Result};
use crate::logger::LogLevel;

pub const DEFAULT_MODEL: &str = "fal-ai/flux/dev";
pub const DEFAULT_QUEUE_URL: &str = "https://queue.fal.run";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct FalConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub queue_url: String,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub fal: FalConfig,
    pub output_dir: PathBuf,
    pub log_file: String,
    pub log_level: LogLevel,
}

impl Default for FalConfig {
    fn default() -> Self {
        FalConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            queue_url: DEFAULT_QUEUE_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl FalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = FalConfig::default();
        let api_key = env::var("FAL_KEY").ok().filter(|k| !k.trim().is_empty());
        let model = env::var("FAL_MODEL").unwrap_or(defaults.model);
        let queue_url = env::var("FAL_QUEUE_URL").unwrap_or(defaults.queue_url);
        let poll_interval = env::var("FLUXCHAT_POLL_INTERVAL_MS")
            .ok()
            .and_then(|ms| ms.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        FalConfig {
            api_key,
            model,
            queue_url,
            poll_interval,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_queue_url(mut self, queue_url: impl Into<String>) -> Self {
        self.queue_url = queue_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            fal: FalConfig::default(),
            output_dir: PathBuf::from("generated"),
            log_file: "fluxchat.log".to_string(),
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Config::default();
        let output_dir = env::var("FLUXCHAT_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);
        let log_file = env::var("FLUXCHAT_LOG_FILE").unwrap_or(defaults.log_file);
        let log_level = env::var("FLUXCHAT_LOG_LEVEL")
            .ok()
            .and_then(|level| LogLevel::parse(&level))
            .unwrap_or(defaults.log_level);

        Config {
            fal: FalConfig::from_env(),
            output_dir,
            log_file,
            log_level,
        }
    }

    pub fn with_fal(mut self, config: FalConfig) -> Self {
        self.fal = config;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.fal.api_key.is_none() {
            return Err(FluxError::ConfigError(
                "FAL_KEY is required to call the inference API".into(),
            ));
        }
        if self.fal.model.trim().is_empty() {
            return Err(FluxError::ConfigError("Model id must not be empty".into()));
        }
        Ok(())
    }
}
