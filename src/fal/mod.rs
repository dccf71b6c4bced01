pub mod image_client;
pub mod queue;
pub mod traits;

#[cfg(test)]
mod test_server;

use crate::{
    config::FalConfig,
    error::{FluxError, Result},
};

pub use image_client::ImageClient;
pub use queue::QueueClient;
pub use traits::ImageGenerator;

#[derive(Clone)]
pub struct FalClient {
    queue_client: QueueClient,
    image_client: ImageClient,
}

impl FalClient {
    pub fn new(config: FalConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| FluxError::ConfigError("FAL_KEY is required".into()))?;

        let queue_client = QueueClient::new(api_key, &config.queue_url, config.poll_interval)?;
        let image_client = ImageClient::new(queue_client.clone(), config.model.clone());

        log::info!("fal client ready for model {}", config.model);
        Ok(Self {
            queue_client,
            image_client,
        })
    }

    pub fn queue(&self) -> &QueueClient {
        &self.queue_client
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        assert!(matches!(
            FalClient::new(FalConfig::new()),
            Err(FluxError::ConfigError(_))
        ));
    }

    #[test]
    fn test_builds_with_key() {
        let client = FalClient::new(
            FalConfig::new()
                .with_api_key("id:secret")
                .with_model("fal-ai/flux/schnell"),
        )
        .unwrap();
        assert_eq!(client.image().model_id(), "fal-ai/flux/schnell");
        assert_eq!(
            client.queue().submit_url("fal-ai/flux/schnell"),
            "https://queue.fal.run/fal-ai/flux/schnell"
        );
    }
}
