use crate::{
    error::Result,
    models::{ImageGenerationResponse, ImageGenerationSettings, QueueStatus},
};
use async_trait::async_trait;

/// Anything that can turn a settings snapshot into generated images.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(
        &self,
        settings: &ImageGenerationSettings,
        on_update: &mut (dyn for<'q> FnMut(&'q QueueStatus) + Send),
    ) -> Result<ImageGenerationResponse>;

    fn model_id(&self) -> &str;
}
