//! Conversation thread plus the form state that feeds it.

use crate::{
    error::{FluxError, Result},
    fal::ImageGenerator,
    logger,
    models::{ImageGenerationResponse, ImageGenerationSettings, Message, QueueStatus},
};

pub const AI_REPLY_TEXT: &str = "Here's the image I generated based on your prompt:";
pub const AI_FAILURE_TEXT: &str = "Sorry, I couldn't generate an image. Please try again.";

/// Settings snapshot taken when a prompt is sent.
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    pub settings: ImageGenerationSettings,
}

#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<Message>,
    pub settings: ImageGenerationSettings,
    generating: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn can_send(&self) -> bool {
        !self.generating && !self.settings.prompt.trim().is_empty()
    }

    /// Appends the user's prompt and marks a request as in flight. Returns
    /// `None` when the prompt is blank or a request is already running.
    pub fn begin_send(&mut self) -> Option<PendingGeneration> {
        if !self.can_send() {
            return None;
        }
        self.messages.push(Message::user(self.settings.prompt.clone()));
        self.generating = true;
        Some(PendingGeneration {
            settings: self.settings.clone(),
        })
    }

    /// Records the outcome of the request started by [`begin_send`](Self::begin_send).
    pub fn finish(
        &mut self,
        pending: &PendingGeneration,
        result: Result<ImageGenerationResponse>,
    ) -> &Message {
        let message = match result {
            Ok(response) => Message::ai(
                AI_REPLY_TEXT,
                response.image_urls(),
                Some(pending.settings.prompt.clone()),
            ),
            Err(e) => {
                log::error!("Error generating image: {}", e);
                Message::ai(AI_FAILURE_TEXT, Vec::new(), Some(pending.settings.prompt.clone()))
            }
        };
        self.generating = false;
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Sends the current prompt through `generator` and waits for the reply.
    pub async fn send<G: ImageGenerator + ?Sized>(
        &mut self,
        generator: &G,
        on_update: &mut (dyn for<'q> FnMut(&'q QueueStatus) + Send),
    ) -> Option<&Message> {
        let pending = self.begin_send()?;
        let timer = logger::timer("image generation");
        let result = generator.generate(&pending.settings, on_update).await;
        timer.stop();
        Some(self.finish(&pending, result))
    }

    /// Clears the thread. Refused while a request is in flight.
    pub fn end_chat(&mut self) -> Result<()> {
        if self.generating {
            return Err(FluxError::InvalidSetting(
                "cannot end the chat while an image is generating".into(),
            ));
        }
        self.messages.clear();
        Ok(())
    }

    /// Restores default parameters, keeping the prompt.
    pub fn reset_settings(&mut self) {
        let prompt = std::mem::take(&mut self.settings.prompt);
        self.settings = ImageGenerationSettings::new(prompt);
    }

    pub fn message(&self, id: uuid::Uuid) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeneratedImage, Sender};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeGenerator {
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeGenerator {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ImageGenerator for FakeGenerator {
        async fn generate(
            &self,
            settings: &ImageGenerationSettings,
            on_update: &mut (dyn for<'q> FnMut(&'q QueueStatus) + Send),
        ) -> Result<ImageGenerationResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            on_update(&QueueStatus::InQueue {
                queue_position: Some(0),
            });
            on_update(&QueueStatus::Completed { logs: None });
            if self.fail {
                return Err(FluxError::ApiError {
                    status: 500,
                    message: "boom".into(),
                });
            }
            Ok(ImageGenerationResponse {
                images: (0..settings.num_images)
                    .map(|i| GeneratedImage {
                        url: format!("https://fal.media/files/{}.jpg", i),
                        width: None,
                        height: None,
                        content_type: None,
                    })
                    .collect(),
                seed: Some(7),
                has_nsfw_concepts: vec![],
                prompt: Some(settings.prompt.clone()),
                timings: None,
            })
        }

        fn model_id(&self) -> &str {
            "fake"
        }
    }

    #[tokio::test]
    async fn test_send_success_appends_reply_with_images() {
        let generator = FakeGenerator::new(false);
        let mut session = ChatSession::new();
        session.settings.prompt = "a lighthouse at dusk".into();
        session.settings.num_images = 2;

        let mut updates = Vec::new();
        let reply = session
            .send(&generator, &mut |status| updates.push(status.clone()))
            .await
            .cloned()
            .unwrap();

        assert_eq!(reply.sender, Sender::Ai);
        assert_eq!(reply.text, AI_REPLY_TEXT);
        assert_eq!(reply.image_urls.len(), 2);
        assert_eq!(reply.prompt.as_deref(), Some("a lighthouse at dusk"));
        assert_eq!(updates.len(), 2);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].sender, Sender::User);
        assert!(!session.is_generating());
    }

    #[tokio::test]
    async fn test_send_failure_appends_apology() {
        let generator = FakeGenerator::new(true);
        let mut session = ChatSession::new();
        session.settings.prompt = "anything".into();

        let reply = session.send(&generator, &mut |_| {}).await.cloned().unwrap();
        assert_eq!(reply.text, AI_FAILURE_TEXT);
        assert!(reply.image_urls.is_empty());
        assert!(!session.is_generating());
    }

    #[tokio::test]
    async fn test_blank_prompt_is_ignored() {
        let generator = FakeGenerator::new(false);
        let mut session = ChatSession::new();
        session.settings.prompt = "   ".into();

        assert!(session.send(&generator, &mut |_| {}).await.is_none());
        assert!(session.messages().is_empty());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_single_request_in_flight() {
        let mut session = ChatSession::new();
        session.settings.prompt = "first".into();

        let pending = session.begin_send().unwrap();
        assert!(session.is_generating());
        assert!(session.begin_send().is_none());
        assert!(session.end_chat().is_err());

        session.finish(&pending, Err(FluxError::RequestError("offline".into())));
        assert!(!session.is_generating());
        assert!(session.begin_send().is_some());
    }

    #[test]
    fn test_end_chat_and_reset_settings() {
        let mut session = ChatSession::new();
        session.settings.prompt = "keep me".into();
        session.settings.num_inference_steps = 40;
        let pending = session.begin_send().unwrap();
        session.finish(&pending, Err(FluxError::RequestError("x".into())));
        assert_eq!(session.messages().len(), 2);

        session.end_chat().unwrap();
        assert!(session.messages().is_empty());

        session.reset_settings();
        assert_eq!(session.settings.prompt, "keep me");
        assert_eq!(session.settings.num_inference_steps, 28);
    }
}
