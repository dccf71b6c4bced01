use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Prompt that produced this message; set on AI replies so it can be reused.
    #[serde(default)]
    pub prompt: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text.into(), Vec::new(), None)
    }

    pub fn ai(text: impl Into<String>, image_urls: Vec<String>, prompt: Option<String>) -> Self {
        Self::new(Sender::Ai, text.into(), image_urls, prompt)
    }

    fn new(sender: Sender, text: String, image_urls: Vec<String>, prompt: Option<String>) -> Self {
        Message {
            id: Uuid::new_v4(),
            sender,
            text,
            image_urls,
            prompt,
            created_at: Utc::now(),
        }
    }

    pub fn has_images(&self) -> bool {
        !self.image_urls.is_empty()
    }
}
