use serde::{Deserialize, Serialize};

/// Returned by the queue when a request is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSubmission {
    pub request_id: String,
    pub status_url: String,
    pub response_url: String,
    #[serde(default)]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueLog {
    pub message: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    InQueue {
        #[serde(default)]
        queue_position: Option<u32>,
    },
    InProgress {
        #[serde(default)]
        logs: Option<Vec<QueueLog>>,
    },
    Completed {
        #[serde(default)]
        logs: Option<Vec<QueueLog>>,
    },
}

impl QueueStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, QueueStatus::Completed { .. })
    }

    pub fn logs(&self) -> &[QueueLog] {
        match self {
            QueueStatus::InProgress { logs: Some(logs) }
            | QueueStatus::Completed { logs: Some(logs) } => logs,
            _ => &[],
        }
    }

    /// One-line summary for the status bar.
    pub fn summary(&self) -> String {
        match self {
            QueueStatus::InQueue {
                queue_position: Some(position),
            } => format!("In queue (position {})", position),
            QueueStatus::InQueue { queue_position: None } => "In queue".to_string(),
            QueueStatus::InProgress { .. } => match self.logs().last() {
                Some(log) => format!("In progress: {}", log.message),
                None => "In progress".to_string(),
            },
            QueueStatus::Completed { .. } => "Completed".to_string(),
        }
    }
}
