use thiserror::Error;

#[derive(Debug, Error)]
pub enum FluxError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<reqwest::Error> for FluxError {
    fn from(e: reqwest::Error) -> Self {
        FluxError::RequestError(e.to_string())
    }
}

impl From<serde_json::Error> for FluxError {
    fn from(e: serde_json::Error) -> Self {
        FluxError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for FluxError {
    fn from(e: std::io::Error) -> Self {
        FluxError::IoError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FluxError>;
