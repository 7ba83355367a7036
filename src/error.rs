use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViduError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Rejected before any request was sent.
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Task {task_id} failed with state '{state}'")]
    TaskFailed { task_id: String, state: String },

    #[error("Task {task_id} still pending after {attempts} attempts")]
    PollTimeout { task_id: String, attempts: u32 },

    #[error("Polling was cancelled by a newer submission")]
    PollCancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ViduError {
    /// True for errors raised before anything touched the network.
    pub fn is_client_side(&self) -> bool {
        matches!(self, ViduError::ValidationError(_) | ViduError::ConfigError(_))
    }
}

impl From<reqwest::Error> for ViduError {
    fn from(e: reqwest::Error) -> Self {
        ViduError::RequestError(e.to_string())
    }
}

impl From<serde_json::Error> for ViduError {
    fn from(e: serde_json::Error) -> Self {
        ViduError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ViduError>;
