use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Automation error: {0}")]
    Automation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FeedError {
    pub fn automation(message: impl Into<String>) -> Self {
        FeedError::Automation(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        FeedError::Config(message.into())
    }

    /// True for failures of a single page primitive (element missing, read
    /// failed). These are contained at the actuator boundary and reported as
    /// diagnostics; only session-level failures abort the run.
    pub fn is_primitive_failure(&self) -> bool {
        matches!(self, FeedError::Automation(_))
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
