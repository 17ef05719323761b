//! Common error types for the image generation client

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Subject description is empty")]
    EmptySubject,

    #[error("A generation request is already in flight")]
    Busy,

    #[error("Backend at {endpoint} rejected the request: {reason}")]
    RequestRejected {
        endpoint: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("Backend at {endpoint} is unreachable: {reason}")]
    Unreachable { endpoint: String, reason: String },

    #[error("Timeout after {after_ms}ms waiting for {endpoint}")]
    Timeout { endpoint: String, after_ms: u64 },

    #[error("History unavailable: {0}")]
    HistoryUnavailable(String),

    #[error("Unknown history entry: {0}")]
    UnknownHistoryEntry(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the shell should show this error to the user.
    ///
    /// Generation failures are user-visible; history failures and empty
    /// submissions are not.
    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            AppError::HistoryUnavailable(_) | AppError::EmptySubject
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
