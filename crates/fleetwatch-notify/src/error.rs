//! Error types for the notification system

/// Notification error type
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    TelegramError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Notifier not configured")]
    NotConfigured,
}

/// Result type alias for notification operations
pub type Result<T> = std::result::Result<T, NotifyError>;

impl NotifyError {
    pub fn telegram<S: Into<String>>(msg: S) -> Self {
        NotifyError::TelegramError(msg.into())
    }
}
