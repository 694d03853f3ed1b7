//! Fleetwatch Notification Delivery
//!
//! Provides chat delivery capabilities for rendered alerts via various
//! channels:
//! - Telegram
//! - (Future: Slack, Discord, Webhooks, etc.)

mod error;
pub mod mock;
mod telegram;

pub use error::{NotifyError, Result};
pub use telegram::TelegramNotifier;

use async_trait::async_trait;

/// An inline action button attached to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub url: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Trait for notification delivery backends
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a markdown text message to a chat
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        button: Option<&InlineButton>,
    ) -> Result<()>;

    /// Send a video with a markdown caption to a chat
    async fn send_video(
        &self,
        chat_id: i64,
        video_url: &str,
        caption: &str,
        button: Option<&InlineButton>,
    ) -> Result<()>;

    /// Check if the notifier is configured and ready
    fn is_configured(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_button() {
        let button = InlineButton::new("Incident Details", "https://example.com/incident/1");
        assert_eq!(button.text, "Incident Details");
        assert_eq!(button.url, "https://example.com/incident/1");
    }
}
