//! Mock implementations for testing

use crate::error::Result;
use crate::{InlineButton, Notifier};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One recorded delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub video_url: Option<String>,
    pub button: Option<InlineButton>,
}

/// A mock notifier for testing that records all sent messages
#[derive(Default)]
pub struct MockNotifier {
    messages: Arc<Mutex<Vec<SentMessage>>>,
    call_count: AtomicUsize,
    should_fail: bool,
}

impl MockNotifier {
    /// Create a new mock notifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock notifier that always fails
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    /// Get the number of times a send was attempted
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get all sent messages
    pub async fn messages(&self) -> Vec<SentMessage> {
        self.messages.lock().await.clone()
    }

    /// Check if any sent message contains the given fragment
    pub async fn was_message_sent(&self, fragment: &str) -> bool {
        self.messages
            .lock()
            .await
            .iter()
            .any(|m| m.text.contains(fragment))
    }

    async fn record(&self, message: SentMessage) -> Result<()> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.should_fail {
            return Err(crate::error::NotifyError::TelegramError(
                "Mock failure".to_string(),
            ));
        }

        self.messages.lock().await.push(message);
        Ok(())
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        button: Option<&InlineButton>,
    ) -> Result<()> {
        self.record(SentMessage {
            chat_id,
            text: text.to_string(),
            video_url: None,
            button: button.cloned(),
        })
        .await
    }

    async fn send_video(
        &self,
        chat_id: i64,
        video_url: &str,
        caption: &str,
        button: Option<&InlineButton>,
    ) -> Result<()> {
        self.record(SentMessage {
            chat_id,
            text: caption.to_string(),
            video_url: Some(video_url.to_string()),
            button: button.cloned(),
        })
        .await
    }

    fn is_configured(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_notifier_records_messages() {
        let notifier = MockNotifier::new();
        notifier.send_text(1, "Hello, world!", None).await.unwrap();
        notifier
            .send_video(2, "https://cdn.example.com/v.mp4", "Caption", None)
            .await
            .unwrap();

        assert_eq!(notifier.call_count(), 2);
        let messages = notifier.messages().await;
        assert_eq!(messages.len(), 2);
        assert!(notifier.was_message_sent("Hello").await);
        assert_eq!(
            messages[1].video_url.as_deref(),
            Some("https://cdn.example.com/v.mp4")
        );
    }

    #[tokio::test]
    async fn test_mock_notifier_records_button() {
        let notifier = MockNotifier::new();
        let button = InlineButton::new("Details", "https://example.com/i/1");
        notifier.send_text(1, "alert", Some(&button)).await.unwrap();

        let messages = notifier.messages().await;
        assert_eq!(messages[0].button.as_ref().unwrap().url, "https://example.com/i/1");
    }

    #[tokio::test]
    async fn test_mock_notifier_fails_when_configured() {
        let notifier = MockNotifier::failing();
        let result = notifier.send_text(1, "test", None).await;
        assert!(result.is_err());
        assert_eq!(notifier.call_count(), 1);
    }
}
