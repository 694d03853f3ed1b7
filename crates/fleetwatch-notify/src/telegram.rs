//! Telegram delivery backend

use crate::error::{NotifyError, Result};
use crate::{InlineButton, Notifier};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info};

/// Telegram API response
#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

/// Request body for sendMessage
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<serde_json::Value>,
}

/// Request body for sendVideo
#[derive(Debug, Serialize)]
struct SendVideoRequest<'a> {
    chat_id: i64,
    video: &'a str,
    caption: &'a str,
    parse_mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<serde_json::Value>,
}

fn inline_keyboard(button: &InlineButton) -> serde_json::Value {
    json!({
        "inline_keyboard": [[{"text": button.text, "url": button.url}]]
    })
}

/// Telegram delivery backend
pub struct TelegramNotifier {
    bot_token: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier
    pub fn new(bot_token: String) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    /// Create with a custom HTTP client (useful for testing)
    pub fn with_client(bot_token: String, client: reqwest::Client) -> Self {
        Self { bot_token, client }
    }

    /// Get the Telegram API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.bot_token, method)
    }

    async fn call<T: Serialize>(&self, method: &str, request: &T) -> Result<()> {
        if self.bot_token.is_empty() {
            return Err(NotifyError::NotConfigured);
        }

        let response = self
            .client
            .post(self.api_url(method))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body: TelegramResponse = response.json().await?;

        if body.ok {
            info!("Telegram {} delivered", method);
            Ok(())
        } else {
            let error_msg = body
                .description
                .unwrap_or_else(|| format!("HTTP {}", status));
            error!("Telegram API error on {}: {}", method, error_msg);
            Err(NotifyError::telegram(error_msg))
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        button: Option<&InlineButton>,
    ) -> Result<()> {
        debug!("Sending Telegram message to chat {}", chat_id);
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "Markdown",
            reply_markup: button.map(inline_keyboard),
        };
        self.call("sendMessage", &request).await
    }

    async fn send_video(
        &self,
        chat_id: i64,
        video_url: &str,
        caption: &str,
        button: Option<&InlineButton>,
    ) -> Result<()> {
        debug!("Sending Telegram video to chat {}", chat_id);
        let request = SendVideoRequest {
            chat_id,
            video: video_url,
            caption,
            parse_mode: "Markdown",
            reply_markup: button.map(inline_keyboard),
        };
        self.call("sendVideo", &request).await
    }

    fn is_configured(&self) -> bool {
        !self.bot_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifier_not_configured_empty_token() {
        let notifier = TelegramNotifier::new(String::new());
        assert!(!notifier.is_configured());
    }

    #[test]
    fn test_notifier_configured() {
        let notifier = TelegramNotifier::new("token".to_string());
        assert!(notifier.is_configured());
    }

    #[test]
    fn test_api_url() {
        let notifier = TelegramNotifier::new("my_bot_token".to_string());
        assert_eq!(
            notifier.api_url("sendMessage"),
            "https://api.telegram.org/botmy_bot_token/sendMessage"
        );
    }

    #[test]
    fn test_inline_keyboard_shape() {
        let button = InlineButton::new("Incident Details", "https://example.com/i/1");
        let markup = inline_keyboard(&button);
        assert_eq!(
            markup["inline_keyboard"][0][0]["text"],
            "Incident Details"
        );
        assert_eq!(
            markup["inline_keyboard"][0][0]["url"],
            "https://example.com/i/1"
        );
    }

    #[tokio::test]
    async fn test_send_not_configured() {
        let notifier = TelegramNotifier::new(String::new());
        let result = notifier.send_text(123, "test", None).await;
        assert!(matches!(result, Err(NotifyError::NotConfigured)));
    }
}
