// src/notify/webhook.rs
use anyhow::{Context, Result};
use reqwest::Client;

use super::{DeliveryTransport, DigestMessage};

/// Feishu bot webhook. Posts the compact summary as a text message; the full
/// report stays in email and the snapshot.
pub struct WebhookTransport {
    url: String,
    client: Client,
}

impl WebhookTransport {
    pub fn from_env() -> Option<Self> {
        std::env::var("WEBHOOK_URL").ok().map(Self::new)
    }

    /// Builder for tests/tools.
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: Client::new(),
        }
    }

    fn payload(msg: &DigestMessage) -> serde_json::Value {
        serde_json::json!({
            "msg_type": "text",
            "content": { "text": msg.summary },
        })
    }
}

#[async_trait::async_trait]
impl DeliveryTransport for WebhookTransport {
    async fn send(&self, msg: &DigestMessage) -> Result<()> {
        self.client
            .post(&self.url)
            .json(&Self::payload(msg))
            .send()
            .await
            .context("webhook post")?
            .error_for_status()
            .context("webhook non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn absent_url_disables_the_transport() {
        std::env::remove_var("WEBHOOK_URL");
        assert!(WebhookTransport::from_env().is_none());

        std::env::set_var("WEBHOOK_URL", "https://open.feishu.cn/open-apis/bot/v2/hook/x");
        assert!(WebhookTransport::from_env().is_some());
        std::env::remove_var("WEBHOOK_URL");
    }

    #[test]
    fn payload_carries_the_summary_as_text() {
        let msg = DigestMessage {
            subject: "认知主权日报-2025-06-10".to_string(),
            html_body: "<p>正文</p>".to_string(),
            text_body: "正文".to_string(),
            summary: "## 🤖 AI日报".to_string(),
        };
        let body = WebhookTransport::payload(&msg);
        assert_eq!(body["msg_type"], "text");
        assert_eq!(body["content"]["text"], "## 🤖 AI日报");
    }
}
