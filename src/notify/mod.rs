// src/notify/mod.rs
//! Digest delivery over a chain of transports.
//!
//! The chain tries SMTP first, then the local `sendmail` and `msmtp`
//! commands, then the chat webhook. The first transport that succeeds ends
//! the run; a failing transport is logged and the next one gets its turn.
//! Only exhausting the whole chain surfaces an error to the caller.

pub mod email;
pub mod sendmail;
pub mod webhook;

use anyhow::Result;

/// A fully rendered digest, ready for any transport.
#[derive(Debug, Clone)]
pub struct DigestMessage {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    /// Compact chat-sized rendering; webhook transports send this instead of
    /// pasting a full report into a chat window.
    pub summary: String,
}

#[async_trait::async_trait]
pub trait DeliveryTransport: Send + Sync {
    async fn send(&self, msg: &DigestMessage) -> Result<()>;
    fn name(&self) -> &'static str;
}

pub struct DeliveryChain {
    transports: Vec<Box<dyn DeliveryTransport>>,
}

impl DeliveryChain {
    /// Assemble the chain from the environment. Unconfigured transports are
    /// left out rather than failing; the sendmail commands are always worth
    /// a try since they need no configuration.
    pub fn from_env() -> Result<Self> {
        let mut transports: Vec<Box<dyn DeliveryTransport>> = Vec::new();

        match email::EmailTransport::from_env()? {
            Some(t) => transports.push(Box::new(t)),
            None => tracing::debug!("smtp disabled (SMTP_HOST/SMTP_USER/SMTP_PASS unset)"),
        }
        transports.push(Box::new(sendmail::MtaTransport::sendmail()?));
        transports.push(Box::new(sendmail::MtaTransport::msmtp()?));
        match webhook::WebhookTransport::from_env() {
            Some(t) => transports.push(Box::new(t)),
            None => tracing::debug!("webhook disabled (WEBHOOK_URL unset)"),
        }

        Ok(Self { transports })
    }

    pub fn new(transports: Vec<Box<dyn DeliveryTransport>>) -> Self {
        Self { transports }
    }

    /// Transport names in chain order.
    pub fn names(&self) -> Vec<&'static str> {
        self.transports.iter().map(|t| t.name()).collect()
    }

    /// Try each transport in order; returns the name of the one that
    /// delivered.
    pub async fn deliver(&self, msg: &DigestMessage) -> Result<&'static str> {
        for transport in &self.transports {
            match transport.send(msg).await {
                Ok(()) => {
                    tracing::info!(transport = transport.name(), "digest delivered");
                    return Ok(transport.name());
                }
                Err(e) => {
                    tracing::warn!(
                        transport = transport.name(),
                        error = ?e,
                        "delivery failed, trying next"
                    );
                }
            }
        }
        anyhow::bail!(
            "all {} delivery transports failed; digest not sent",
            self.transports.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedTransport {
        label: &'static str,
        succeed: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl DeliveryTransport for ScriptedTransport {
        async fn send(&self, _msg: &DigestMessage) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(())
            } else {
                anyhow::bail!("{} unreachable", self.label)
            }
        }

        fn name(&self) -> &'static str {
            self.label
        }
    }

    fn msg() -> DigestMessage {
        DigestMessage {
            subject: "认知主权日报-2025-06-10".to_string(),
            html_body: "<html></html>".to_string(),
            text_body: "正文".to_string(),
            summary: "摘要".to_string(),
        }
    }

    #[tokio::test]
    async fn first_success_stops_the_chain() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let third = Arc::new(AtomicUsize::new(0));

        let chain = DeliveryChain::new(vec![
            Box::new(ScriptedTransport { label: "a", succeed: false, calls: first.clone() }),
            Box::new(ScriptedTransport { label: "b", succeed: true, calls: second.clone() }),
            Box::new(ScriptedTransport { label: "c", succeed: true, calls: third.clone() }),
        ]);

        let delivered = chain.deliver(&msg()).await.unwrap();
        assert_eq!(delivered, "b");
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(third.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exhausted_chain_is_an_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = DeliveryChain::new(vec![
            Box::new(ScriptedTransport { label: "a", succeed: false, calls: calls.clone() }),
            Box::new(ScriptedTransport { label: "b", succeed: false, calls: calls.clone() }),
        ]);

        let err = chain.deliver(&msg()).await.unwrap_err().to_string();
        assert!(err.contains("all 2 delivery transports failed"), "got: {err}");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_chain_fails_without_sending() {
        let chain = DeliveryChain::new(Vec::new());
        assert!(chain.deliver(&msg()).await.is_err());
    }
}
