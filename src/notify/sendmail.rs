// src/notify/sendmail.rs
use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::sendmail::AsyncSendmailTransport;
use lettre::{AsyncTransport, Tokio1Executor};

use super::{DeliveryTransport, DigestMessage};

const DEFAULT_FROM: &str = "AI日报机器人 <digest@localhost>";
const DEFAULT_TO: &str = "root@localhost";

/// Pipes the digest to a local MTA command. Two chain entries use this, one
/// for `sendmail` and one for `msmtp`; either works with zero configuration
/// on a box that has the binary, and fails fast on one that does not.
pub struct MtaTransport {
    transport: AsyncSendmailTransport<Tokio1Executor>,
    command: &'static str,
    from: Mailbox,
    to: Mailbox,
}

impl MtaTransport {
    pub fn sendmail() -> Result<Self> {
        Self::with_command("sendmail")
    }

    pub fn msmtp() -> Result<Self> {
        Self::with_command("msmtp")
    }

    fn with_command(command: &'static str) -> Result<Self> {
        let from_addr =
            std::env::var("DIGEST_EMAIL_FROM").unwrap_or_else(|_| DEFAULT_FROM.to_string());
        let to_addr = std::env::var("DIGEST_EMAIL_TO").unwrap_or_else(|_| DEFAULT_TO.to_string());

        let from = from_addr.parse().context("invalid DIGEST_EMAIL_FROM")?;
        let to = to_addr.parse().context("invalid DIGEST_EMAIL_TO")?;

        Ok(Self {
            transport: AsyncSendmailTransport::<Tokio1Executor>::new_with_command(command),
            command,
            from,
            to,
        })
    }

    fn build(&self, msg: &DigestMessage) -> Result<Message> {
        // Plain text only; a local MTA pipe is the wrong place for styled HTML.
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(msg.subject.clone())
            .header(header::ContentType::TEXT_PLAIN)
            .body(msg.text_body.clone())
            .context("build email")
    }
}

#[async_trait::async_trait]
impl DeliveryTransport for MtaTransport {
    async fn send(&self, msg: &DigestMessage) -> Result<()> {
        let email = self.build(msg)?;
        self.transport
            .send(email)
            .await
            .with_context(|| format!("{} send", self.command))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_env() {
        std::env::remove_var("DIGEST_EMAIL_FROM");
        std::env::remove_var("DIGEST_EMAIL_TO");
    }

    #[serial_test::serial]
    #[test]
    fn defaults_apply_when_env_is_empty() {
        clear_env();
        let sendmail = MtaTransport::sendmail().unwrap();
        assert_eq!(sendmail.name(), "sendmail");
        assert_eq!(sendmail.to.email.to_string(), "root@localhost");
        assert_eq!(sendmail.from.email.to_string(), "digest@localhost");

        let msmtp = MtaTransport::msmtp().unwrap();
        assert_eq!(msmtp.name(), "msmtp");
    }

    #[serial_test::serial]
    #[test]
    fn invalid_recipient_is_an_error() {
        clear_env();
        std::env::set_var("DIGEST_EMAIL_TO", "not an address");
        let Err(err) = MtaTransport::sendmail() else {
            panic!("an unparsable recipient must fail");
        };
        assert!(err.to_string().contains("DIGEST_EMAIL_TO"), "got: {err}");
        clear_env();
    }

    #[serial_test::serial]
    #[test]
    fn message_builds_as_plain_text() {
        clear_env();
        let transport = MtaTransport::sendmail().unwrap();
        let msg = DigestMessage {
            subject: "认知主权日报-2025-06-10".to_string(),
            html_body: "<p>正文</p>".to_string(),
            text_body: "正文".to_string(),
            summary: "摘要".to_string(),
        };
        assert!(transport.build(&msg).is_ok());
    }
}
