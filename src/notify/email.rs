// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{Mailbox, Message, MultiPart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{DeliveryTransport, DigestMessage};

const DEFAULT_SMTP_PORT: u16 = 587;

/// STARTTLS relay configured entirely from the environment. The digest goes
/// out as multipart/alternative, plain text plus the styled HTML.
pub struct EmailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailTransport {
    /// `Ok(None)` when SMTP_HOST / SMTP_USER / SMTP_PASS are absent, so the
    /// chain moves on to the local commands. A present but broken
    /// configuration is an error, not a silent skip.
    pub fn from_env() -> Result<Option<Self>> {
        let (Ok(host), Ok(user), Ok(pass)) = (
            std::env::var("SMTP_HOST"),
            std::env::var("SMTP_USER"),
            std::env::var("SMTP_PASS"),
        ) else {
            return Ok(None);
        };

        let port = match std::env::var("SMTP_PORT") {
            Ok(p) => p.parse::<u16>().context("invalid SMTP_PORT")?,
            Err(_) => DEFAULT_SMTP_PORT,
        };
        let from_addr = std::env::var("DIGEST_EMAIL_FROM").unwrap_or_else(|_| user.clone());
        let to_addr = std::env::var("DIGEST_EMAIL_TO").context("DIGEST_EMAIL_TO missing")?;

        let creds = Credentials::new(user, pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .context("invalid SMTP_HOST")?
            .port(port)
            .credentials(creds)
            .build();

        let from = from_addr.parse().context("invalid DIGEST_EMAIL_FROM")?;
        let to = to_addr.parse().context("invalid DIGEST_EMAIL_TO")?;

        Ok(Some(Self { mailer, from, to }))
    }

    fn build(&self, msg: &DigestMessage) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(msg.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                msg.text_body.clone(),
                msg.html_body.clone(),
            ))
            .context("build email")
    }
}

#[async_trait::async_trait]
impl DeliveryTransport for EmailTransport {
    async fn send(&self, msg: &DigestMessage) -> Result<()> {
        let email = self.build(msg)?;
        self.mailer.send(email).await.context("smtp send")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
