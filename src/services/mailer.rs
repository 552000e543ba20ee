use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;

/// An outbound email with plain-text and HTML bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Outbound mail relay.
#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()>;
}

/// [`Mailer`] relaying through an SMTP server with STARTTLS.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpMailer {
    /// Build a pooled STARTTLS transport from the mail settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay host or sender address is invalid.
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| anyhow::anyhow!("EMAIL_FROM is not a valid address: {e}"))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|e| anyhow::anyhow!("Invalid recipient {}: {e}", message.to))?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject);

        if let Some(mailbox) = message
            .reply_to
            .as_deref()
            .and_then(|r| r.parse::<Mailbox>().ok())
        {
            builder = builder.reply_to(mailbox);
        }

        let email = builder.multipart(MultiPart::alternative_plain_html(
            message.text,
            message.html,
        ))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| anyhow::anyhow!("SMTP relay rejected message: {e}"))?;

        tracing::info!(to = %message.to, "Email sent");
        Ok(())
    }
}
