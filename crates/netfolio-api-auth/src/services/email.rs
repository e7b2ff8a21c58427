//! Email delivery.

use crate::services::notify::NotifyError;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// A fully rendered email, ready for transport.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    /// HTML body.
    pub body: String,
}

/// Outbound email transport.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be built or delivered.
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// SMTP transport backed by `lettre`.
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    /// Connect to an SMTP relay with STARTTLS and credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay host or sender address is invalid.
    pub fn new(
        host: &str,
        username: String,
        password: String,
        from: &str,
    ) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            .credentials(Credentials::new(username, password))
            .build();
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::InvalidAddress(format!("sender {from:?}: {e}")))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::InvalidAddress(format!("recipient {:?}: {e}", message.to)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.body.clone())?;

        self.transport.send(email).await?;
        Ok(())
    }
}

/// Records messages instead of sending them.
#[derive(Debug, Default)]
pub struct MockEmailSender {
    sent: std::sync::Mutex<Vec<EmailMessage>>,
}

impl MockEmailSender {
    /// Messages delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mock mutex poisoned").clone()
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("mock mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}
