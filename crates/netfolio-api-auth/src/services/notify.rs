//! Fire-and-forget notification dispatch.
//!
//! The lifecycle endpoints never wait for a notification and never fail
//! because one could not be delivered. Each dispatch runs in its own task
//! with a bounded retry; the terminal outcome is logged and dropped.

use crate::services::email::{EmailMessage, EmailSender};
use crate::services::sms::SmsSender;
use crate::services::templates;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Delivery attempts per notification, including the first.
const MAX_SEND_ATTEMPTS: u32 = 3;

/// Delay before the second attempt; doubles per subsequent attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Recipient or sender address could not be parsed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// SMTP transport failure.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Email message construction failure.
    #[error("Message error: {0}")]
    Message(#[from] lettre::error::Error),

    /// HTTP transport failure talking to the SMS provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The SMS provider rejected the request.
    #[error("SMS provider returned HTTP {status}")]
    Provider { status: u16 },
}

/// Dispatches lifecycle notifications without coupling them to the request.
#[derive(Clone)]
pub struct Notifier {
    email: Arc<dyn EmailSender>,
    sms: Arc<dyn SmsSender>,
    frontend_url: String,
}

impl Notifier {
    #[must_use]
    pub fn new(
        email: Arc<dyn EmailSender>,
        sms: Arc<dyn SmsSender>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            email,
            sms,
            frontend_url: frontend_url.into(),
        }
    }

    /// Dispatch the activation link email.
    pub fn dispatch_activation(&self, to: &str, activation_token: &str) {
        let (subject, body) = templates::activation_email(&self.frontend_url, activation_token);
        self.spawn_email(EmailMessage {
            to: to.to_string(),
            subject,
            body,
        });
    }

    /// Dispatch the welcome email, and a welcome SMS when a phone is on file.
    pub fn dispatch_welcome(&self, to: &str, name: &str, phone: Option<&str>) {
        let (subject, body) = templates::welcome_email(name);
        self.spawn_email(EmailMessage {
            to: to.to_string(),
            subject,
            body,
        });

        if let Some(phone) = phone {
            self.spawn_sms(phone.to_string(), templates::welcome_sms().to_string());
        }
    }

    /// Dispatch the password reset link email.
    pub fn dispatch_password_reset(&self, to: &str, reset_token: &str) {
        let (subject, body) = templates::password_reset_email(&self.frontend_url, reset_token);
        self.spawn_email(EmailMessage {
            to: to.to_string(),
            subject,
            body,
        });
    }

    /// Dispatch the password-reset confirmation email.
    pub fn dispatch_reset_confirmation(&self, to: &str, name: &str) {
        let (subject, body) = templates::password_reset_success_email(name);
        self.spawn_email(EmailMessage {
            to: to.to_string(),
            subject,
            body,
        });
    }

    fn spawn_email(&self, message: EmailMessage) {
        let sender = Arc::clone(&self.email);
        tokio::spawn(async move {
            if let Err(e) = send_with_retry(|| sender.send(&message)).await {
                tracing::warn!(
                    to = %message.to,
                    subject = %message.subject,
                    error = %e,
                    "Email dispatch failed after {MAX_SEND_ATTEMPTS} attempts"
                );
            }
        });
    }

    fn spawn_sms(&self, to: String, body: String) {
        let sender = Arc::clone(&self.sms);
        tokio::spawn(async move {
            if let Err(e) = send_with_retry(|| sender.send(&to, &body)).await {
                tracing::warn!(
                    to = %to,
                    error = %e,
                    "SMS dispatch failed after {MAX_SEND_ATTEMPTS} attempts"
                );
            }
        });
    }
}

/// Run a send closure up to [`MAX_SEND_ATTEMPTS`] times with doubling delay.
async fn send_with_retry<F, Fut>(mut attempt: F) -> Result<(), NotifyError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), NotifyError>>,
{
    let mut delay = RETRY_BASE_DELAY;
    for n in 1..=MAX_SEND_ATTEMPTS {
        match attempt().await {
            Ok(()) => return Ok(()),
            Err(e) if n == MAX_SEND_ATTEMPTS => return Err(e),
            Err(e) => {
                tracing::debug!(attempt = n, error = %e, "Notification send failed, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
    }
    unreachable!("loop either returns Ok or the final Err")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::email::MockEmailSender;
    use crate::services::sms::MockSmsSender;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn notifier(email: Arc<MockEmailSender>, sms: Arc<MockSmsSender>) -> Notifier {
        Notifier::new(email, sms, "https://app.example.com")
    }

    async fn settle() {
        // Spawned dispatch tasks have no completion handle; yield until the
        // mock has been hit. Mocks never sleep, so a few yields suffice.
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn activation_email_carries_link() {
        let email = Arc::new(MockEmailSender::default());
        let sms = Arc::new(MockSmsSender::default());
        notifier(Arc::clone(&email), sms).dispatch_activation("ada@example.com", "tok123");
        settle().await;

        let sent = email.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ada@example.com");
        assert!(sent[0]
            .body
            .contains("https://app.example.com/users/activate/tok123"));
    }

    #[tokio::test]
    async fn welcome_without_phone_sends_no_sms() {
        let email = Arc::new(MockEmailSender::default());
        let sms = Arc::new(MockSmsSender::default());
        notifier(Arc::clone(&email), Arc::clone(&sms)).dispatch_welcome(
            "ada@example.com",
            "Ada",
            None,
        );
        settle().await;

        assert_eq!(email.sent().len(), 1);
        assert!(sms.sent().is_empty());
    }

    #[tokio::test]
    async fn welcome_with_phone_sends_sms() {
        let email = Arc::new(MockEmailSender::default());
        let sms = Arc::new(MockSmsSender::default());
        notifier(Arc::clone(&email), Arc::clone(&sms)).dispatch_welcome(
            "ada@example.com",
            "Ada",
            Some("+15551234567"),
        );
        settle().await;

        let sent = sms.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+15551234567");
    }

    #[tokio::test]
    async fn retry_succeeds_after_transient_failures() {
        tokio::time::pause();

        let calls = AtomicU32::new(0);
        let result = tokio::spawn(async move {
            send_with_retry(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(NotifyError::Provider { status: 503 })
                    } else {
                        Ok(())
                    }
                }
            })
            .await
        });

        // Paused time auto-advances through the sleeps.
        assert!(result.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn retry_gives_up_after_max_attempts() {
        tokio::time::pause();

        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let result = tokio::spawn(async move {
            send_with_retry(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(NotifyError::Provider { status: 500 }) }
            })
            .await
        })
        .await
        .unwrap();

        assert!(matches!(result, Err(NotifyError::Provider { status: 500 })));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_SEND_ATTEMPTS);
    }
}
