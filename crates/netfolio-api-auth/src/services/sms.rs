//! SMS delivery via the Twilio REST API.

use crate::services::notify::NotifyError;
use async_trait::async_trait;

/// Outbound SMS transport.
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Deliver one text message.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects or fails the request.
    async fn send(&self, to: &str, body: &str) -> Result<(), NotifyError>;
}

/// Twilio Messages API client.
pub struct TwilioSmsSender {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from: String,
}

impl TwilioSmsSender {
    #[must_use]
    pub fn new(account_sid: String, auth_token: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            account_sid,
            auth_token,
            from,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioSmsSender {
    async fn send(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from.as_str()), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Provider {
                status: status.as_u16(),
            })
        }
    }
}

/// Records messages instead of sending them.
#[derive(Debug, Default)]
pub struct MockSmsSender {
    sent: std::sync::Mutex<Vec<(String, String)>>,
}

impl MockSmsSender {
    /// `(to, body)` pairs delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("mock mutex poisoned").clone()
    }
}

#[async_trait]
impl SmsSender for MockSmsSender {
    async fn send(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("mock mutex poisoned")
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}
