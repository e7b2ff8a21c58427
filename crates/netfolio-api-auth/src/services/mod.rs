//! Account lifecycle services.

pub mod account_service;
pub mod email;
pub mod gravatar;
pub mod notify;
pub mod sms;
pub mod templates;
pub mod token_service;

pub use account_service::AccountService;
pub use email::{EmailMessage, EmailSender, SmtpEmailSender};
pub use gravatar::gravatar_url;
pub use notify::{Notifier, NotifyError};
pub use sms::{SmsSender, TwilioSmsSender};
pub use token_service::{
    TokenService, ACTIVATION_TOKEN_VALIDITY_HOURS, PASSWORD_RESET_TOKEN_VALIDITY_HOURS,
    SESSION_TOKEN_VALIDITY_HOURS,
};
