//! Notification content.
//!
//! Returns `(subject, html_body)` pairs. Links point at the frontend, which
//! forwards the token to the corresponding API endpoint.

/// Activation link email.
pub fn activation_email(frontend_url: &str, activation_token: &str) -> (String, String) {
    let link = format!("{frontend_url}/users/activate/{activation_token}");
    (
        "Netfolio - Activate Your Account".to_string(),
        format!(
            "To activate your account please follow the link -<br />\
             Link: <a href=\"{link}\">{link}</a>"
        ),
    )
}

/// Welcome email sent after successful activation.
pub fn welcome_email(name: &str) -> (String, String) {
    (
        "Welcome to Netfolio".to_string(),
        format!("<p>Hello {name}, welcome to Netfolio</p>"),
    )
}

/// Welcome SMS sent after successful activation.
#[must_use]
pub fn welcome_sms() -> &'static str {
    "Welcome to Netfolio"
}

/// Password reset link email.
pub fn password_reset_email(frontend_url: &str, reset_token: &str) -> (String, String) {
    let link = format!("{frontend_url}/password/reset/verify/{reset_token}");
    (
        "Netfolio - Your Password Reset Request".to_string(),
        format!(
            "To reset your password please follow the link -<br />\
             Link: <a href=\"{link}\">{link}</a>"
        ),
    )
}

/// Confirmation email sent after the password was changed.
pub fn password_reset_success_email(name: &str) -> (String, String) {
    (
        "Netfolio - Your Password Reset Successful".to_string(),
        format!("<p>Hello {name}, your password reset was successful</p>"),
    )
}
