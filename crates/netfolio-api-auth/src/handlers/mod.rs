//! Endpoint handlers.

pub mod activate;
pub mod current_user;
pub mod login;
pub mod password_reset;
pub mod register;

pub use activate::activate_handler;
pub use current_user::current_user_handler;
pub use login::login_handler;
pub use password_reset::{reset_request_handler, reset_verify_handler};
pub use register::register_handler;
