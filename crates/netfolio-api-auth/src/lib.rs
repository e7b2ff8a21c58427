//! Account lifecycle API for netfolio.
//!
//! Implements registration, activation, login, password reset, and the
//! session auth guard. Federated (Google) login lives in
//! `netfolio-api-social`; this crate owns everything password-based.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;

pub use error::ApiAuthError;
pub use router::{auth_router, users_router};
