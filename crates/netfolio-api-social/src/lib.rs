//! Federated login for netfolio.
//!
//! Verifies Google ID tokens against Google's JWKS and maps them to local
//! accounts: first login creates an implicitly-active account with no
//! password, later logins reuse it. Either way the client gets the same
//! session token as a password login.

pub mod error;
pub mod handlers;
pub mod router;
pub mod services;
pub mod verifier;

pub use error::SocialError;
pub use router::social_router;
pub use services::GoogleAuthService;
pub use verifier::GoogleIdTokenVerifier;
