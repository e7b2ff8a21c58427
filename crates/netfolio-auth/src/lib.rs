//! Token issuance/verification and password hashing for netfolio.
//!
//! This crate provides:
//! - HS256 JWT encoding and decoding with a purpose-discriminated claim set
//!   (session, activation, password reset) so a token issued for one purpose
//!   can never be presented for another
//! - Argon2id password hashing with OWASP-recommended parameters
//!
//! # Example
//!
//! ```rust
//! use netfolio_auth::{decode_token, encode_token, Claims, TokenPurpose};
//! use netfolio_auth::{hash_password, verify_password};
//!
//! let claims = Claims::builder()
//!     .subject("user-123")
//!     .purpose(TokenPurpose::Session)
//!     .issuer("netfolio")
//!     .expires_in_secs(7200)
//!     .build();
//!
//! let token = encode_token(&claims, b"secret").unwrap();
//! let decoded = decode_token(&token, b"secret", TokenPurpose::Session).unwrap();
//! assert_eq!(decoded.sub, "user-123");
//!
//! let hash = hash_password("my-secure-password").unwrap();
//! assert!(verify_password("my-secure-password", &hash).unwrap());
//! ```

mod claims;
mod error;
mod jwt;
mod password;

pub use claims::{Claims, ClaimsBuilder, TokenPurpose};
pub use error::AuthError;
pub use jwt::{decode_token, decode_token_any_purpose, encode_token};
pub use password::{hash_password, verify_password, PasswordHasher};
