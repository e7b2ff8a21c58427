//! Core types for the netfolio identity service.
//!
//! Holds the strongly-typed identifiers shared by every other crate in the
//! workspace. Kept dependency-light on purpose.

mod ids;

pub use ids::{ParseIdError, UserId};
