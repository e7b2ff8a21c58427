//! Database entity models.

pub mod user;
