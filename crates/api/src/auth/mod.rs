//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`cookie`] -- Reading and writing the session cookie.

pub mod cookie;
pub mod password;
