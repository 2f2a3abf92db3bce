//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Resolves the session cookie to an employee and
//!   their permission set.
//! - [`rbac`] -- Extractors requiring a navigation permission.

pub mod auth;
pub mod rbac;
