//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_roles.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_EMPLOYEE: &str = "employee";
