//! Employee entity model and DTOs.

use pms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full employee row from the `employees` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`EmployeeResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Employee {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
    pub department: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe employee representation for API responses (no password hash).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmployeeResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
    /// Resolved role name (e.g. `"admin"`, `"employee"`).
    pub role: String,
    pub role_id: DbId,
    pub department: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a new employee. The password is already hashed.
#[derive(Debug)]
pub struct CreateEmployee {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
    pub department: Option<String>,
}
