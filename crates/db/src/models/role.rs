//! Role entity model and DTOs.

use pms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A role row from the `roles` table.
///
/// `permissions` is the raw stored value; resolve it with
/// `pms_core::permissions::PermissionSet::resolve` before use.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new role.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub description: Option<String>,
    pub permissions: Option<serde_json::Value>,
}

/// DTO for updating an existing role. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRole {
    pub description: Option<String>,
    pub permissions: Option<serde_json::Value>,
}
