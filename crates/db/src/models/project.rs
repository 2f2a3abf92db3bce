//! Project entity model and DTOs.

use pms_core::project_code::ProjectType;
use pms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project row from the `projects` table.
///
/// `project_code` and the fragments it was composed from are written once
/// by the allocator and never updated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub project_code: String,
    pub project_name: String,
    pub status: String,
    pub project_type: Option<i16>,
    pub project_category: String,
    pub business_unit_code: String,
    pub client_or_dept_code: String,
    pub year_suffix: String,
    pub annual_seq: String,
    pub phase_type: String,
    pub project_manager_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a project. The code is allocated, never supplied.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub project_name: String,
    pub project_type: Option<ProjectType>,
    pub project_category: String,
    pub business_unit_code: String,
    pub client_or_dept_code: String,
    pub is_annual: bool,
    pub project_manager_id: Option<DbId>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProject {
    pub project_name: Option<String>,
    pub status: Option<String>,
    pub project_manager_id: Option<DbId>,
}
