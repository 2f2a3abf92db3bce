//! Work report entity model and DTOs.

use chrono::NaiveDate;
use pms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A work report row joined with employee and project names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkReport {
    pub id: DbId,
    pub employee_id: DbId,
    pub employee_name: String,
    pub project_id: DbId,
    pub project_code: String,
    pub project_name: String,
    pub task_description: String,
    pub hours_spent: f64,
    pub report_date: NaiveDate,
    pub status: i16,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for submitting a report. `employee_id` is the authenticated caller.
#[derive(Debug, Clone)]
pub struct CreateWorkReport {
    pub employee_id: DbId,
    pub project_id: DbId,
    pub task_description: String,
    pub hours_spent: f64,
    pub report_date: NaiveDate,
}
