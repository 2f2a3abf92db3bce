//! Work report status values and submission validation.
//!
//! Status ids stored in `work_reports.status`: `0` pending, `1` approved,
//! `2` rejected. Reports are reviewed once; only pending reports accept a
//! decision.

use serde::{Deserialize, Serialize};

/// Upper bound on hours logged in a single report.
pub const MAX_HOURS_PER_REPORT: f64 = 24.0;

/// Default page size for paginated report listings.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReportStatus {
    pub fn id(self) -> i16 {
        match self {
            Self::Pending => 0,
            Self::Approved => 1,
            Self::Rejected => 2,
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Pending),
            1 => Some(Self::Approved),
            2 => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A reviewer's verdict on a pending report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn resulting_status(self) -> ReportStatus {
        match self {
            Self::Approve => ReportStatus::Approved,
            Self::Reject => ReportStatus::Rejected,
        }
    }
}

/// Validate the hours logged on a report.
pub fn validate_hours(hours: f64) -> Result<(), String> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err("hours_spent must be greater than 0".to_string());
    }
    if hours > MAX_HOURS_PER_REPORT {
        return Err(format!(
            "hours_spent must be at most {MAX_HOURS_PER_REPORT}"
        ));
    }
    Ok(())
}

/// Validate a report's task description.
pub fn validate_description(description: &str) -> Result<(), String> {
    if description.trim().is_empty() {
        return Err("task_description is required".to_string());
    }
    Ok(())
}

/// Clamp a requested page size to `1..=MAX_PAGE_SIZE`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Clamp a requested offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
