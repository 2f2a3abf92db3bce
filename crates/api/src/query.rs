//! Shared query parameter types for API handlers.

use chrono::NaiveDate;
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped with `pms_core::work_report::clamp_limit` /
/// `clamp_offset` before reaching the repository.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated employee search (`?search=&limit=&offset=`), paged like
/// [`PaginationParams`].
#[derive(Debug, Deserialize)]
pub struct EmployeeSearchParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Optional `?date=YYYY-MM-DD` filter.
#[derive(Debug, Deserialize)]
pub struct DateFilter {
    pub date: Option<NaiveDate>,
}

/// Optional `?status=` filter for project listings.
#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}
