//! Handlers for the `/reports` resource (timesheet entries and approvals).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use pms_core::error::CoreError;
use pms_core::types::DbId;
use pms_core::work_report::{
    clamp_limit, clamp_offset, validate_description, validate_hours, ReviewDecision,
};
use pms_db::models::work_report::{CreateWorkReport, WorkReport};
use pms_db::repositories::{ProjectRepo, WorkReportRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireApprovalCenter;
use crate::query::{DateFilter, PaginationParams};
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// Request body for `POST /reports`. The reporter is always the caller.
#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub project_id: DbId,
    pub task_description: String,
    pub hours_spent: f64,
    /// Defaults to today (server clock, UTC).
    pub report_date: Option<NaiveDate>,
}

/// GET /api/reports
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filter): Query<DateFilter>,
) -> AppResult<Json<DataResponse<Vec<WorkReport>>>> {
    let reports =
        WorkReportRepo::list_for_employee(&state.pool, user.employee_id, filter.date).await?;
    Ok(Json(DataResponse { data: reports }))
}

/// POST /api/reports
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateReportRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<WorkReport>>)> {
    validate_hours(input.hours_spent).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    validate_description(&input.task_description)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if ProjectRepo::find_by_id(&state.pool, input.project_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: input.project_id,
        }));
    }

    let report = WorkReportRepo::create(
        &state.pool,
        &CreateWorkReport {
            employee_id: user.employee_id,
            project_id: input.project_id,
            task_description: input.task_description.trim().to_string(),
            hours_spent: input.hours_spent,
            report_date: input
                .report_date
                .unwrap_or_else(|| Utc::now().date_naive()),
        },
    )
    .await?;

    tracing::info!(
        report_id = report.id,
        employee_id = user.employee_id,
        project_id = report.project_id,
        "Work report submitted",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// GET /api/reports/pending
pub async fn list_pending(
    State(state): State<AppState>,
    RequireApprovalCenter(_user): RequireApprovalCenter,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PageResponse<WorkReport>>> {
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);

    let data = WorkReportRepo::list_pending(&state.pool, limit, offset).await?;
    let total = WorkReportRepo::count_pending(&state.pool).await?;
    Ok(Json(PageResponse {
        data,
        total,
        limit,
        offset,
    }))
}

/// POST /api/reports/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    RequireApprovalCenter(user): RequireApprovalCenter,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<WorkReport>>> {
    review(&state, user.employee_id, id, ReviewDecision::Approve).await
}

/// POST /api/reports/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    RequireApprovalCenter(user): RequireApprovalCenter,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<WorkReport>>> {
    review(&state, user.employee_id, id, ReviewDecision::Reject).await
}

async fn review(
    state: &AppState,
    reviewer_id: DbId,
    id: DbId,
    decision: ReviewDecision,
) -> AppResult<Json<DataResponse<WorkReport>>> {
    match WorkReportRepo::review(&state.pool, id, reviewer_id, decision).await? {
        Some(report) => {
            tracing::info!(report_id = id, reviewer_id, ?decision, "Work report reviewed");
            Ok(Json(DataResponse { data: report }))
        }
        None => match WorkReportRepo::find_by_id(&state.pool, id).await? {
            Some(_) => Err(AppError::Core(CoreError::Conflict(format!(
                "Work report {id} has already been reviewed"
            )))),
            None => Err(AppError::Core(CoreError::NotFound {
                entity: "WorkReport",
                id,
            })),
        },
    }
}
