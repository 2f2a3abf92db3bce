//! Handlers for the `/employees` resource (staff management).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pms_core::error::CoreError;
use pms_core::roles::ROLE_EMPLOYEE;
use pms_core::types::DbId;
use pms_core::work_report::{clamp_limit, clamp_offset};
use pms_db::models::employee::{CreateEmployee, EmployeeResponse};
use pms_db::repositories::{EmployeeRepo, RoleRepo};
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaffManagement;
use crate::query::EmployeeSearchParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// Request body for `POST /employees`.
#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to the `employee` role.
    pub role_id: Option<DbId>,
    pub department: Option<String>,
}

/// Result of `POST /employees/{id}/deactivate`.
#[derive(Debug, Serialize)]
pub struct DeactivateResponse {
    pub id: DbId,
    pub sessions_ended: u64,
}

/// GET /api/employees
pub async fn list(
    State(state): State<AppState>,
    RequireStaffManagement(_user): RequireStaffManagement,
    Query(params): Query<EmployeeSearchParams>,
) -> AppResult<Json<PageResponse<EmployeeResponse>>> {
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let data = EmployeeRepo::list(&state.pool, search, limit, offset).await?;
    let total = EmployeeRepo::count_matching(&state.pool, search).await?;
    Ok(Json(PageResponse {
        data,
        total,
        limit,
        offset,
    }))
}

/// GET /api/departments
pub async fn list_departments(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let departments = EmployeeRepo::list_departments(&state.pool).await?;
    Ok(Json(DataResponse { data: departments }))
}

/// POST /api/employees
pub async fn create(
    State(state): State<AppState>,
    RequireStaffManagement(user): RequireStaffManagement,
    Json(input): Json<CreateEmployeeRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<EmployeeResponse>>)> {
    let name = input.name.trim();
    let email = input.email.trim();
    if name.is_empty() {
        return Err(validation("name is required"));
    }
    if !email.contains('@') {
        return Err(validation("email must be a valid address"));
    }
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role_id = match input.role_id {
        Some(id) => RoleRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound { entity: "Role", id }))?
            .id,
        None => RoleRepo::find_by_name(&state.pool, ROLE_EMPLOYEE)
            .await?
            .ok_or_else(|| AppError::InternalError("Default employee role is missing".into()))?
            .id,
    };

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let created = EmployeeRepo::create(
        &state.pool,
        &CreateEmployee {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            role_id,
            department: input
                .department
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        },
    )
    .await?;

    tracing::info!(
        employee_id = created.id,
        created_by = user.employee_id,
        "Employee created",
    );

    let response = EmployeeRepo::find_response_by_id(&state.pool, created.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id: created.id,
        }))?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// POST /api/employees/{id}/deactivate
///
/// Marks the employee inactive and ends their sessions.
pub async fn deactivate(
    State(state): State<AppState>,
    RequireStaffManagement(user): RequireStaffManagement,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DeactivateResponse>>> {
    if id == user.employee_id {
        return Err(AppError::BadRequest(
            "Cannot deactivate your own account".into(),
        ));
    }

    if !EmployeeRepo::deactivate(&state.pool, id).await? {
        // Distinguish "already inactive" from "no such employee".
        if EmployeeRepo::find_by_id(&state.pool, id).await?.is_none() {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Employee",
                id,
            }));
        }
    }

    let sessions_ended = state.sessions.end_sessions_for(id).await;
    tracing::info!(
        employee_id = id,
        deactivated_by = user.employee_id,
        sessions_ended,
        "Employee deactivated",
    );

    Ok(Json(DataResponse {
        data: DeactivateResponse { id, sessions_ended },
    }))
}

fn validation(msg: &str) -> AppError {
    AppError::Core(CoreError::Validation(msg.to_string()))
}
