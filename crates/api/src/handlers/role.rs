//! Handlers for the `/roles` resource (system management).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pms_core::error::CoreError;
use pms_core::permissions::validate_for_storage;
use pms_core::types::DbId;
use pms_db::models::role::{CreateRole, Role, UpdateRole};
use pms_db::repositories::RoleRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireSystemManagement;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/roles
pub async fn list(
    State(state): State<AppState>,
    RequireSystemManagement(_user): RequireSystemManagement,
) -> AppResult<Json<DataResponse<Vec<Role>>>> {
    let roles = RoleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: roles }))
}

/// POST /api/roles
pub async fn create(
    State(state): State<AppState>,
    RequireSystemManagement(user): RequireSystemManagement,
    Json(mut input): Json<CreateRole>,
) -> AppResult<(StatusCode, Json<DataResponse<Role>>)> {
    input.name = input.name.trim().to_string();
    if input.name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name is required".into(),
        )));
    }
    check_permissions(input.permissions.as_ref())?;

    let role = RoleRepo::create(&state.pool, &input).await?;
    tracing::info!(role_id = role.id, created_by = user.employee_id, "Role created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: role })))
}

/// PUT /api/roles/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireSystemManagement(user): RequireSystemManagement,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRole>,
) -> AppResult<Json<DataResponse<Role>>> {
    check_permissions(input.permissions.as_ref())?;

    let role = RoleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Role", id }))?;
    tracing::info!(role_id = id, updated_by = user.employee_id, "Role updated");
    Ok(Json(DataResponse { data: role }))
}

fn check_permissions(permissions: Option<&serde_json::Value>) -> AppResult<()> {
    match permissions {
        Some(value) => {
            validate_for_storage(value).map_err(|msg| AppError::Core(CoreError::Validation(msg)))
        }
        None => Ok(()),
    }
}
