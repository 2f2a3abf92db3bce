//! Handlers for the `/projects` resource.
//!
//! Project codes are allocated by the server on create and are immutable
//! afterwards.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pms_core::error::CoreError;
use pms_core::project_code::{validate_status, ProjectType};
use pms_core::types::DbId;
use pms_db::models::project::{CreateProject, Project, UpdateProject};
use pms_db::repositories::ProjectRepo;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireProjectManagement;
use crate::query::StatusFilter;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /projects`.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub project_name: String,
    /// Numeric id (`4`, `"4"`) or kebab-case name (`"internal"`).
    #[serde(default)]
    pub project_type: Option<Value>,
    pub project_category: String,
    pub business_unit_code: String,
    pub client_or_dept_code: String,
    #[serde(default)]
    pub is_annual: bool,
    pub project_manager_id: Option<DbId>,
}

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    RequireProjectManagement(user): RequireProjectManagement,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let project_name = required_name(&input.project_name)?;
    let project_type = parse_project_type(input.project_type.as_ref())
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let create = CreateProject {
        project_name,
        project_type,
        project_category: input.project_category.trim().to_string(),
        business_unit_code: input.business_unit_code.trim().to_string(),
        client_or_dept_code: input.client_or_dept_code.trim().to_string(),
        is_annual: input.is_annual,
        project_manager_id: input.project_manager_id,
    };

    let project = ProjectRepo::create_with_allocated_code(&state.pool, &create).await?;
    tracing::info!(
        employee_id = user.employee_id,
        project_code = %project.project_code,
        "Project created via API",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/projects
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<StatusFilter>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = ProjectRepo::list(&state.pool, filter.status.as_deref()).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireProjectManagement(_user): RequireProjectManagement,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    if let Some(name) = input.project_name.as_deref() {
        input.project_name = Some(required_name(name)?);
    }
    if let Some(status) = input.status.as_deref() {
        validate_status(status).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }

    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireProjectManagement(user): RequireProjectManagement,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ProjectRepo::delete(&state.pool, id).await? {
        tracing::info!(employee_id = user.employee_id, project_id = id, "Project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    })
}

fn required_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "project_name is required".into(),
        )));
    }
    Ok(trimmed.to_string())
}

/// Interpret the loosely typed `project_type` field.
///
/// `null`, a missing field and an empty string all mean "no type", as does
/// an id or name that is not a known type. Only values that cannot name a
/// type at all are rejected.
fn parse_project_type(raw: Option<&Value>) -> Result<Option<ProjectType>, String> {
    let parsed = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => ProjectType::parse(s),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(id) => i16::try_from(id).ok().and_then(ProjectType::from_id),
            None => return Err(format!("project_type must be an integer id, got {n}")),
        },
        Some(other) => {
            return Err(format!("project_type must be a number or string, got {other}"))
        }
    };
    if parsed.is_none() {
        tracing::warn!(project_type = ?raw, "Unknown project type, using default phase");
    }
    Ok(parsed)
}
