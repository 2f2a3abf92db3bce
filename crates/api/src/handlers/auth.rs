//! Handlers for the `/auth` resource and the caller's own permissions.

use axum::extract::State;
use axum::http::header::{SET_COOKIE, USER_AGENT};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use pms_core::error::CoreError;
use pms_core::permissions::PermissionSet;
use pms_core::session::SessionBackend;
use pms_core::types::{DbId, Timestamp};
use pms_db::models::employee::EmployeeResponse;
use pms_db::repositories::EmployeeRepo;
use serde::{Deserialize, Serialize};

use crate::auth::cookie;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{resolve_permissions, AuthUser};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`. `username` may also be an email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login payload. The token itself travels only in the cookie.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub employee: EmployeeResponse,
    pub permissions: PermissionSet,
    pub expires_at: Timestamp,
    pub session_backend: SessionBackend,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
///
/// Verify credentials, open a session, and set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        ))
    };

    let employee = EmployeeRepo::find_by_login(&state.pool, input.username.trim())
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &employee.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(employee_id = employee.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    if !employee.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    EmployeeRepo::record_successful_login(&state.pool, employee.id).await?;

    let issued = state
        .sessions
        .create_session(employee.id, client_ip(&headers), user_agent(&headers))
        .await;

    let profile = load_profile(&state, employee.id).await?;
    let permissions = resolve_permissions(&state.pool, employee.id)
        .await?
        .unwrap_or_default();

    tracing::info!(
        employee_id = employee.id,
        backend = ?issued.backend,
        "Employee logged in",
    );

    let set_cookie = cookie::issue(&issued.token, state.config.cookie_secure);
    Ok((
        AppendHeaders([(SET_COOKIE, set_cookie)]),
        Json(DataResponse {
            data: LoginResponse {
                employee: profile,
                permissions,
                expires_at: issued.expires_at,
                session_backend: issued.backend,
            },
        }),
    ))
}

/// POST /api/auth/logout
///
/// End the current session and expire the cookie. Returns 204 No Content.
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    state.sessions.end_session(&user.token).await;
    tracing::info!(employee_id = user.employee_id, "Employee logged out");

    let set_cookie = cookie::clear(state.config.cookie_secure);
    Ok((StatusCode::NO_CONTENT, AppendHeaders([(SET_COOKIE, set_cookie)])))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<EmployeeResponse>>> {
    let profile = load_profile(&state, user.employee_id).await?;
    Ok(Json(DataResponse { data: profile }))
}

/// GET /api/current-user-permissions
///
/// The caller's normalized permission set. `navigation.timesheet` is
/// always present and `true`.
pub async fn current_user_permissions(user: AuthUser) -> Json<DataResponse<PermissionSet>> {
    Json(DataResponse {
        data: user.permissions,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_profile(state: &AppState, employee_id: DbId) -> AppResult<EmployeeResponse> {
    EmployeeRepo::find_response_by_id(&state.pool, employee_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id: employee_id,
        }))
}

/// First address in `X-Forwarded-For`, else `X-Real-IP`.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
