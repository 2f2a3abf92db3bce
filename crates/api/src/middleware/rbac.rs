//! Permission-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role lacks
//! one navigation permission.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pms_core::error::CoreError;
use pms_core::permissions::{
    NAV_APPROVAL_CENTER, NAV_PROJECT_MANAGEMENT, NAV_STAFF_MANAGEMENT, NAV_SYSTEM_MANAGEMENT,
};

use crate::error::AppError;
use crate::state::AppState;
use super::auth::AuthUser;

async fn require(parts: &mut Parts, state: &AppState, key: &str) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !user.permissions.allows(key) {
        tracing::debug!(employee_id = user.employee_id, permission = key, "Permission denied");
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Permission '{key}' required"
        ))));
    }
    Ok(user)
}

/// Requires `navigation.project-management`.
///
/// ```ignore
/// async fn create(RequireProjectManagement(user): RequireProjectManagement) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireProjectManagement(pub AuthUser);

impl FromRequestParts<AppState> for RequireProjectManagement {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, NAV_PROJECT_MANAGEMENT)
            .await
            .map(RequireProjectManagement)
    }
}

/// Requires `navigation.staff-management`.
pub struct RequireStaffManagement(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaffManagement {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, NAV_STAFF_MANAGEMENT)
            .await
            .map(RequireStaffManagement)
    }
}

/// Requires `navigation.approval-center`.
pub struct RequireApprovalCenter(pub AuthUser);

impl FromRequestParts<AppState> for RequireApprovalCenter {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, NAV_APPROVAL_CENTER)
            .await
            .map(RequireApprovalCenter)
    }
}

/// Requires `navigation.system-management`.
pub struct RequireSystemManagement(pub AuthUser);

impl FromRequestParts<AppState> for RequireSystemManagement {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, NAV_SYSTEM_MANAGEMENT)
            .await
            .map(RequireSystemManagement)
    }
}
