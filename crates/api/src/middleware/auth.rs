//! Session-cookie authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pms_core::error::CoreError;
use pms_core::permissions::PermissionSet;
use pms_core::session::Identity;
use pms_core::types::DbId;
use pms_db::repositories::RoleRepo;
use sqlx::PgPool;

use crate::auth::cookie;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated employee resolved from the session cookie.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(employee_id = user.employee_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub employee_id: DbId,
    /// Normalized permissions of the employee's role.
    pub permissions: PermissionSet,
    /// The raw session token, kept so logout can end this exact session.
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie::session_token(&parts.headers);

        let employee_id = match state.sessions.resolve_identity(token.as_deref()).await? {
            Identity::Authenticated(id) => id,
            Identity::Unauthenticated => {
                return Err(AppError::Core(CoreError::Unauthorized(
                    "Not logged in or session expired".into(),
                )))
            }
        };

        let permissions = resolve_permissions(&state.pool, employee_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Employee no longer exists".into()))
            })?;

        Ok(AuthUser {
            employee_id,
            permissions,
            // Present whenever resolution succeeded.
            token: token.unwrap_or_default(),
        })
    }
}

/// Normalized permission set of an employee's role.
///
/// Returns `None` if the employee does not exist. Malformed stored data
/// never fails the lookup.
pub async fn resolve_permissions(
    pool: &PgPool,
    employee_id: DbId,
) -> AppResult<Option<PermissionSet>> {
    let raw = RoleRepo::find_permissions_for_employee(pool, employee_id).await?;
    Ok(raw.map(|stored| PermissionSet::resolve(stored.as_ref())))
}
