//! First-run seeding of an administrator account.

use pms_core::roles::ROLE_ADMIN;
use pms_core::types::DbId;
use pms_db::models::employee::CreateEmployee;
use pms_db::repositories::{EmployeeRepo, RoleRepo};
use sqlx::PgPool;

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Create `admin` with the `admin` role if the employees table is empty.
///
/// Returns the new employee id, or `None` when employees already exist.
pub async fn ensure_admin(pool: &PgPool, admin: &BootstrapAdmin) -> AppResult<Option<DbId>> {
    if EmployeeRepo::count(pool).await? > 0 {
        return Ok(None);
    }

    let role = RoleRepo::find_by_name(pool, ROLE_ADMIN)
        .await?
        .ok_or_else(|| AppError::InternalError("Admin role is missing".into()))?;

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let employee = EmployeeRepo::create(
        pool,
        &CreateEmployee {
            name: admin.name.clone(),
            email: admin.email.clone(),
            password_hash,
            role_id: role.id,
            department: None,
        },
    )
    .await?;

    tracing::info!(employee_id = employee.id, name = %employee.name, "Bootstrap administrator created");
    Ok(Some(employee.id))
}
