//! Repository for the `roles` table.

use pms_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::{CreateRole, Role, UpdateRole};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, permissions, created_at, updated_at";

/// Provides CRUD operations for roles.
pub struct RoleRepo;

impl RoleRepo {
    /// Insert a new role, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateRole) -> Result<Role, sqlx::Error> {
        let query = format!(
            "INSERT INTO roles (name, description, permissions)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Role>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.permissions)
            .fetch_one(pool)
            .await
    }

    /// Find a role by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a role by name (case-sensitive).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all roles ordered by ID ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY id ASC");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    /// Update a role. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRole,
    ) -> Result<Option<Role>, sqlx::Error> {
        let query = format!(
            "UPDATE roles SET
                description = COALESCE($2, description),
                permissions = COALESCE($3, permissions)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .bind(&input.description)
            .bind(&input.permissions)
            .fetch_optional(pool)
            .await
    }

    /// Raw stored permissions of the employee's role.
    ///
    /// The outer `Option` is `None` when the employee does not exist; the
    /// inner one is `None` when the role has no permissions stored.
    pub async fn find_permissions_for_employee(
        pool: &PgPool,
        employee_id: DbId,
    ) -> Result<Option<Option<serde_json::Value>>, sqlx::Error> {
        let row: Option<(Option<serde_json::Value>,)> = sqlx::query_as(
            "SELECT r.permissions
             FROM employees e JOIN roles r ON r.id = e.role_id
             WHERE e.id = $1",
        )
        .bind(employee_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(permissions,)| permissions))
    }
}
