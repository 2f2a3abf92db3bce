//! Repository for the `user_sessions` table.

use pms_core::session::NewSession;
use pms_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::UserSession;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, token_hash, employee_id, expires_at, ip_address, user_agent, created_at";

/// Provides CRUD operations for login sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (token_hash, employee_id, expires_at, ip_address, user_agent)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(&input.token_hash)
            .bind(input.employee_id)
            .bind(input.expires_at)
            .bind(&input.ip_address)
            .bind(&input.user_agent)
            .fetch_one(pool)
            .await
    }

    /// Employee owning an unexpired session, provided the employee is
    /// still active.
    pub async fn find_active_employee(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "SELECT s.employee_id
             FROM user_sessions s
             JOIN employees e ON e.id = s.employee_id
             WHERE s.token_hash = $1
               AND s.expires_at > NOW()
               AND e.is_active = true",
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Find a session row by token hash, expired or not.
    pub async fn find_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_sessions WHERE token_hash = $1");
        sqlx::query_as::<_, UserSession>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Delete one session. Returns `true` if a row was removed.
    pub async fn delete_by_token_hash(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every session belonging to an employee.
    pub async fn delete_for_employee(pool: &PgPool, employee_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE employee_id = $1")
            .bind(employee_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Remove expired sessions. Returns the number deleted.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Cheap query that fails when the sessions table is missing.
    pub async fn probe(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1 FROM user_sessions LIMIT 1")
            .fetch_optional(pool)
            .await?;
        Ok(())
    }
}
