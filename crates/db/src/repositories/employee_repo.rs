//! Repository for the `employees` table.

use pms_core::types::DbId;
use sqlx::PgPool;

use crate::models::employee::{CreateEmployee, Employee, EmployeeResponse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password_hash, role_id, department, is_active, \
                       last_login_at, created_at, updated_at";

/// Columns for [`EmployeeResponse`], joined with `roles` as `r`.
const RESPONSE_COLUMNS: &str = "e.id, e.name, e.email, r.name AS role, e.role_id, e.department, \
                                e.is_active, e.last_login_at, e.created_at";

/// Optional `ILIKE` filter on `$1`, which is `NULL` when not searching.
const SEARCH_FILTER: &str = "($1::TEXT IS NULL OR e.name ILIKE $1 OR e.department ILIKE $1)";

/// Provides CRUD operations for employees.
pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Insert a new employee, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateEmployee) -> Result<Employee, sqlx::Error> {
        let query = format!(
            "INSERT INTO employees (name, email, password_hash, role_id, department)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role_id)
            .bind(&input.department)
            .fetch_one(pool)
            .await
    }

    /// Find an employee by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an employee by login name or email (case-sensitive name,
    /// case-insensitive email).
    pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM employees
             WHERE name = $1 OR LOWER(email) = LOWER($1)
             ORDER BY (name = $1) DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(login)
            .fetch_optional(pool)
            .await
    }

    /// Find the API representation of one employee.
    pub async fn find_response_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EmployeeResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS}
             FROM employees e JOIN roles r ON r.id = e.role_id
             WHERE e.id = $1"
        );
        sqlx::query_as::<_, EmployeeResponse>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of employees, newest first.
    ///
    /// `search` matches a case-insensitive substring of the name or the
    /// department.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EmployeeResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS}
             FROM employees e JOIN roles r ON r.id = e.role_id
             WHERE {SEARCH_FILTER}
             ORDER BY e.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, EmployeeResponse>(&query)
            .bind(search.map(like_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Number of employees matched by `search` (see [`EmployeeRepo::list`]).
    pub async fn count_matching(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM employees e WHERE {SEARCH_FILTER}");
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(search.map(like_pattern))
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Distinct non-empty departments, alphabetically.
    pub async fn list_departments(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT department FROM employees
             WHERE department IS NOT NULL AND department <> ''
             ORDER BY department",
        )
        .fetch_all(pool)
        .await
    }

    /// Number of employees, active or not.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employees")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Mark an employee inactive. Returns `true` if the row changed.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE employees SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Stamp `last_login_at` after a successful login.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE employees SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

/// Wrap a search term for `ILIKE`, escaping its wildcards.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
