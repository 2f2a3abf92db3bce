//! Repository for the `projects` table.

use pms_core::allocation::{allocate_code, AllocationError, AllocationRequest, AnnualKey};
use pms_core::project_code::ProjectCode;
use pms_core::types::DbId;
use sqlx::PgPool;

use crate::code_ledger::PgCodeLedger;
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::unique_violation;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_code, project_name, status, project_type, project_category, \
                       business_unit_code, client_or_dept_code, year_suffix, annual_seq, \
                       phase_type, project_manager_id, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Allocate a project code and insert the project in one transaction.
    ///
    /// Nothing is written unless both the allocation and the insert succeed.
    /// Unique violations raised by the insert are reported the same way as
    /// the allocator's own checks.
    pub async fn create_with_allocated_code(
        pool: &PgPool,
        input: &CreateProject,
    ) -> Result<Project, AllocationError<sqlx::Error>> {
        let request = AllocationRequest {
            business_unit: input.business_unit_code.clone(),
            client_or_dept: input.client_or_dept_code.clone(),
            category: input.project_category.clone(),
            project_type: input.project_type,
            is_annual: input.is_annual,
        };
        // Reject bad input before opening a transaction.
        request.validate().map_err(AllocationError::Validation)?;

        let mut tx = pool.begin().await.map_err(AllocationError::Storage)?;

        let code = {
            let mut ledger = PgCodeLedger::new(&mut *tx);
            allocate_code(&mut ledger, &request).await?
        };

        let query = format!(
            "INSERT INTO projects
                (project_code, project_name, project_type, project_category,
                 business_unit_code, client_or_dept_code, year_suffix, annual_seq,
                 phase_type, project_manager_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Project>(&query)
            .bind(code.to_string())
            .bind(&input.project_name)
            .bind(input.project_type.map(|t| t.id()))
            .bind(&code.category)
            .bind(&code.business_unit)
            .bind(&code.client_or_dept)
            .bind(&code.year_suffix)
            .bind(code.annual_seq())
            .bind(code.phase_type.to_string())
            .bind(input.project_manager_id)
            .fetch_one(&mut *tx)
            .await;

        let project = match inserted {
            Ok(project) => project,
            Err(e) => return Err(classify_insert_error(e, &code)),
        };

        tx.commit().await.map_err(AllocationError::Storage)?;

        tracing::info!(
            project_id = project.id,
            project_code = %project.project_code,
            "Project created",
        );
        Ok(project)
    }

    /// Find a project by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project by its full code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE project_code = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List projects, newest first, optionally filtered by status.
    pub async fn list(pool: &PgPool, status: Option<&str>) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Update mutable project fields. Only non-`None` fields are applied;
    /// the code and its fragments are never touched.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                project_name = COALESCE($2, project_name),
                status = COALESCE($3, status),
                project_manager_id = COALESCE($4, project_manager_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.project_name)
            .bind(&input.status)
            .bind(input.project_manager_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project. Returns `true` if a row was removed.
    ///
    /// Its sequence number is not handed out again.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn classify_insert_error(err: sqlx::Error, code: &ProjectCode) -> AllocationError<sqlx::Error> {
    match unique_violation(&err) {
        Some("uq_projects_annual") => AllocationError::DuplicateAnnual {
            key: AnnualKey {
                year_suffix: code.year_suffix.clone(),
                business_unit: code.business_unit.clone(),
                client_or_dept: code.client_or_dept.clone(),
                category: code.category.clone(),
            },
        },
        Some("uq_projects_project_code") => AllocationError::Collision {
            code: code.to_string(),
        },
        _ => AllocationError::Storage(err),
    }
}
