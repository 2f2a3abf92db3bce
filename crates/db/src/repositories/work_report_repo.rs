//! Repository for the `work_reports` table.

use chrono::NaiveDate;
use pms_core::types::DbId;
use pms_core::work_report::{ReportStatus, ReviewDecision};
use sqlx::PgPool;

use crate::models::work_report::{CreateWorkReport, WorkReport};

/// Joined columns for [`WorkReport`]; `w` is the report row (or CTE).
const COLUMNS: &str = "w.id, w.employee_id, e.name AS employee_name, w.project_id, \
                       p.project_code, p.project_name, w.task_description, w.hours_spent, \
                       w.report_date, w.status, w.reviewed_by, w.reviewed_at, w.created_at";

/// Join clause that follows `FROM <reports> w`.
const JOINS: &str = "JOIN employees e ON e.id = w.employee_id \
                     JOIN projects p ON p.id = w.project_id";

/// Provides CRUD operations for work reports.
pub struct WorkReportRepo;

impl WorkReportRepo {
    /// Insert a new pending report, returning the joined row.
    pub async fn create(pool: &PgPool, input: &CreateWorkReport) -> Result<WorkReport, sqlx::Error> {
        let query = format!(
            "WITH w AS (
                INSERT INTO work_reports
                    (employee_id, project_id, task_description, hours_spent, report_date)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
             )
             SELECT {COLUMNS} FROM w {JOINS}"
        );
        sqlx::query_as::<_, WorkReport>(&query)
            .bind(input.employee_id)
            .bind(input.project_id)
            .bind(&input.task_description)
            .bind(input.hours_spent)
            .bind(input.report_date)
            .fetch_one(pool)
            .await
    }

    /// Find a report by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WorkReport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM work_reports w {JOINS} WHERE w.id = $1");
        sqlx::query_as::<_, WorkReport>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Reports submitted by one employee, optionally limited to one date.
    pub async fn list_for_employee(
        pool: &PgPool,
        employee_id: DbId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<WorkReport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM work_reports w {JOINS}
             WHERE w.employee_id = $1
               AND ($2::DATE IS NULL OR w.report_date = $2)
             ORDER BY w.report_date DESC, w.id DESC"
        );
        sqlx::query_as::<_, WorkReport>(&query)
            .bind(employee_id)
            .bind(date)
            .fetch_all(pool)
            .await
    }

    /// One page of reports awaiting review, oldest first.
    pub async fn list_pending(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkReport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM work_reports w {JOINS}
             WHERE w.status = $1
             ORDER BY w.created_at ASC, w.id ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, WorkReport>(&query)
            .bind(ReportStatus::Pending.id())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of reports awaiting review.
    pub async fn count_pending(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM work_reports WHERE status = $1")
            .bind(ReportStatus::Pending.id())
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Apply a review decision to a pending report.
    ///
    /// Returns `None` if the report does not exist or was already reviewed.
    pub async fn review(
        pool: &PgPool,
        id: DbId,
        reviewer_id: DbId,
        decision: ReviewDecision,
    ) -> Result<Option<WorkReport>, sqlx::Error> {
        let query = format!(
            "WITH w AS (
                UPDATE work_reports
                SET status = $3, reviewed_by = $2, reviewed_at = NOW()
                WHERE id = $1 AND status = $4
                RETURNING *
             )
             SELECT {COLUMNS} FROM w {JOINS}"
        );
        sqlx::query_as::<_, WorkReport>(&query)
            .bind(id)
            .bind(reviewer_id)
            .bind(decision.resulting_status().id())
            .bind(ReportStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }
}
