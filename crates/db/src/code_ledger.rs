//! PostgreSQL-backed [`CodeLedger`] used by project creation.
//!
//! The ledger borrows the connection of an open transaction. Sequence
//! numbers come from `project_code_sequences`, whose per-year row stays
//! locked by the upsert until the transaction ends, so concurrent
//! allocations for the same year are serialized.

use async_trait::async_trait;
use pms_core::allocation::{AnnualKey, CodeLedger};
use pms_core::project_code::ANNUAL_SEQUENCE;
use sqlx::PgConnection;

/// Allocation storage scoped to one transaction.
pub struct PgCodeLedger<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgCodeLedger<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CodeLedger for PgCodeLedger<'_> {
    type Error = sqlx::Error;

    async fn year_suffix(&mut self) -> Result<String, sqlx::Error> {
        let (suffix,): (String,) = sqlx::query_as("SELECT to_char(NOW(), 'YY')")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(suffix)
    }

    async fn count_annual(&mut self, key: &AnnualKey) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM projects
             WHERE year_suffix = $1
               AND business_unit_code = $2
               AND client_or_dept_code = $3
               AND project_category = $4
               AND annual_seq = $5",
        )
        .bind(&key.year_suffix)
        .bind(&key.business_unit)
        .bind(&key.client_or_dept)
        .bind(&key.category)
        .bind(ANNUAL_SEQUENCE)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(count)
    }

    async fn next_sequence(&mut self, year_suffix: &str) -> Result<u32, sqlx::Error> {
        // Seeds from the highest normal sequence already stored for the year
        // so existing rows are never shadowed.
        let (value,): (i32,) = sqlx::query_as(
            "INSERT INTO project_code_sequences (year_suffix, last_value)
             VALUES (
                 $1,
                 COALESCE(
                     (SELECT MAX(annual_seq::int) FROM projects
                      WHERE year_suffix = $1 AND annual_seq <> $2),
                     0
                 ) + 1
             )
             ON CONFLICT (year_suffix) DO UPDATE
             SET last_value = GREATEST(project_code_sequences.last_value + 1, EXCLUDED.last_value),
                 updated_at = NOW()
             RETURNING last_value",
        )
        .bind(year_suffix)
        .bind(ANNUAL_SEQUENCE)
        .fetch_one(&mut *self.conn)
        .await?;

        u32::try_from(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
    }

    async fn code_exists(&mut self, code: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM projects WHERE project_code = $1)")
                .bind(code)
                .fetch_one(&mut *self.conn)
                .await?;
        Ok(exists)
    }
}
