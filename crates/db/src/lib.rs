//! PostgreSQL persistence: pool setup, migrations, models, and repositories.
//!
//! Also provides the PostgreSQL implementations of the core storage traits:
//! [`code_ledger::PgCodeLedger`] and [`session_store::PgSessionStore`].

use sqlx::postgres::PgPoolOptions;

pub mod code_ledger;
pub mod models;
pub mod repositories;
pub mod session_store;

pub type DbPool = sqlx::PgPool;

/// SQLSTATE for unique constraint violations.
pub const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE raised when a referenced table does not exist.
pub const UNDEFINED_TABLE: &str = "42P01";

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all embedded migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Name of the unique constraint violated by `err`, if any.
pub fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            db_err.constraint()
        }
        _ => None,
    }
}
