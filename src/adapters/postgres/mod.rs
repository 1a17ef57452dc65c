//! PostgreSQL adapters - `sqlx` implementations of the repository ports.
//!
//! Multi-row writes run in one transaction. Races are settled by row locks
//! (`SELECT ... FOR UPDATE`) and conditional updates (`WHERE status = $n`,
//! `WHERE current_stock >= $n`), never by read-then-write in application code.

mod closes;
mod inventory;
mod menu;
mod orders;
mod tables;
mod users;

pub use closes::PostgresDailyCloseRepository;
pub use inventory::PostgresInventoryRepository;
pub use menu::PostgresMenuRepository;
pub use orders::PostgresOrderRepository;
pub use tables::PostgresTableRepository;
pub use users::PostgresUserRepository;

use std::fmt;
use std::str::FromStr;

use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row};

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// Opens the pool described by `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .connect(&config.url)
        .await
}

/// Applies `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |err| DomainError::database(context, err)
}

/// Postgres SQLSTATE 23505.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::database("Failed to decode row", e))
}

/// Text columns holding enum values.
fn parse_column<T>(raw: &str, name: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e: T::Err| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Column {} holds an unreadable value '{}': {}", name, raw, e),
        )
    })
}

fn user_id(raw: String) -> Result<UserId, DomainError> {
    UserId::new(raw).map_err(DomainError::from)
}
