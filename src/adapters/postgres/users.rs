//! PostgreSQL implementation of UserRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, Role, Timestamp, UserId};
use crate::domain::staff::StaffAccount;
use crate::ports::UserRepository;

use super::{column, db_error, is_unique_violation, parse_column, user_id};

const USER_COLUMNS: &str = "id, email, name, role, password_hash, active, created_at";

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_account(row: &PgRow) -> Result<StaffAccount, DomainError> {
    let role: String = column(row, "role")?;
    let created_at: DateTime<Utc> = column(row, "created_at")?;
    Ok(StaffAccount {
        id: user_id(column(row, "id")?)?,
        email: column(row, "email")?,
        name: column(row, "name")?,
        role: parse_column::<Role>(&role, "role")?,
        password_hash: column(row, "password_hash")?,
        active: column(row, "active")?,
        created_at: Timestamp::from_datetime(created_at),
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, account: &StaffAccount) -> Result<(), DomainError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO staff_users ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                name = EXCLUDED.name,
                role = EXCLUDED.role,
                password_hash = EXCLUDED.password_hash,
                active = EXCLUDED.active
            "#,
            USER_COLUMNS
        ))
        .bind(account.id.as_str())
        .bind(&account.email)
        .bind(&account.name)
        .bind(account.role.as_str())
        .bind(&account.password_hash)
        .bind(account.active)
        .bind(account.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(
                    ErrorCode::AlreadyExists,
                    format!("Email {} is already registered", account.email),
                )
                .with_detail("email", account.email.clone())
            } else {
                DomainError::database("Failed to save staff account", e)
            }
        })?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StaffAccount>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM staff_users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch staff account"))?;
        row.as_ref().map(row_to_account).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<StaffAccount>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM staff_users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch staff account"))?;
        row.as_ref().map(row_to_account).transpose()
    }
}
