use crate::domain::admin::RegisterAdminRequest;
use crate::domain::{Admin, DomainError};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn create(
        &self,
        req: &RegisterAdminRequest,
        password_hash: String,
    ) -> Result<Admin, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Admin, DomainError>;
    async fn exists(&self, username: &str, email: &str) -> Result<bool, DomainError>;
}

pub struct PostgresAdminRepository {
    pool: PgPool,
}

impl PostgresAdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn admin_from_row(row: &PgRow) -> Result<Admin, DomainError> {
    Ok(Admin {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl AdminRepository for PostgresAdminRepository {
    async fn create(
        &self,
        req: &RegisterAdminRequest,
        password_hash: String,
    ) -> Result<Admin, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO admins (username, email, password_hash, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(&req.username)
        .bind(&req.email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create admin: {}", e);
            match e.as_database_error() {
                Some(db_err) if db_err.is_unique_violation() => DomainError::AdminAlreadyExists,
                _ => DomainError::DatabaseError(e.to_string()),
            }
        })?;

        admin_from_row(&row)
    }

    async fn find_by_username(&self, username: &str) -> Result<Admin, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM admins
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => admin_from_row(&row),
            None => Err(DomainError::AdminNotFound),
        }
    }

    async fn exists(&self, username: &str, email: &str) -> Result<bool, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM admins WHERE username = $1 OR email = $2
            ) AS taken
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("taken")?)
    }
}
