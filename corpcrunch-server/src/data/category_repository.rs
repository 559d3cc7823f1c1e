use crate::domain::category::NewCategory;
use crate::domain::{Category, DomainError};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: NewCategory) -> Result<Category, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Category, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Category, DomainError>;
    async fn list_active(&self) -> Result<Vec<Category>, DomainError>;
}

pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn category_from_row(row: &PgRow) -> Result<Category, DomainError> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create(&self, category: NewCategory) -> Result<Category, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO categories (name, slug, description, is_active, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, name, slug, description, is_active, created_at
            "#,
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create category: {}", e);
            match e.as_database_error() {
                Some(db_err) if db_err.is_unique_violation() => {
                    DomainError::SlugTaken(category.slug.clone())
                }
                _ => DomainError::DatabaseError(e.to_string()),
            }
        })?;

        category_from_row(&row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Category, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, slug, description, is_active, created_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => category_from_row(&row),
            None => Err(DomainError::CategoryNotFound),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Category, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, slug, description, is_active, created_at
            FROM categories
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => category_from_row(&row),
            None => Err(DomainError::CategoryNotFound),
        }
    }

    async fn list_active(&self) -> Result<Vec<Category>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, slug, description, is_active, created_at
            FROM categories
            WHERE is_active = TRUE
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(category_from_row).collect()
    }
}
