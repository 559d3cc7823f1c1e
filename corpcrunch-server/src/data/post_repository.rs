use crate::domain::post::{NewPost, PostFilter};
use crate::domain::{DomainError, Post, PublishStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const POST_COLUMNS: &str = r#"
    id, title, slug, content, banner_image_url, category_id, author_id,
    publish_status, publish_date, visibility, views_count, shares_count,
    language, content_type, created_at, updated_at
"#;

/// Counter bumped by reader interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engagement {
    View,
    Share,
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Post, DomainError>;
    /// Persists the editable fields of `post`. Publish status and date are
    /// written only when `write_schedule` is set.
    async fn update(&self, post: &Post, write_schedule: bool) -> Result<Post, DomainError>;
    async fn list(
        &self,
        filter: &PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Post>, i64), DomainError>;
    /// Published + public posts, newest first. `None` means every category.
    async fn list_visible(&self, category_id: Option<i64>) -> Result<Vec<Post>, DomainError>;
    async fn find_due_scheduled(&self, now: DateTime<Utc>) -> Result<Vec<Post>, DomainError>;
    /// Returns false when the post was no longer scheduled.
    async fn mark_published(&self, id: i64) -> Result<bool, DomainError>;
    /// Bumps a counter on a visible post and returns the new value.
    async fn record_engagement(&self, slug: &str, kind: Engagement)
        -> Result<i64, DomainError>;
}

pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Stored enum text that no longer parses is a storage fault, not bad input.
fn decode_column<T>(value: String) -> Result<T, DomainError>
where
    T: std::str::FromStr<Err = DomainError>,
{
    value
        .parse()
        .map_err(|e: DomainError| DomainError::DatabaseError(e.to_string()))
}

fn post_from_row(row: &PgRow) -> Result<Post, DomainError> {
    let publish_status: String = row.try_get("publish_status")?;
    let visibility: String = row.try_get("visibility")?;
    let content_type: String = row.try_get("content_type")?;

    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        content: row.try_get("content")?,
        banner_image_url: row.try_get("banner_image_url")?,
        category_id: row.try_get("category_id")?,
        author_id: row.try_get("author_id")?,
        publish_status: decode_column(publish_status)?,
        publish_date: row.try_get("publish_date")?,
        visibility: decode_column(visibility)?,
        views_count: row.try_get("views_count")?,
        shares_count: row.try_get("shares_count")?,
        language: row.try_get("language")?,
        content_type: decode_column(content_type)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_write_error(err: sqlx::Error, slug: &str) -> DomainError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => DomainError::SlugTaken(slug.to_string()),
        Some(db_err) if db_err.is_foreign_key_violation() => DomainError::CategoryNotFound,
        _ => {
            tracing::error!("Post write failed: {}", err);
            DomainError::DatabaseError(err.to_string())
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO posts (
                title, slug, content, banner_image_url, category_id, author_id,
                publish_status, publish_date, visibility, language, content_type,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
            RETURNING {POST_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(&post.title)
            .bind(&post.slug)
            .bind(&post.content)
            .bind(&post.banner_image_url)
            .bind(post.category_id)
            .bind(post.author_id)
            .bind(post.publish_status.as_str())
            .bind(post.publish_date)
            .bind(post.visibility.as_str())
            .bind(&post.language)
            .bind(post.content_type.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &post.slug))?;

        post_from_row(&row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => post_from_row(&row),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Post, DomainError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = $1");
        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => post_from_row(&row),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn update(&self, post: &Post, write_schedule: bool) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            UPDATE posts
            SET
                title = $1,
                slug = $2,
                content = $3,
                banner_image_url = $4,
                category_id = $5,
                publish_status = CASE WHEN $12 THEN $6 ELSE publish_status END,
                publish_date = CASE WHEN $12 THEN $7 ELSE publish_date END,
                visibility = $8,
                language = $9,
                content_type = $10,
                updated_at = NOW()
            WHERE id = $11
            RETURNING {POST_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(&post.title)
            .bind(&post.slug)
            .bind(&post.content)
            .bind(&post.banner_image_url)
            .bind(post.category_id)
            .bind(post.publish_status.as_str())
            .bind(post.publish_date)
            .bind(post.visibility.as_str())
            .bind(&post.language)
            .bind(post.content_type.as_str())
            .bind(post.id)
            .bind(write_schedule)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &post.slug))?;

        match row {
            Some(row) => post_from_row(&row),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn list(
        &self,
        filter: &PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Post>, i64), DomainError> {
        let status = filter.publish_status.map(|s| s.as_str());

        let count_row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM posts
            WHERE ($1::TEXT IS NULL OR publish_status = $1)
              AND ($2::BIGINT IS NULL OR category_id = $2)
            "#,
        )
        .bind(status)
        .bind(filter.category_id)
        .fetch_one(&self.pool)
        .await?;

        let total: i64 = count_row.try_get("count")?;

        let sql = format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts
            WHERE ($1::TEXT IS NULL OR publish_status = $1)
              AND ($2::BIGINT IS NULL OR category_id = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(status)
            .bind(filter.category_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let posts = rows
            .iter()
            .map(post_from_row)
            .collect::<Result<Vec<Post>, DomainError>>()?;

        Ok((posts, total))
    }

    async fn list_visible(&self, category_id: Option<i64>) -> Result<Vec<Post>, DomainError> {
        // Unbounded on purpose: ranking happens in memory over the whole set.
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts
            WHERE publish_status = 'published'
              AND visibility = 'public'
              AND ($1::BIGINT IS NULL OR category_id = $1)
            ORDER BY created_at DESC, id DESC
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(post_from_row).collect()
    }

    async fn find_due_scheduled(&self, now: DateTime<Utc>) -> Result<Vec<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts
            WHERE publish_status = 'scheduled'
              AND publish_date <= $1
            ORDER BY publish_date ASC, id ASC
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(post_from_row).collect()
    }

    async fn mark_published(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET publish_status = $1, updated_at = NOW()
            WHERE id = $2 AND publish_status = $3
            "#,
        )
        .bind(PublishStatus::Published.as_str())
        .bind(id)
        .bind(PublishStatus::Scheduled.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn record_engagement(
        &self,
        slug: &str,
        kind: Engagement,
    ) -> Result<i64, DomainError> {
        let sql = match kind {
            Engagement::View => {
                r#"
                UPDATE posts SET views_count = views_count + 1
                WHERE slug = $1 AND publish_status = 'published' AND visibility = 'public'
                RETURNING views_count AS value
                "#
            }
            Engagement::Share => {
                r#"
                UPDATE posts SET shares_count = shares_count + 1
                WHERE slug = $1 AND publish_status = 'published' AND visibility = 'public'
                RETURNING shares_count AS value
                "#
            }
        };

        let row = sqlx::query(sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.try_get("value")?),
            None => Err(DomainError::PostNotFound),
        }
    }
}
