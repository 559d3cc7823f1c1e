use crate::application::ranking::{self, CategoryRanking, TrendingBuckets};
use crate::application::translation::TranslationService;
use crate::data::category_repository::CategoryRepository;
use crate::data::post_repository::{Engagement, PostRepository};
use crate::domain::post::{
    slugify, CreatePostRequest, NewPost, PostFilter, PostResponse, UpdatePostRequest,
};
use crate::domain::{Category, ContentType, DomainError, Post, PublishStatus, Visibility};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

const DEFAULT_LANGUAGE: &str = "en";
const MAX_BUCKET_SIZE: usize = 20;

#[derive(Debug, Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub total_posts: usize,
    #[serde(flatten)]
    pub ranking: CategoryRanking,
}

#[derive(Debug, Serialize)]
pub struct TranslatedPost {
    pub slug: String,
    pub source_language: String,
    pub language: String,
    pub title: String,
    pub content: String,
    pub provider: Option<String>,
    pub degraded: bool,
}

pub struct PostService {
    post_repo: Arc<dyn PostRepository + Send + Sync>,
    category_repo: Arc<dyn CategoryRepository + Send + Sync>,
    translator: Arc<TranslationService>,
}

impl PostService {
    pub fn new(
        post_repo: Arc<dyn PostRepository + Send + Sync>,
        category_repo: Arc<dyn CategoryRepository + Send + Sync>,
        translator: Arc<TranslationService>,
    ) -> Self {
        Self {
            post_repo,
            category_repo,
            translator,
        }
    }

    pub async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<PostResponse, DomainError> {
        let now = Utc::now();

        let title = require_text("Title", &req.title)?;
        let content = require_text("Content", &req.content)?;
        let slug = resolve_slug(req.slug.as_deref(), &title)?;
        let banner_image_url = validate_banner(req.banner_image_url)?;
        self.ensure_category(req.category_id).await?;

        let publish_status = req.publish_status.unwrap_or(PublishStatus::Draft);
        let publish_date = resolve_publish_date(publish_status, req.publish_date, now)?;

        let post = self
            .post_repo
            .create(NewPost {
                title,
                slug,
                content,
                banner_image_url,
                category_id: req.category_id,
                author_id: Some(author_id),
                publish_status,
                publish_date,
                visibility: req.visibility.unwrap_or(Visibility::Public),
                language: validate_language(req.language)?,
                content_type: req.content_type.unwrap_or(ContentType::Article),
            })
            .await?;

        tracing::info!(
            "Post created: id={}, slug={}, status={}, author_id={}",
            post.id,
            post.slug,
            post.publish_status,
            author_id
        );

        Ok(PostResponse::from(post))
    }

    pub async fn update_post(
        &self,
        id: i64,
        admin_id: i64,
        req: UpdatePostRequest,
    ) -> Result<PostResponse, DomainError> {
        let now = Utc::now();
        let mut post = self.post_repo.find_by_id(id).await?;

        if let Some(title) = req.title {
            post.title = require_text("Title", &title)?;
        }
        if let Some(content) = req.content {
            post.content = require_text("Content", &content)?;
        }
        if let Some(slug) = req.slug {
            post.slug = resolve_slug(Some(&slug), &post.title)?;
        }
        if let Some(banner) = req.banner_image_url {
            post.banner_image_url = validate_banner(banner)?;
        }
        if let Some(category_id) = req.category_id {
            self.ensure_category(category_id).await?;
            post.category_id = category_id;
        }
        if let Some(visibility) = req.visibility {
            post.visibility = visibility;
        }
        if req.language.is_some() {
            post.language = validate_language(req.language)?;
        }
        if let Some(content_type) = req.content_type {
            post.content_type = content_type;
        }

        // The schedule is re-checked and written only when the request touches
        // it; otherwise the stored status stays whatever the sweep left there.
        let schedule_changed = req.publish_status.is_some() || req.publish_date.is_some();
        if schedule_changed {
            let status = req.publish_status.unwrap_or(post.publish_status);
            let date = req.publish_date.unwrap_or(post.publish_date);
            post.publish_date = resolve_publish_date(status, date, now)?;
            post.publish_status = status;
        }

        let updated = self.post_repo.update(&post, schedule_changed).await?;

        tracing::info!(
            "Post updated: id={}, status={}, admin_id={}",
            id,
            updated.publish_status,
            admin_id
        );

        Ok(PostResponse::from(updated))
    }

    pub async fn get_public_post(&self, slug: &str) -> Result<PostResponse, DomainError> {
        Ok(PostResponse::from(self.find_visible(slug).await?))
    }

    pub async fn list_admin_posts(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostResponse>, i64), DomainError> {
        if !(1..=100).contains(&limit) {
            return Err(DomainError::ValidationError(
                "Limit must be between 1 and 100".to_string(),
            ));
        }
        if offset < 0 {
            return Err(DomainError::ValidationError(
                "Offset cannot be negative".to_string(),
            ));
        }

        let (posts, total) = self.post_repo.list(&filter, limit, offset).await?;

        Ok((posts.into_iter().map(PostResponse::from).collect(), total))
    }

    pub async fn record_view(&self, slug: &str) -> Result<i64, DomainError> {
        self.post_repo.record_engagement(slug, Engagement::View).await
    }

    pub async fn record_share(&self, slug: &str) -> Result<i64, DomainError> {
        let shares = self
            .post_repo
            .record_engagement(slug, Engagement::Share)
            .await?;
        tracing::debug!("Post shared: slug={}, shares={}", slug, shares);
        Ok(shares)
    }

    pub async fn category_page(
        &self,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<CategoryPage, DomainError> {
        let category = self.category_repo.find_by_slug(slug).await?;
        if !category.is_active {
            return Err(DomainError::CategoryNotFound);
        }

        let posts = self.post_repo.list_visible(Some(category.id)).await?;
        tracing::debug!(
            "Ranking {} posts for category {}",
            posts.len(),
            category.slug
        );

        Ok(CategoryPage {
            total_posts: posts.len(),
            ranking: ranking::rank_category(&posts, now),
            category,
        })
    }

    pub async fn trending(
        &self,
        per_bucket: usize,
        now: DateTime<Utc>,
    ) -> Result<TrendingBuckets, DomainError> {
        if !(1..=MAX_BUCKET_SIZE).contains(&per_bucket) {
            return Err(DomainError::ValidationError(format!(
                "Bucket size must be between 1 and {}",
                MAX_BUCKET_SIZE
            )));
        }

        let posts = self.post_repo.list_visible(None).await?;
        Ok(ranking::trending_buckets(&posts, now, per_bucket))
    }

    pub async fn translate_post(
        &self,
        slug: &str,
        language: &str,
    ) -> Result<TranslatedPost, DomainError> {
        let post = self.find_visible(slug).await?;

        let title = self
            .translator
            .translate(&post.title, &post.language, language)
            .await?;
        let content = self
            .translator
            .translate(&post.content, &post.language, language)
            .await?;

        Ok(TranslatedPost {
            slug: post.slug,
            source_language: post.language,
            language: language.trim().to_ascii_lowercase(),
            provider: content.provider.or(title.provider),
            degraded: title.degraded || content.degraded,
            title: title.text,
            content: content.text,
        })
    }

    async fn find_visible(&self, slug: &str) -> Result<Post, DomainError> {
        let post = self.post_repo.find_by_slug(slug).await?;
        if !post.is_publicly_visible() {
            return Err(DomainError::PostNotFound);
        }
        Ok(post)
    }

    async fn ensure_category(&self, category_id: i64) -> Result<(), DomainError> {
        match self.category_repo.find_by_id(category_id).await {
            Ok(_) => Ok(()),
            Err(DomainError::CategoryNotFound) => Err(DomainError::ValidationError(format!(
                "Category {} does not exist",
                category_id
            ))),
            Err(e) => Err(e),
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::ValidationError(format!(
            "{} cannot be empty",
            field
        )));
    }
    Ok(trimmed.to_string())
}

fn resolve_slug(requested: Option<&str>, title: &str) -> Result<String, DomainError> {
    let slug = slugify(requested.unwrap_or(title));
    if slug.is_empty() {
        return Err(DomainError::ValidationError(
            "Slug must contain at least one letter or digit".to_string(),
        ));
    }
    Ok(slug)
}

fn validate_banner(url: Option<String>) -> Result<Option<String>, DomainError> {
    match url.map(|u| u.trim().to_string()) {
        None => Ok(None),
        Some(u) if u.is_empty() => Ok(None),
        Some(u) if u.starts_with("https://") || u.starts_with("http://") || u.starts_with('/') => {
            Ok(Some(u))
        }
        Some(u) => Err(DomainError::ValidationError(format!(
            "Banner image URL must be absolute or root-relative: {}",
            u
        ))),
    }
}

fn validate_language(language: Option<String>) -> Result<String, DomainError> {
    let language = language
        .map(|l| l.trim().to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    if !(2..=10).contains(&language.len())
        || !language.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
    {
        return Err(DomainError::ValidationError(format!(
            "Invalid language code: {}",
            language
        )));
    }
    Ok(language)
}

/// Scheduled posts need a date in the future; published posts without a
/// date are stamped with `now`.
fn resolve_publish_date(
    status: PublishStatus,
    date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, DomainError> {
    match (status, date) {
        (PublishStatus::Scheduled, Some(date)) if date > now => Ok(Some(date)),
        (PublishStatus::Scheduled, Some(_)) => Err(DomainError::ValidationError(
            "Scheduled posts need a publish date in the future".to_string(),
        )),
        (PublishStatus::Scheduled, None) => Err(DomainError::ValidationError(
            "Scheduled posts need a publish date".to_string(),
        )),
        (PublishStatus::Published, None) => Ok(Some(now)),
        (_, date) => Ok(date),
    }
}
