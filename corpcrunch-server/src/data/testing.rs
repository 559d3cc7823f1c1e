//! In-memory repositories for unit and handler tests.

use crate::data::admin_repository::AdminRepository;
use crate::data::category_repository::CategoryRepository;
use crate::data::post_repository::{Engagement, PostRepository};
use crate::domain::admin::RegisterAdminRequest;
use crate::domain::category::NewCategory;
use crate::domain::post::{NewPost, PostFilter};
use crate::domain::{Admin, Category, DomainError, Post, PublishStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: Mutex<Vec<Post>>,
    failing_ids: Mutex<HashSet<i64>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: Mutex::new(posts),
            failing_ids: Mutex::new(HashSet::new()),
        }
    }

    /// Makes `mark_published` fail for this id.
    pub fn fail_on(&self, id: i64) {
        self.failing_ids.lock().unwrap().insert(id);
    }

    pub fn snapshot(&self, id: i64) -> Option<Post> {
        self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let mut posts = self.posts.lock().unwrap();
        if posts.iter().any(|p| p.slug == post.slug) {
            return Err(DomainError::SlugTaken(post.slug));
        }

        let now = Utc::now();
        let created = Post {
            id: posts.iter().map(|p| p.id).max().unwrap_or(0) + 1,
            title: post.title,
            slug: post.slug,
            content: post.content,
            banner_image_url: post.banner_image_url,
            category_id: post.category_id,
            author_id: post.author_id,
            publish_status: post.publish_status,
            publish_date: post.publish_date,
            visibility: post.visibility,
            views_count: 0,
            shares_count: 0,
            language: post.language,
            content_type: post.content_type,
            created_at: now,
            updated_at: now,
        };
        posts.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError> {
        self.snapshot(id).ok_or(DomainError::PostNotFound)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Post, DomainError> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or(DomainError::PostNotFound)
    }

    async fn update(&self, post: &Post, write_schedule: bool) -> Result<Post, DomainError> {
        let mut posts = self.posts.lock().unwrap();
        if posts.iter().any(|p| p.slug == post.slug && p.id != post.id) {
            return Err(DomainError::SlugTaken(post.slug.clone()));
        }

        let stored = posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(DomainError::PostNotFound)?;
        let (publish_status, publish_date) = if write_schedule {
            (post.publish_status, post.publish_date)
        } else {
            (stored.publish_status, stored.publish_date)
        };
        *stored = Post {
            publish_status,
            publish_date,
            views_count: stored.views_count,
            shares_count: stored.shares_count,
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..post.clone()
        };
        Ok(stored.clone())
    }

    async fn list(
        &self,
        filter: &PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Post>, i64), DomainError> {
        let posts = self.posts.lock().unwrap();
        let matching: Vec<Post> = posts
            .iter()
            .rev()
            .filter(|p| filter.publish_status.map_or(true, |s| p.publish_status == s))
            .filter(|p| filter.category_id.map_or(true, |c| p.category_id == c))
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_visible(&self, category_id: Option<i64>) -> Result<Vec<Post>, DomainError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_publicly_visible())
            .filter(|p| category_id.map_or(true, |c| p.category_id == c))
            .cloned()
            .collect())
    }

    async fn find_due_scheduled(&self, now: DateTime<Utc>) -> Result<Vec<Post>, DomainError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_due(now))
            .cloned()
            .collect())
    }

    async fn mark_published(&self, id: i64) -> Result<bool, DomainError> {
        if self.failing_ids.lock().unwrap().contains(&id) {
            return Err(DomainError::DatabaseError("connection reset".to_string()));
        }

        let mut posts = self.posts.lock().unwrap();
        match posts.iter_mut().find(|p| p.id == id) {
            Some(p) if p.publish_status == PublishStatus::Scheduled => {
                p.publish_status = PublishStatus::Published;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn record_engagement(
        &self,
        slug: &str,
        kind: Engagement,
    ) -> Result<i64, DomainError> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| p.slug == slug && p.is_publicly_visible())
            .ok_or(DomainError::PostNotFound)?;

        let counter = match kind {
            Engagement::View => &mut post.views_count,
            Engagement::Share => &mut post.shares_count,
        };
        *counter += 1;
        Ok(*counter)
    }
}

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    categories: Mutex<Vec<Category>>,
}

impl InMemoryCategoryRepository {
    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            categories: Mutex::new(categories),
        }
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, category: NewCategory) -> Result<Category, DomainError> {
        let mut categories = self.categories.lock().unwrap();
        if categories.iter().any(|c| c.slug == category.slug) {
            return Err(DomainError::SlugTaken(category.slug));
        }

        let created = Category {
            id: categories.len() as i64 + 1,
            name: category.name,
            slug: category.slug,
            description: category.description,
            is_active: category.is_active,
            created_at: Utc::now(),
        };
        categories.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Category, DomainError> {
        self.categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(DomainError::CategoryNotFound)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Category, DomainError> {
        self.categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.slug == slug)
            .cloned()
            .ok_or(DomainError::CategoryNotFound)
    }

    async fn list_active(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryAdminRepository {
    admins: Mutex<Vec<Admin>>,
}

#[async_trait]
impl AdminRepository for InMemoryAdminRepository {
    async fn create(
        &self,
        req: &RegisterAdminRequest,
        password_hash: String,
    ) -> Result<Admin, DomainError> {
        let mut admins = self.admins.lock().unwrap();
        let admin = Admin {
            id: admins.len() as i64 + 1,
            username: req.username.clone(),
            email: req.email.clone(),
            password_hash,
            created_at: Utc::now(),
        };
        admins.push(admin.clone());
        Ok(admin)
    }

    async fn find_by_username(&self, username: &str) -> Result<Admin, DomainError> {
        self.admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.username == username)
            .cloned()
            .ok_or(DomainError::AdminNotFound)
    }

    async fn exists(&self, username: &str, email: &str) -> Result<bool, DomainError> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.username == username || a.email == email))
    }
}

pub fn category(id: i64, slug: &str) -> Category {
    Category {
        id,
        name: slug.to_string(),
        slug: slug.to_string(),
        description: None,
        is_active: true,
        created_at: Utc::now(),
    }
}

/// A published, public article in category 1.
pub fn published_post(id: i64, slug: &str) -> Post {
    let now = Utc::now();
    Post {
        id,
        title: slug.to_string(),
        slug: slug.to_string(),
        content: format!("Body of {slug}."),
        banner_image_url: None,
        category_id: 1,
        author_id: None,
        publish_status: PublishStatus::Published,
        publish_date: Some(now),
        visibility: crate::domain::Visibility::Public,
        views_count: 0,
        shares_count: 0,
        language: "en".to_string(),
        content_type: crate::domain::ContentType::Article,
        created_at: now,
        updated_at: now,
    }
}
