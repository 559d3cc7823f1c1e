use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Администраторы ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub admin: Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ==================== Категории ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// ==================== Посты ====================

/// Enum-valued fields (`publish_status`, `visibility`, `content_type`) are
/// kept as the server's lowercase strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub banner_image_url: Option<String>,
    pub category_id: i64,
    pub author_id: Option<i64>,
    pub publish_status: String,
    pub publish_date: Option<DateTime<Utc>>,
    pub visibility: String,
    pub views_count: i64,
    pub shares_count: i64,
    pub language: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub category_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// `Some(None)` sends `null`, which clears the banner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_image_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl UpdatePostRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.slug.is_none()
            && self.banner_image_url.is_none()
            && self.category_id.is_none()
            && self.publish_status.is_none()
            && self.publish_date.is_none()
            && self.visibility.is_none()
            && self.language.is_none()
            && self.content_type.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterResponse {
    pub slug: String,
    pub count: i64,
}

// ==================== Рейтинги ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPost {
    pub score: i64,
    #[serde(flatten)]
    pub post: Post,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPage {
    pub category: Category,
    pub total_posts: usize,
    pub trending: Vec<RankedPost>,
    pub most_viewed: Vec<RankedPost>,
    pub newest: Vec<RankedPost>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendingBuckets {
    pub news: Vec<RankedPost>,
    pub articles: Vec<RankedPost>,
    pub stories: Vec<RankedPost>,
    pub videos: Vec<RankedPost>,
}

// ==================== Переводы ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    pub provider: Option<String>,
    pub cached: bool,
    pub degraded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedPost {
    pub slug: String,
    pub source_language: String,
    pub language: String,
    pub title: String,
    pub content: String,
    pub provider: Option<String>,
    pub degraded: bool,
}

// ==================== Публикация по расписанию ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedPost {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub publish_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepError {
    pub id: i64,
    pub slug: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub checked_at: DateTime<Utc>,
    pub published: Vec<PublishedPost>,
    pub skipped: Vec<i64>,
    pub errors: Vec<SweepError>,
}

/// Error envelope returned by every failing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub success: bool,
    pub message: String,
}
