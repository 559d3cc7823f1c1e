use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Draft,
    Review,
    Scheduled,
    Published,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
        }
    }
}

impl FromStr for PublishStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "review" => Ok(Self::Review),
            "scheduled" => Ok(Self::Scheduled),
            "published" => Ok(Self::Published),
            other => Err(DomainError::ValidationError(format!(
                "Unknown publish status: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    Public,
    Private,
    Internal,
    MembersOnly,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Internal => "internal",
            Self::MembersOnly => "members-only",
        }
    }
}

impl FromStr for Visibility {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "internal" => Ok(Self::Internal),
            "members-only" => Ok(Self::MembersOnly),
            other => Err(DomainError::ValidationError(format!(
                "Unknown visibility: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Video,
    Magazine,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Video => "video",
            Self::Magazine => "magazine",
        }
    }
}

impl FromStr for ContentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(Self::Article),
            "video" => Ok(Self::Video),
            "magazine" => Ok(Self::Magazine),
            other => Err(DomainError::ValidationError(format!(
                "Unknown content type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub banner_image_url: Option<String>,
    pub category_id: i64,
    pub author_id: Option<i64>,
    pub publish_status: PublishStatus,
    pub publish_date: Option<DateTime<Utc>>,
    pub visibility: Visibility,
    pub views_count: i64,
    pub shares_count: i64,
    pub language: String,
    pub content_type: ContentType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Readers only ever see posts that are both published and public.
    pub fn is_publicly_visible(&self) -> bool {
        self.publish_status == PublishStatus::Published && self.visibility == Visibility::Public
    }

    /// A scheduled post whose publish date has arrived.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.publish_status == PublishStatus::Scheduled
            && self.publish_date.is_some_and(|date| date <= now)
    }

    /// Date used for recency: the publish date when known, the creation time otherwise.
    pub fn recency_date(&self) -> DateTime<Utc> {
        self.publish_date.unwrap_or(self.created_at)
    }
}

/// Fully validated post ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub banner_image_url: Option<String>,
    pub category_id: i64,
    pub author_id: Option<i64>,
    pub publish_status: PublishStatus,
    pub publish_date: Option<DateTime<Utc>>,
    pub visibility: Visibility,
    pub language: String,
    pub content_type: ContentType,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub slug: Option<String>,
    pub banner_image_url: Option<String>,
    pub category_id: i64,
    pub publish_status: Option<PublishStatus>,
    pub publish_date: Option<DateTime<Utc>>,
    pub visibility: Option<Visibility>,
    pub language: Option<String>,
    pub content_type: Option<ContentType>,
}

/// Partial update. For the nullable columns an absent field leaves the value
/// alone and an explicit `null` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub banner_image_url: Option<Option<String>>,
    pub category_id: Option<i64>,
    pub publish_status: Option<PublishStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub publish_date: Option<Option<DateTime<Utc>>>,
    pub visibility: Option<Visibility>,
    pub language: Option<String>,
    pub content_type: Option<ContentType>,
}

fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Admin-side listing filter.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PostFilter {
    pub publish_status: Option<PublishStatus>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub banner_image_url: Option<String>,
    pub category_id: i64,
    pub author_id: Option<i64>,
    pub publish_status: PublishStatus,
    pub publish_date: Option<DateTime<Utc>>,
    pub visibility: Visibility,
    pub views_count: i64,
    pub shares_count: i64,
    pub language: String,
    pub content_type: ContentType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            content: post.content,
            banner_image_url: post.banner_image_url,
            category_id: post.category_id,
            author_id: post.author_id,
            publish_status: post.publish_status,
            publish_date: post.publish_date,
            visibility: post.visibility,
            views_count: post.views_count,
            shares_count: post.shares_count,
            language: post.language,
            content_type: post.content_type,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Lowercase ASCII slug: alphanumerics kept, every other run collapsed to one `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn update_request_tells_null_from_absent() {
        let absent: UpdatePostRequest = serde_json::from_str(r#"{"title": "New"}"#).unwrap();
        assert_eq!(absent.banner_image_url, None);
        assert_eq!(absent.publish_date, None);

        let cleared: UpdatePostRequest =
            serde_json::from_str(r#"{"banner_image_url": null, "publish_date": null}"#).unwrap();
        assert_eq!(cleared.banner_image_url, Some(None));
        assert_eq!(cleared.publish_date, Some(None));

        let set: UpdatePostRequest = serde_json::from_str(
            r#"{"banner_image_url": "https://cdn.corpcrunch.io/b.png", "publish_date": "2026-05-01T09:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(
            set.banner_image_url,
            Some(Some("https://cdn.corpcrunch.io/b.png".to_string()))
        );
        assert!(matches!(set.publish_date, Some(Some(_))));
    }

    fn post(status: PublishStatus, visibility: Visibility) -> Post {
        let now = Utc::now();
        Post {
            id: 1,
            title: "t".to_string(),
            slug: "t".to_string(),
            content: "c".to_string(),
            banner_image_url: None,
            category_id: 1,
            author_id: None,
            publish_status: status,
            publish_date: None,
            visibility,
            views_count: 0,
            shares_count: 0,
            language: "en".to_string(),
            content_type: ContentType::Article,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn only_published_public_posts_are_visible() {
        assert!(post(PublishStatus::Published, Visibility::Public).is_publicly_visible());
        assert!(!post(PublishStatus::Published, Visibility::MembersOnly).is_publicly_visible());
        assert!(!post(PublishStatus::Published, Visibility::Private).is_publicly_visible());
        assert!(!post(PublishStatus::Scheduled, Visibility::Public).is_publicly_visible());
        assert!(!post(PublishStatus::Draft, Visibility::Public).is_publicly_visible());
    }

    #[test]
    fn scheduled_post_is_due_once_date_passes() {
        let now = Utc::now();
        let mut p = post(PublishStatus::Scheduled, Visibility::Public);

        p.publish_date = Some(now + Duration::minutes(5));
        assert!(!p.is_due(now));

        p.publish_date = Some(now);
        assert!(p.is_due(now));

        p.publish_date = None;
        assert!(!p.is_due(now));
    }

    #[test]
    fn recency_date_falls_back_to_created_at() {
        let mut p = post(PublishStatus::Published, Visibility::Public);
        assert_eq!(p.recency_date(), p.created_at);

        let published = p.created_at - Duration::days(3);
        p.publish_date = Some(published);
        assert_eq!(p.recency_date(), published);
    }

    #[test]
    fn enums_round_trip_through_their_storage_names() {
        assert_eq!("members-only".parse::<Visibility>().unwrap(), Visibility::MembersOnly);
        assert_eq!(Visibility::MembersOnly.as_str(), "members-only");
        assert_eq!("scheduled".parse::<PublishStatus>().unwrap(), PublishStatus::Scheduled);
        assert_eq!("magazine".parse::<ContentType>().unwrap(), ContentType::Magazine);
        assert!("archived".parse::<PublishStatus>().is_err());
    }

    #[test]
    fn visibility_serializes_kebab_case() {
        let json = serde_json::to_string(&Visibility::MembersOnly).unwrap();
        assert_eq!(json, "\"members-only\"");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust  &  Web 2026 "), "rust-web-2026");
        assert_eq!(slugify("---"), "");
    }
}
