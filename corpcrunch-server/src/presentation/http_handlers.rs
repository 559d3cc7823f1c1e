use crate::application::post_service::PostService;
use crate::application::translation::TranslationService;
use crate::application::{AuthService, CategoryService, ScheduledPublisher};
use crate::domain::admin::{AdminResponse, LoginAdminRequest, RegisterAdminRequest};
use crate::domain::category::CreateCategoryRequest;
use crate::domain::post::{CreatePostRequest, PostFilter, PostResponse, UpdatePostRequest};
use crate::domain::{DomainError, PublishStatus};
use crate::infrastructure::jwt::AdminId;
use crate::infrastructure::rate_limiter::RateLimiter;
use crate::presentation::middleware::{enforce_limit, verify_cron_secret};
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Limiter applied on top of the admin scope when posts are created.
pub struct PostCreationLimiter(pub Arc<RateLimiter>);

/// Shared secret for the publish sweep trigger.
pub struct CronSecret(pub Option<String>);

#[derive(Serialize)]
struct AuthResponse {
    token: String,
    admin: AdminResponse,
}

#[derive(Deserialize)]
pub struct AdminPostsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub status: Option<PublishStatus>,
    pub category_id: Option<i64>,
}

#[derive(Serialize)]
struct PostsResponse {
    posts: Vec<PostResponse>,
    total: i64,
    limit: i64,
    offset: i64,
}

#[derive(Deserialize)]
pub struct TrendingQuery {
    pub per_bucket: Option<usize>,
}

#[derive(Serialize)]
struct CounterResponse {
    slug: String,
    count: i64,
}

#[derive(Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

fn admin_id_from_request(req: &HttpRequest) -> Result<i64, DomainError> {
    req.extensions()
        .get::<AdminId>()
        .map(|id| id.0)
        .ok_or(DomainError::Unauthorized(
            "Admin not authenticated".to_string(),
        ))
}

/// Converts a domain error into the `{success: false, message}` envelope.
/// Server-side failures are logged and their detail withheld.
pub fn error_to_response(err: DomainError) -> HttpResponse {
    let status = StatusCode::from_u16(err.to_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = if err.is_server_error() && !matches!(err, DomainError::UpstreamError(_)) {
        tracing::error!("Request failed: {}", err);
        "Internal server error".to_string()
    } else {
        err.to_string()
    };

    HttpResponse::build(status).json(serde_json::json!({
        "success": false,
        "message": message,
    }))
}

/// Error handler for the `Json`, `Query` and `Path` extractors, so malformed
/// input gets the same envelope as a domain validation failure.
pub fn extractor_error<E>(err: E, _req: &HttpRequest) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    tracing::debug!("Rejected request input: {}", err);
    let response = error_to_response(DomainError::ValidationError(err.to_string()));
    InternalError::from_response(err, response).into()
}

// ============== Admin Auth Handlers ==============

pub async fn register(
    auth_service: web::Data<Arc<AuthService>>,
    req: web::Json<RegisterAdminRequest>,
) -> impl Responder {
    match auth_service.register(req.into_inner()).await {
        Ok((token, admin)) => HttpResponse::Created().json(AuthResponse { token, admin }),
        Err(err) => error_to_response(err),
    }
}

pub async fn login(
    auth_service: web::Data<Arc<AuthService>>,
    req: web::Json<LoginAdminRequest>,
) -> impl Responder {
    match auth_service.login(req.into_inner()).await {
        Ok((token, admin)) => HttpResponse::Ok().json(AuthResponse { token, admin }),
        Err(err) => error_to_response(err),
    }
}

// ============== Admin Handlers ==============

pub async fn list_admin_posts(
    post_service: web::Data<Arc<PostService>>,
    query: web::Query<AdminPostsQuery>,
) -> impl Responder {
    let query = query.into_inner();
    let limit = query.limit.unwrap_or(20);
    let offset = query.offset.unwrap_or(0);
    let filter = PostFilter {
        publish_status: query.status,
        category_id: query.category_id,
    };

    match post_service.list_admin_posts(filter, limit, offset).await {
        Ok((posts, total)) => HttpResponse::Ok().json(PostsResponse {
            posts,
            total,
            limit,
            offset,
        }),
        Err(err) => error_to_response(err),
    }
}

pub async fn create_post(
    req: HttpRequest,
    post_service: web::Data<Arc<PostService>>,
    limiter: web::Data<PostCreationLimiter>,
    post_data: web::Json<CreatePostRequest>,
) -> impl Responder {
    if let Err(response) = enforce_limit(&limiter.0, req.headers(), req.peer_addr()) {
        return response;
    }

    let admin_id = match admin_id_from_request(&req) {
        Ok(id) => id,
        Err(err) => return error_to_response(err),
    };

    tracing::info!("Creating post for admin_id={}", admin_id);

    match post_service
        .create_post(admin_id, post_data.into_inner())
        .await
    {
        Ok(post) => HttpResponse::Created().json(post),
        Err(err) => error_to_response(err),
    }
}

pub async fn update_post(
    req: HttpRequest,
    post_service: web::Data<Arc<PostService>>,
    path: web::Path<i64>,
    post_data: web::Json<UpdatePostRequest>,
) -> impl Responder {
    let post_id = path.into_inner();

    let admin_id = match admin_id_from_request(&req) {
        Ok(id) => id,
        Err(err) => return error_to_response(err),
    };

    tracing::info!("Updating post id={} for admin_id={}", post_id, admin_id);

    match post_service
        .update_post(post_id, admin_id, post_data.into_inner())
        .await
    {
        Ok(post) => HttpResponse::Ok().json(post),
        Err(err) => error_to_response(err),
    }
}

pub async fn create_category(
    category_service: web::Data<Arc<CategoryService>>,
    req: web::Json<CreateCategoryRequest>,
) -> impl Responder {
    match category_service.create_category(req.into_inner()).await {
        Ok(category) => HttpResponse::Created().json(category),
        Err(err) => error_to_response(err),
    }
}

// ============== Cron Handlers ==============

pub async fn publish_scheduled(
    req: HttpRequest,
    publisher: web::Data<Arc<ScheduledPublisher>>,
    secret: web::Data<CronSecret>,
) -> impl Responder {
    if let Err(err) = verify_cron_secret(req.headers(), secret.0.as_deref()) {
        tracing::warn!("Rejected publish sweep trigger: {}", err);
        return error_to_response(err);
    }

    match publisher.run_sweep(Utc::now()).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(err) => error_to_response(err),
    }
}

// ============== Public Handlers ==============

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_categories(
    category_service: web::Data<Arc<CategoryService>>,
) -> impl Responder {
    match category_service.list_active().await {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(err) => error_to_response(err),
    }
}

pub async fn get_category(
    category_service: web::Data<Arc<CategoryService>>,
    path: web::Path<String>,
) -> impl Responder {
    let slug = path.into_inner();

    match category_service.get_by_slug(&slug).await {
        Ok(category) => HttpResponse::Ok().json(category),
        Err(err) => error_to_response(err),
    }
}

pub async fn category_page(
    post_service: web::Data<Arc<PostService>>,
    path: web::Path<String>,
) -> impl Responder {
    let slug = path.into_inner();

    match post_service.category_page(&slug, Utc::now()).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_to_response(err),
    }
}

pub async fn trending(
    post_service: web::Data<Arc<PostService>>,
    query: web::Query<TrendingQuery>,
) -> impl Responder {
    let per_bucket = query.per_bucket.unwrap_or(crate::application::ranking::BUCKET_LIMIT);

    match post_service.trending(per_bucket, Utc::now()).await {
        Ok(buckets) => HttpResponse::Ok().json(buckets),
        Err(err) => error_to_response(err),
    }
}

pub async fn get_post(
    post_service: web::Data<Arc<PostService>>,
    path: web::Path<String>,
) -> impl Responder {
    let slug = path.into_inner();

    match post_service.get_public_post(&slug).await {
        Ok(post) => HttpResponse::Ok().json(post),
        Err(err) => error_to_response(err),
    }
}

pub async fn record_view(
    post_service: web::Data<Arc<PostService>>,
    path: web::Path<String>,
) -> impl Responder {
    let slug = path.into_inner();

    match post_service.record_view(&slug).await {
        Ok(count) => HttpResponse::Ok().json(CounterResponse { slug, count }),
        Err(err) => error_to_response(err),
    }
}

pub async fn record_share(
    post_service: web::Data<Arc<PostService>>,
    path: web::Path<String>,
) -> impl Responder {
    let slug = path.into_inner();

    match post_service.record_share(&slug).await {
        Ok(count) => HttpResponse::Ok().json(CounterResponse { slug, count }),
        Err(err) => error_to_response(err),
    }
}

pub async fn translate_post(
    post_service: web::Data<Arc<PostService>>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (slug, language) = path.into_inner();

    match post_service.translate_post(&slug, &language).await {
        Ok(translated) => HttpResponse::Ok().json(translated),
        Err(err) => error_to_response(err),
    }
}

pub async fn translate(
    translator: web::Data<Arc<TranslationService>>,
    req: web::Json<TranslateRequest>,
) -> impl Responder {
    let req = req.into_inner();

    match translator
        .translate(&req.text, &req.source_lang, &req.target_lang)
        .await
    {
        Ok(translation) => HttpResponse::Ok().json(translation),
        Err(err) => error_to_response(err),
    }
}
