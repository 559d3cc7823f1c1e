use crate::application::{
    AuthService, CategoryService, PostService, ScheduledPublisher, TranslationService,
};
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::rate_limiter::RateLimiter;
use crate::presentation::http_handlers::{self, CronSecret, PostCreationLimiter};
use crate::presentation::middleware::{jwt_middleware, RateLimit};
use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;
use std::sync::Arc;

#[derive(Clone)]
pub struct RateLimiters {
    pub admin: Arc<RateLimiter>,
    pub public: Arc<RateLimiter>,
    pub post_creation: Arc<RateLimiter>,
}

/// Everything the handlers pull out of `app_data`.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub post_service: Arc<PostService>,
    pub category_service: Arc<CategoryService>,
    pub publisher: Arc<ScheduledPublisher>,
    pub translator: Arc<TranslationService>,
    pub jwt_service: Arc<JwtService>,
    pub limiters: RateLimiters,
    pub cron_secret: Option<String>,
}

/// Registers shared state and every `/api` route. Scope order matters:
/// the more specific prefixes must come before `/api/admin` and `/api`.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    let auth_middleware = HttpAuthentication::with_fn(jwt_middleware);

    cfg.app_data(web::Data::new(state.auth_service.clone()))
        .app_data(web::Data::new(state.post_service.clone()))
        .app_data(web::Data::new(state.category_service.clone()))
        .app_data(web::Data::new(state.publisher.clone()))
        .app_data(web::Data::new(state.translator.clone()))
        .app_data(web::Data::new(state.jwt_service.clone()))
        .app_data(web::Data::new(PostCreationLimiter(
            state.limiters.post_creation.clone(),
        )))
        .app_data(web::Data::new(CronSecret(state.cron_secret.clone())))
        .app_data(
            web::JsonConfig::default()
                .error_handler(http_handlers::extractor_error::<JsonPayloadError>),
        )
        .app_data(
            web::QueryConfig::default()
                .error_handler(http_handlers::extractor_error::<QueryPayloadError>),
        )
        .app_data(
            web::PathConfig::default().error_handler(http_handlers::extractor_error::<PathError>),
        )
        // Admin authentication
        .service(
            web::scope("/api/admin/auth")
                .wrap(RateLimit::new(state.limiters.admin.clone()))
                .route("/register", web::post().to(http_handlers::register))
                .route("/login", web::post().to(http_handlers::login)),
        )
        // Protected admin routes
        .service(
            web::scope("/api/admin")
                .wrap(auth_middleware)
                .wrap(RateLimit::new(state.limiters.admin.clone()))
                .route("/posts", web::get().to(http_handlers::list_admin_posts))
                .route("/posts", web::post().to(http_handlers::create_post))
                .route("/posts/{id}", web::put().to(http_handlers::update_post))
                .route("/categories", web::post().to(http_handlers::create_category)),
        )
        // External timer trigger
        .service(
            web::scope("/api/cron")
                .route(
                    "/publish-scheduled",
                    web::post().to(http_handlers::publish_scheduled),
                ),
        )
        // Public routes
        .service(
            web::scope("/api")
                .wrap(RateLimit::new(state.limiters.public.clone()))
                .route("/health", web::get().to(http_handlers::health))
                .route("/categories", web::get().to(http_handlers::list_categories))
                .route("/categories/{slug}", web::get().to(http_handlers::get_category))
                .route(
                    "/categories/{slug}/posts",
                    web::get().to(http_handlers::category_page),
                )
                .route("/posts/trending", web::get().to(http_handlers::trending))
                .route("/posts/{slug}", web::get().to(http_handlers::get_post))
                .route("/posts/{slug}/view", web::post().to(http_handlers::record_view))
                .route("/posts/{slug}/share", web::post().to(http_handlers::record_share))
                .route(
                    "/posts/{slug}/translation/{lang}",
                    web::get().to(http_handlers::translate_post),
                )
                .route("/translate", web::post().to(http_handlers::translate)),
        );
}
