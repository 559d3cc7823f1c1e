use dotenvy::dotenv;
use std::sync::Arc;

use corpcrunch_server::application::publisher::start_publish_ticker;
use corpcrunch_server::application::{
    AuthService, CategoryService, PostService, ScheduledPublisher, TranslationService,
};
use corpcrunch_server::data::{
    admin_repository::PostgresAdminRepository, category_repository::PostgresCategoryRepository,
    post_repository::PostgresPostRepository,
};
use corpcrunch_server::infrastructure::{
    config::AppConfig,
    database::{create_pool, run_migrations},
    jwt::JwtService,
    logging::init_logging,
    rate_limiter::RateLimiter,
    translation_providers::providers_from_config,
};
use corpcrunch_server::presentation::routes::{self, AppState, RateLimiters};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    init_logging();

    let config = AppConfig::from_env()?;
    let http_addr = format!("0.0.0.0:{}", config.http.port);

    tracing::info!("Starting CorpCrunch server...");
    tracing::info!("HTTP server will listen on {}", http_addr);

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let pool = create_pool(&config.database).await?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    run_migrations(&pool).await?;

    // Initialize services
    tracing::info!("Initializing services...");

    let jwt_service = Arc::new(JwtService::new(&config.auth.jwt_secret)?);

    // Repositories
    let admin_repo = Arc::new(PostgresAdminRepository::new(pool.clone()));
    let category_repo = Arc::new(PostgresCategoryRepository::new(pool.clone()));
    let post_repo = Arc::new(PostgresPostRepository::new(pool.clone()));

    // Application services
    let translator = Arc::new(TranslationService::new(
        providers_from_config(&config.translation)?,
        config.translation.cache_capacity,
    ));
    let auth_service = Arc::new(AuthService::new(
        admin_repo,
        jwt_service.clone(),
        config.auth.allow_admin_registration,
    ));
    let post_service = Arc::new(PostService::new(
        post_repo.clone(),
        category_repo.clone(),
        translator.clone(),
    ));
    let category_service = Arc::new(CategoryService::new(category_repo));
    let publisher = Arc::new(ScheduledPublisher::new(post_repo));

    if !config.auth.allow_admin_registration {
        tracing::info!("Admin registration is closed");
    }

    if config.publisher.cron_secret.is_none() {
        tracing::warn!("CRON_SECRET is not set, the publish trigger accepts any caller");
    }

    if let Some(interval) = config.publisher.sweep_interval {
        tokio::spawn(start_publish_ticker(publisher.clone(), interval));
    }

    let state = AppState {
        auth_service,
        post_service,
        category_service,
        publisher,
        translator,
        jwt_service,
        limiters: RateLimiters {
            admin: Arc::new(RateLimiter::new(config.rate_limits.admin.clone())),
            public: Arc::new(RateLimiter::new(config.rate_limits.public.clone())),
            post_creation: Arc::new(RateLimiter::new(config.rate_limits.post_creation.clone())),
        },
        cron_secret: config.publisher.cron_secret.clone(),
    };

    tracing::info!("Services initialized successfully");

    run_http_server(http_addr, state, config.http.cors_allowed_origins).await?;

    tracing::info!("Shutting down...");
    Ok(())
}

/// Configure CORS for the HTTP server with allowed origins from .env
fn configure_cors(allowed_origins: &str) -> actix_cors::Cors {
    use actix_cors::Cors;
    use actix_web::http::header;

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-cron-secret"),
        ])
        .expose_headers(vec![
            header::RETRY_AFTER,
            header::HeaderName::from_static("x-ratelimit-limit"),
            header::HeaderName::from_static("x-ratelimit-remaining"),
        ])
        .max_age(3600);

    for origin in allowed_origins.split(',').map(str::trim) {
        if !origin.is_empty() {
            cors = cors.allowed_origin(origin);
            tracing::debug!("Added allowed CORS origin: {}", origin);
        }
    }

    cors
}

async fn run_http_server(
    addr: String,
    state: AppState,
    cors_allowed_origins: String,
) -> anyhow::Result<()> {
    use actix_web::{middleware::Logger, App, HttpServer};

    tracing::info!("CORS allowed origins: {}", cors_allowed_origins);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(configure_cors(&cors_allowed_origins))
            .configure(|cfg| routes::configure(cfg, &state))
    })
    .bind(&addr)?
    .run();

    tracing::info!("HTTP server running on {}", addr);

    server.await?;

    Ok(())
}
