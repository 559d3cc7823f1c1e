use crate::infrastructure::rate_limiter::RateLimitPolicy;
use anyhow::{anyhow, Context, Result};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub publisher: PublisherConfig,
    pub rate_limits: RateLimitConfig,
    pub translation: TranslationConfig,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub port: u16,
    pub cors_allowed_origins: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub allow_admin_registration: bool,
}

#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Shared secret expected in `x-cron-secret`. `None` leaves the endpoint open.
    pub cron_secret: Option<String>,
    /// In-process sweep interval. `None` disables the ticker.
    pub sweep_interval: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub admin: RateLimitPolicy,
    pub public: RateLimitPolicy,
    pub post_creation: RateLimitPolicy,
}

#[derive(Debug, Clone)]
pub struct TranslationConfig {
    pub mymemory_url: String,
    pub mymemory_email: Option<String>,
    pub libretranslate_url: Option<String>,
    pub libretranslate_api_key: Option<String>,
    pub request_timeout: Duration,
    pub cache_capacity: u64,
}

impl AppConfig {
    /// Reads configuration from the environment (after `.env` was loaded).
    pub fn from_env() -> Result<Self> {
        let sweep_secs: u64 = parse_or("PUBLISH_SWEEP_INTERVAL_SECS", 0)?;

        Ok(Self {
            http: HttpConfig {
                port: parse_or("HTTP_PORT", 3000)?,
                cors_allowed_origins: string_or(
                    "CORS_ALLOWED_ORIGINS",
                    "http://localhost:3000,http://127.0.0.1:3000",
                ),
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
                acquire_timeout_secs: parse_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 5)?,
            },
            auth: AuthConfig {
                jwt_secret: required("JWT_SECRET")?,
                allow_admin_registration: parse_or("ALLOW_ADMIN_REGISTRATION", false)?,
            },
            publisher: PublisherConfig {
                cron_secret: optional("CRON_SECRET"),
                sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            },
            rate_limits: RateLimitConfig {
                admin: policy("ADMIN", RateLimitPolicy::admin())?,
                public: policy("PUBLIC", RateLimitPolicy::public())?,
                post_creation: policy("POST_CREATION", RateLimitPolicy::post_creation())?,
            },
            translation: TranslationConfig {
                mymemory_url: string_or("MYMEMORY_URL", "https://api.mymemory.translated.net"),
                mymemory_email: optional("MYMEMORY_EMAIL"),
                libretranslate_url: optional("LIBRETRANSLATE_URL"),
                libretranslate_api_key: optional("LIBRETRANSLATE_API_KEY"),
                request_timeout: Duration::from_secs(parse_or("TRANSLATION_TIMEOUT_SECS", 10)?),
                cache_capacity: parse_or("TRANSLATION_CACHE_CAPACITY", 1000)?,
            },
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(key: &str) -> Result<String> {
    optional(key).ok_or_else(|| anyhow!("{} must be set", key))
}

fn string_or(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match optional(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| anyhow!("{}", e))
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
    }
}

// RATE_LIMIT_<NAME>_MAX and RATE_LIMIT_<NAME>_WINDOW_SECS override the defaults.
fn policy(name: &str, default: RateLimitPolicy) -> Result<RateLimitPolicy> {
    let max_requests = parse_or(
        &format!("RATE_LIMIT_{}_MAX", name),
        default.max_requests,
    )?;
    let window_secs = parse_or(
        &format!("RATE_LIMIT_{}_WINDOW_SECS", name),
        default.window.as_secs(),
    )?;

    if max_requests == 0 || window_secs == 0 {
        return Err(anyhow!(
            "Rate limit {} needs a positive maximum and window",
            name
        ));
    }

    Ok(RateLimitPolicy {
        name: default.name,
        max_requests,
        window: Duration::from_secs(window_secs),
    })
}
