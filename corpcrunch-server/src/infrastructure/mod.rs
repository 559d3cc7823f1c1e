pub mod config;
pub mod database;
pub mod jwt;
pub mod logging;
pub mod rate_limiter;
pub mod translation_providers;
