pub mod auth_service;
pub mod category_service;
pub mod post_service;
pub mod publisher;
pub mod ranking;
pub mod translation;

pub use auth_service::AuthService;
pub use category_service::CategoryService;
pub use post_service::PostService;
pub use publisher::ScheduledPublisher;
pub use translation::TranslationService;
