pub mod admin;
pub mod category;
pub mod error;
pub mod post;

pub use admin::Admin;
pub use category::Category;
pub use error::DomainError;
pub use post::{ContentType, Post, PublishStatus, Visibility};
