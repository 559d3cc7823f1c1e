use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Admin not found")]
    AdminNotFound,

    #[error("Admin already exists")]
    AdminAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Post not found")]
    PostNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Slug already in use: {0}")]
    SlugTaken(String),

    #[error("A publish sweep is already running")]
    SweepInProgress,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Too many requests, retry in {0} seconds")]
    RateLimited(u64),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Translation upstream error: {0}")]
    UpstreamError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn to_status_code(&self) -> u16 {
        match self {
            Self::AdminNotFound | Self::PostNotFound | Self::CategoryNotFound => 404,
            Self::AdminAlreadyExists | Self::SlugTaken(_) | Self::SweepInProgress => 409,
            Self::InvalidCredentials | Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::ValidationError(_) => 400,
            Self::RateLimited(_) => 429,
            Self::UpstreamError(_) => 502,
            Self::DatabaseError(_) | Self::InternalError(_) => 500,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.to_status_code() >= 500
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_cover_the_http_mapping() {
        assert_eq!(DomainError::ValidationError("x".into()).to_status_code(), 400);
        assert_eq!(DomainError::InvalidCredentials.to_status_code(), 401);
        assert_eq!(DomainError::Forbidden("x".into()).to_status_code(), 403);
        assert_eq!(DomainError::PostNotFound.to_status_code(), 404);
        assert_eq!(DomainError::SlugTaken("a".into()).to_status_code(), 409);
        assert_eq!(DomainError::RateLimited(3).to_status_code(), 429);
        assert_eq!(DomainError::DatabaseError("x".into()).to_status_code(), 500);
        assert!(DomainError::UpstreamError("x".into()).is_server_error());
    }
}
