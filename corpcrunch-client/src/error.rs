use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpCrunchClientError {
    // HTTP ошибки
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    // Ошибки API
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<u64>,
    },

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    // Ошибки сериализации/десериализации
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl CorpCrunchClientError {
    /// Maps a non-success status and the server's error message.
    pub fn from_status(status: u16, message: String, retry_after: Option<u64>) -> Self {
        match status {
            400 | 422 => Self::InvalidRequest(message),
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            429 => Self::RateLimited {
                message,
                retry_after,
            },
            _ => Self::ServerError { status, message },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_variants() {
        assert!(CorpCrunchClientError::from_status(404, "Post not found".into(), None).is_not_found());
        assert!(CorpCrunchClientError::from_status(401, "no".into(), None).is_unauthorized());
        assert!(matches!(
            CorpCrunchClientError::from_status(409, "busy".into(), None),
            CorpCrunchClientError::Conflict(_)
        ));
        match CorpCrunchClientError::from_status(429, "slow down".into(), Some(30)) {
            CorpCrunchClientError::RateLimited { retry_after, .. } => {
                assert_eq!(retry_after, Some(30))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            CorpCrunchClientError::from_status(502, "upstream".into(), None),
            CorpCrunchClientError::ServerError { status: 502, .. }
        ));
    }
}
