//! Error types for LearnGate
//!
//! One enum for the whole API. Each variant maps onto exactly one HTTP
//! status, so route handlers can return `Result` and let the boundary
//! layer format the response. Collaborator errors (database, media CDN)
//! are translated here, never swallowed.

use hyper::StatusCode;

/// Main error type for LearnGate operations
#[derive(Debug, thiserror::Error)]
pub enum LearngateError {
    /// Malformed identifier or missing/invalid request field
    #[error("Validation error: {0}")]
    Validation(String),

    /// No resolvable caller identity
    #[error("Unauthorized: {0}")]
    Unauthenticated(String),

    /// Caller lacks role or entitlement
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Course, lesson, or enrollment absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate enrollment (or any uniqueness violation)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence layer failure
    #[error("Database error: {0}")]
    Database(String),

    /// Media CDN adapter failure
    #[error("Media delivery error: {0}")]
    Delivery(String),

    /// Malformed HTTP request (body too large, bad JSON)
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LearngateError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Http(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

}

// Implement From conversions for common error types

impl From<std::io::Error> for LearngateError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for LearngateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Http(format!("JSON error: {}", err))
    }
}

impl From<hyper::Error> for LearngateError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

impl From<mongodb::error::Error> for LearngateError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for LearngateError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Unauthenticated(format!("JWT error: {}", err))
    }
}

/// Result type alias for LearnGate operations
pub type Result<T> = std::result::Result<T, LearngateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            LearngateError::Validation("bad id".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LearngateError::Unauthenticated("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            LearngateError::Forbidden("not enrolled".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            LearngateError::NotFound("course".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            LearngateError::Conflict("already enrolled".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            LearngateError::Database("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            LearngateError::Delivery("cdn".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_message_identifies_field() {
        let err = LearngateError::Validation("courseId is not a valid identifier".into());
        assert!(err.to_string().contains("courseId"));
    }
}
