//! Error types and HTTP status mapping

use serde::Serialize;
use thiserror::Error;

use crate::token::ValidationErrors;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// API error with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("failed to validate - {0}")]
    ValidationFailed(ValidationErrors),

    #[error("invalid token: {message}")]
    InvalidToken { message: String },

    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("{message}")]
    ConfigMissing { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },

    #[error("upstream error: {message}")]
    UpstreamError { message: String },
}

impl ApiError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::ConfigMissing {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn upstream_error(message: impl Into<String>) -> Self {
        Self::UpstreamError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. } => 400,
            Self::ValidationFailed(_) => 400,
            Self::InvalidToken { .. } => 401,
            Self::PermissionDenied { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::ConfigMissing { .. } => 500,
            Self::Internal { .. } => 500,
            Self::UpstreamError { .. } => 502,
        }
    }

    /// Get the error key for this error
    pub fn error_key(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::ValidationFailed(_) => "validation_failed",
            Self::InvalidToken { .. } => "invalid_token",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::NotFound { .. } => "not_found",
            Self::ConfigMissing { .. } => "config_missing",
            Self::Internal { .. } => "internal_error",
            Self::UpstreamError { .. } => "upstream_error",
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationFailed(errors)
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.error_key().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Violation, ViolationKind};

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::invalid_request("x").status_code(), 400);
        assert_eq!(ApiError::invalid_token("x").status_code(), 401);
        assert_eq!(ApiError::permission_denied("x").status_code(), 403);
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::config_missing("x").status_code(), 500);
        assert_eq!(ApiError::upstream_error("x").status_code(), 502);
    }

    #[test]
    fn test_validation_failed_renders_every_violation() {
        let mut errors = ValidationErrors::new();
        errors.push(Violation::new(ViolationKind::EmptyName, "name is empty"));
        errors.push(Violation::new(ViolationKind::EmptyScopes, "scopes are empty"));

        let err = ApiError::from(errors);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_key(), "validation_failed");

        let message = err.to_string();
        assert!(message.starts_with("failed to validate - "));
        assert!(message.contains("name is empty"));
        assert!(message.contains("scopes are empty"));
    }

    #[test]
    fn test_error_response_from_api_error() {
        let err = ApiError::config_missing("GitLab backend configuration has not been set up");
        let body = ErrorResponse::from(&err);
        assert_eq!(body.error, "config_missing");
        assert_eq!(body.message, "GitLab backend configuration has not been set up");
    }
}
