//! Centralized API error handling for the VidTube backend
//!
//! This module provides a unified error type for API responses with proper
//! HTTP status code mapping and JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::{AuthError, TokenRejection};

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Unauthorized: {0}")]
    MissingToken(String),

    #[error("Unauthorized: {0}")]
    TokenExpired(String),

    #[error("Unauthorized: {0}")]
    MalformedToken(String),

    #[error("Unauthorized: {0}")]
    SupersededToken(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in the response
#[derive(Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InvalidCredentials(_) => "INVALID_CREDENTIALS",
            ApiError::MissingToken(_) => "MISSING_TOKEN",
            ApiError::TokenExpired(_) => "TOKEN_EXPIRED",
            ApiError::MalformedToken(_) => "INVALID_TOKEN",
            ApiError::SupersededToken(_) => "TOKEN_SUPERSEDED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidCredentials(_)
            | ApiError::MissingToken(_)
            | ApiError::TokenExpired(_)
            | ApiError::MalformedToken(_)
            | ApiError::SupersededToken(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        // Log server errors
        match &self {
            ApiError::Internal(_) => {
                tracing::error!(error = %message, code = %error_code, "Server error occurred");
            }
            _ => {
                tracing::debug!(error = %message, code = %error_code, "Client error occurred");
            }
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

// Convenience conversions from lower layers

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::Validation(_) => ApiError::Validation(message),
            AuthError::NotFound => ApiError::NotFound(message),
            AuthError::InvalidCredentials => ApiError::InvalidCredentials(message),
            AuthError::Unauthorized(TokenRejection::Missing) => ApiError::MissingToken(message),
            AuthError::Unauthorized(TokenRejection::Expired) => ApiError::TokenExpired(message),
            AuthError::Unauthorized(TokenRejection::Malformed) => ApiError::MalformedToken(message),
            AuthError::Unauthorized(TokenRejection::Superseded) => {
                ApiError::SupersededToken(message)
            }
            AuthError::Conflict(_) => ApiError::Conflict(message),
            AuthError::Internal(_) => ApiError::Internal(message),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ApiError::Validation("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            ApiError::NotFound("test".to_string()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            ApiError::InvalidCredentials("test".to_string()).error_code(),
            "INVALID_CREDENTIALS"
        );
        assert_eq!(
            ApiError::TokenExpired("test".to_string()).error_code(),
            "TOKEN_EXPIRED"
        );
        assert_eq!(
            ApiError::SupersededToken("test".to_string()).error_code(),
            "TOKEN_SUPERSEDED"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("test".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidCredentials("test".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::SupersededToken("test".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Conflict("test".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        let err: ApiError = AuthError::Unauthorized(TokenRejection::Superseded).into();
        assert_eq!(err.error_code(), "TOKEN_SUPERSEDED");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err: ApiError = AuthError::Unauthorized(TokenRejection::Expired).into();
        assert_eq!(err.error_code(), "TOKEN_EXPIRED");

        let err: ApiError = AuthError::InvalidCredentials.into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err: ApiError = AuthError::NotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
