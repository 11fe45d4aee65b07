//! Platform Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::api::common::ErrorBody;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authorization error: {0}")]
    Unauthorized(#[from] cb_auth::AuthError),

    #[error("Webhook signature rejected")]
    SignatureRejected,

    #[error("Enqueue error: {0}")]
    Enqueue(#[from] cb_queue::EnqueueError),

    #[error("Provisioning error: {message}")]
    Provisioning { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlatformError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provisioning(source: impl std::fmt::Display) -> Self {
        Self::Provisioning {
            message: source.to_string(),
        }
    }

    pub fn database(source: impl std::fmt::Display) -> Self {
        Self::Database {
            message: source.to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) | Self::SignatureRejected => StatusCode::UNAUTHORIZED,
            Self::Enqueue(_) => StatusCode::BAD_GATEWAY,
            Self::Provisioning { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_FAILED",
            Self::Unauthorized(e) => e.code(),
            Self::SignatureRejected => "SIGNATURE_REJECTED",
            Self::Enqueue(_) => "ENQUEUE_FAILED",
            Self::Provisioning { .. } => "PROVISIONING_FAILED",
            Self::Database { .. } => "DATABASE_ERROR",
            Self::Internal { .. } => "INTERNAL",
        }
    }
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side failures are logged in full at the boundary; the
        // client sees a generic message so internals never leak.
        let message = if status.is_server_error() {
            error!(error = %self, code = self.error_code(), "request failed");
            match &self {
                Self::Enqueue(_) => "Failed to queue background work".to_string(),
                Self::Provisioning { .. } => "Provisioning failed".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            status_code: status.as_u16(),
            message,
            error_code: Some(self.error_code().to_string()),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;
    use cb_auth::AuthError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PlatformError::Unauthorized(AuthError::ExpiredToken).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            PlatformError::SignatureRejected.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            PlatformError::Enqueue(cb_queue::EnqueueError::Broker("down".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            PlatformError::provisioning("store offline").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            PlatformError::validation("bad shape").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PlatformError::Unauthorized(AuthError::MissingCredential).error_code(),
            "MISSING_CREDENTIAL"
        );
        assert_eq!(
            PlatformError::SignatureRejected.error_code(),
            "SIGNATURE_REJECTED"
        );
        assert_eq!(
            PlatformError::not_found("Project", "p1").error_code(),
            "NOT_FOUND"
        );
    }
}
