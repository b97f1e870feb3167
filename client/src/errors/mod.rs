//! Application-wide error types.
//!
//! `ApiError` is the transport-level taxonomy returned by every gateway call,
//! `ServiceError` is what the session manager and the page controllers report
//! to their callers.

use thiserror::Error;

/// Errors surfaced by the API gateway client.
///
/// Server-reported failures are mapped onto these variants instead of being
/// thrown, so callers always receive a `Result` they can match on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),
    /// Invalid or expired credentials (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// The server refused the action for this user (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// Malformed request (HTTP 400 / 422).
    #[error("Validation error: {0}")]
    Validation(String),
    /// The resource does not exist or was already removed (HTTP 404 / 410).
    #[error("Not found: {0}")]
    NotFound(String),
    /// Any other non-success status.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
    /// An authenticated call was attempted without an access token.
    #[error("No access token available")]
    MissingToken,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Whether the error means the current token is no longer accepted.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::MissingToken)
    }

    /// Message suitable for a user-facing notice.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => "Erro de conexão com o servidor".to_string(),
            ApiError::MissingToken => "Sessão expirada, faça login novamente".to_string(),
            ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::Validation(message)
            | ApiError::NotFound(message)
            | ApiError::Decode(message) => message.clone(),
            ApiError::Server { message, .. } => message.clone(),
        }
    }
}

/// Generic service error that can be used across all entities
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("API error: {source}")]
    Api {
        #[from]
        source: ApiError,
    },

    #[error("Session storage error: {message}")]
    Storage { message: String },

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Session changed while the request was in flight")]
    StaleSession,

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_classification() {
        assert!(ApiError::Unauthorized("expired".into()).is_auth_failure());
        assert!(ApiError::MissingToken.is_auth_failure());
        assert!(!ApiError::Forbidden("no".into()).is_auth_failure());
        assert!(!ApiError::Network("down".into()).is_auth_failure());
    }

    #[test]
    fn test_api_error_converts_into_service_error() {
        let error: ServiceError = ApiError::NotFound("Evento 7".into()).into();
        assert!(matches!(
            error,
            ServiceError::Api {
                source: ApiError::NotFound(_)
            }
        ));
    }

    #[test]
    fn test_network_errors_get_generic_user_message() {
        let error = ApiError::Network("connection refused".into());
        assert_eq!(error.user_message(), "Erro de conexão com o servidor");
    }
}
