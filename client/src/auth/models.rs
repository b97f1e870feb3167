//! Data structures for authentication-related entities.
//!
//! Login, refresh and identity payloads exchanged with the API, plus the
//! in-memory `Session` and the `SessionState` published to observers.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::errors::{ServiceError, ServiceResult};
use crate::models::User;

/// Login request payload. Either `cpf` or `email` identifies the user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_identifier"))]
pub struct LoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Must be a valid email"))]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "Password is required"))]
    pub senha: String,
}

fn validate_identifier(request: &LoginRequest) -> Result<(), ValidationError> {
    if request.cpf.is_none() && request.email.as_deref().is_none_or(str::is_empty) {
        let mut error = ValidationError::new("identifier_required");
        error.message = Some(Cow::from("CPF or email is required"));
        return Err(error);
    }
    Ok(())
}

impl LoginRequest {
    /// Builds a request from whatever the user typed: a CPF (with or without
    /// punctuation) or an email address.
    pub fn from_identifier(identifier: &str, password: impl Into<String>) -> Self {
        let identifier = identifier.trim();
        let digits: String = identifier.chars().filter(|c| c.is_ascii_digit()).collect();
        let is_cpf = !digits.is_empty()
            && identifier
                .chars()
                .all(|c| c.is_ascii_digit() || c == '.' || c == '-');

        if is_cpf {
            if let Ok(cpf) = digits.parse::<u64>() {
                return LoginRequest {
                    cpf: Some(cpf),
                    email: None,
                    senha: password.into(),
                };
            }
        }

        LoginRequest {
            cpf: None,
            email: Some(identifier.to_string()).filter(|s| !s.is_empty()),
            senha: password.into(),
        }
    }

    /// Runs the `validator` rules and flattens failures into one message.
    pub fn check(&self) -> ServiceResult<()> {
        if let Err(validation_errors) = self.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();
            return Err(ServiceError::validation(error_messages.join(", ")));
        }
        Ok(())
    }
}

/// Login response containing tokens and user info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(rename = "usuario")]
    pub user: User,
}

/// Token refresh request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Token refresh response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
}

/// Identity probe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    #[serde(rename = "usuario")]
    pub user: User,
}

/// An authenticated session. Owned by the session manager; everyone else sees
/// clones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: User,
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Session {
            access_token: response.access_token,
            refresh_token: Some(response.refresh_token),
            user: response.user,
        }
    }
}

/// Lifecycle of the session as seen by observers.
///
/// `Unknown → Restoring → {Authenticated, Anonymous}`; afterwards only
/// `Authenticated ⇄ Anonymous`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unknown,
    Restoring,
    Authenticated(User),
    Anonymous,
}

impl SessionState {
    pub fn is_resolved(&self) -> bool {
        matches!(self, SessionState::Authenticated(_) | SessionState::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}
