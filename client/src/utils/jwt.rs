//! JWT inspection utilities for the client side.
//!
//! The client never holds the signing secret, so tokens are decoded without
//! signature verification and only used to read their expiry. The server
//! remains the authority on whether a token is valid.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Claims the client cares about. Everything else in the payload is ignored.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Claims {
    /// Subject, usually the user's cpf (string or number depending on the server)
    #[serde(default)]
    pub sub: Option<Value>,
    /// Token expiration timestamp
    #[serde(default)]
    pub exp: Option<i64>,
    /// Token issued at timestamp
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Decodes access tokens without checking their signature.
pub struct TokenInspector {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenInspector {
    pub fn new() -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        TokenInspector {
            decoding_key: DecodingKey::from_secret(&[]),
            validation,
        }
    }

    /// Returns the token's claims, or `None` when the token is not a JWT.
    pub fn inspect(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(token_data) => Some(token_data.claims),
            Err(e) => {
                tracing::debug!("Access token is not an inspectable JWT: {}", e);
                None
            }
        }
    }

    /// `Some(true)` if the token carries an `exp` in the past, `None` when
    /// expiry cannot be determined locally.
    pub fn is_expired_at(&self, token: &str, now: DateTime<Utc>) -> Option<bool> {
        self.inspect(token)
            .and_then(|claims| claims.expires_at())
            .map(|expires_at| expires_at <= now)
    }
}

impl Default for TokenInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    pub fn subject(&self) -> Option<String> {
        match self.sub.as_ref()? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    fn token_with(claims: Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_reads_claims_without_the_secret() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = token_with(json!({ "sub": 11122233344u64, "exp": exp }));

        let claims = TokenInspector::new().inspect(&token).unwrap();
        assert_eq!(claims.exp, Some(exp));
        assert_eq!(claims.subject().as_deref(), Some("11122233344"));
    }

    #[test]
    fn test_expiry_detection() {
        let inspector = TokenInspector::new();
        let now = Utc::now();
        let expired = token_with(json!({ "sub": "1", "exp": (now - Duration::minutes(5)).timestamp() }));
        let valid = token_with(json!({ "sub": "1", "exp": (now + Duration::minutes(5)).timestamp() }));
        let no_exp = token_with(json!({ "sub": "1" }));

        assert_eq!(inspector.is_expired_at(&expired, now), Some(true));
        assert_eq!(inspector.is_expired_at(&valid, now), Some(false));
        assert_eq!(inspector.is_expired_at(&no_exp, now), None);
    }

    #[test]
    fn test_opaque_tokens_are_not_inspectable() {
        let inspector = TokenInspector::new();
        assert!(inspector.inspect("opaque-access-token").is_none());
        assert_eq!(inspector.is_expired_at("opaque-access-token", Utc::now()), None);
    }
}
