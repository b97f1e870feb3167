//! Response decoding shared by every endpoint.
//!
//! Maps HTTP statuses onto the `ApiError` taxonomy and extracts the payload
//! from successful responses.
//!
//! # Response Format
//! The server answers with either the bare payload or the envelope
//! `{ "success": bool, "data": T, "message": "...", "error": {...} }`; both are
//! accepted. Error bodies are searched for a human-readable message under
//! `detail`, `error`, or `message`.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{ApiError, ApiResult};

/// Envelope keys that mark a wrapped response.
const ENVELOPE_SUCCESS: &str = "success";
const ENVELOPE_DATA: &str = "data";

/// Converts a non-success HTTP response into the matching `ApiError`.
pub fn status_to_api_error(status: StatusCode, body: &str) -> ApiError {
    let message = error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unexpected response")
            .to_string()
    });

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ApiError::Validation(message)
        }
        StatusCode::NOT_FOUND | StatusCode::GONE => ApiError::NotFound(message),
        _ => ApiError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

/// Pulls a readable message out of an error body, if there is one.
pub fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.to_string());
    };

    for key in ["detail", "error", "message"] {
        match value.get(key) {
            Some(Value::String(message)) if !message.is_empty() => {
                return Some(message.clone());
            }
            // FastAPI-style validation details: [{"msg": "..."}]
            Some(Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return Some(messages.join(", "));
                }
            }
            _ => {}
        }
    }

    None
}

/// Decodes a successful body into `T`, unwrapping the envelope if present.
pub fn decode_payload<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    let value: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?
    };

    let payload = match value {
        Value::Object(mut map)
            if map.contains_key(ENVELOPE_SUCCESS) && map.contains_key(ENVELOPE_DATA) =>
        {
            map.remove(ENVELOPE_DATA).unwrap_or(Value::Null)
        }
        other => other,
    };

    serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
}
