//! Error types for the store client.
//!
//! # Design
//! Elasticsearch reports failures as `{"error": {...}, "status": n}`. When a
//! response carries that object the client surfaces it as `Store` with the
//! object's key/value pairs intact, so callers can print every detail the
//! store gave. Any other non-2xx response lands in `HttpError` with the raw
//! status code and body.

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors returned by `StoreClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The store answered with a structured error object.
    #[error("store error {status}: {}", summary(.detail))]
    Store {
        status: u16,
        detail: Map<String, Value>,
    },

    /// The store returned a non-2xx status without a structured error.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// HTTP status associated with the error, if the store answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Store { status, .. } | ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `type` field of a structured store error, e.g. `index_not_found_exception`.
    pub fn error_type(&self) -> Option<&str> {
        match self {
            ApiError::Store { detail, .. } => detail.get("type").and_then(Value::as_str),
            _ => None,
        }
    }
}

fn summary(detail: &Map<String, Value>) -> String {
    let kind = detail.get("type").and_then(Value::as_str).unwrap_or("unknown");
    match detail.get("reason").and_then(Value::as_str) {
        Some(reason) => format!("{kind}: {reason}"),
        None => kind.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn store_error_display_includes_type_and_reason() {
        let detail = json!({"type": "index_not_found_exception", "reason": "no such index [todo]"});
        let err = ApiError::Store {
            status: 404,
            detail: detail.as_object().unwrap().clone(),
        };
        assert_eq!(
            err.to_string(),
            "store error 404: index_not_found_exception: no such index [todo]"
        );
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.error_type(), Some("index_not_found_exception"));
    }

    #[test]
    fn store_error_without_reason_shows_type_only() {
        let detail = json!({"type": "security_exception"});
        let err = ApiError::Store {
            status: 401,
            detail: detail.as_object().unwrap().clone(),
        };
        assert_eq!(err.to_string(), "store error 401: security_exception");
    }

    #[test]
    fn codec_errors_have_no_status() {
        assert_eq!(ApiError::DeserializationError("x".into()).status(), None);
        assert_eq!(ApiError::SerializationError("x".into()).error_type(), None);
    }
}
