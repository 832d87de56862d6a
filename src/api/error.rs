use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by the gateway and the resource services.
///
/// Every variant displays as the single human-readable message that ends up in a
/// slice's `error` field; the variant only records where the failure came from.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A 2xx body did not match the expected schema.
    #[error("Unexpected response from {path}: {message}")]
    Schema { path: String, message: String },

    /// Refused client-side before any request was sent.
    #[error("{0}")]
    NotPermitted(String),

    /// Reading or writing the persisted session failed.
    #[error("Session storage error: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Pick the message to show for a failed response.
///
/// Order of preference:
/// 1. a non-empty string `error` field
/// 2. a non-empty string `message` field
/// 3. `error.message` when `error` is an object
/// 4. `fallback` (the transport text or HTTP reason phrase)
pub fn error_message(body: Option<&Value>, fallback: &str) -> String {
    let non_empty = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let Some(body) = body else {
        return fallback.to_string();
    };

    non_empty(body.get("error"))
        .or_else(|| non_empty(body.get("message")))
        .or_else(|| non_empty(body.get("error").and_then(|e| e.get("message"))))
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_field_wins() {
        let body = json!({ "error": "Invalid credentials", "message": "ignored" });
        assert_eq!(error_message(Some(&body), "Unauthorized"), "Invalid credentials");
    }

    #[test]
    fn test_message_field_used_when_no_error() {
        let body = json!({ "message": "Job not found" });
        assert_eq!(error_message(Some(&body), "Not Found"), "Job not found");
    }

    #[test]
    fn test_empty_error_falls_through_to_message() {
        let body = json!({ "error": "  ", "message": "Deadline passed" });
        assert_eq!(error_message(Some(&body), "Bad Request"), "Deadline passed");
    }

    #[test]
    fn test_nested_error_object() {
        let body = json!({ "error": { "code": "FORBIDDEN", "message": "Access denied" } });
        assert_eq!(error_message(Some(&body), "Forbidden"), "Access denied");
    }

    #[test]
    fn test_non_string_fields_use_fallback() {
        let body = json!({ "error": 42, "message": null });
        assert_eq!(error_message(Some(&body), "Internal Server Error"), "Internal Server Error");
    }

    #[test]
    fn test_missing_body_uses_fallback() {
        assert_eq!(error_message(None, "connection refused"), "connection refused");
    }

    #[test]
    fn test_display_is_the_message() {
        let err = ApiError::Status { status: 401, message: "Invalid credentials".into() };
        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(err.is_unauthorized());
        assert_eq!(ApiError::Transport("timed out".into()).status(), None);
    }
}
