use std::fmt;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Error value handlers return to control the error envelope.
///
/// Any other error is translated with [`Status::from_error`]: its message is
/// parsed as a JSON-encoded `Status`, and when that fails the whole message
/// becomes the detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    pub id: String,
    pub code: i32,
    pub detail: String,
    pub status: String,
}

impl Status {
    pub fn new(id: impl Into<String>, code: StatusCode, detail: impl Into<String>) -> Self {
        Status {
            id: id.into(),
            code: i32::from(code.as_u16()),
            detail: detail.into(),
            status: code.canonical_reason().unwrap_or_default().to_owned(),
        }
    }

    pub fn bad_request(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Status::new(id, StatusCode::BAD_REQUEST, detail)
    }

    pub fn unauthorized(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Status::new(id, StatusCode::UNAUTHORIZED, detail)
    }

    pub fn forbidden(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Status::new(id, StatusCode::FORBIDDEN, detail)
    }

    pub fn not_found(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Status::new(id, StatusCode::NOT_FOUND, detail)
    }

    pub fn conflict(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Status::new(id, StatusCode::CONFLICT, detail)
    }

    pub fn internal_server_error(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Status::new(id, StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Status {
        match err.downcast_ref::<Status>() {
            Some(status) => status.clone(),
            None => Status::parse(&err.to_string()),
        }
    }

    pub fn parse(text: &str) -> Status {
        serde_json::from_str(text).unwrap_or_else(|_| Status {
            detail: text.to_owned(),
            ..Status::default()
        })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str(&self.detail),
        }
    }
}

impl std::error::Error for Status {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoxError;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct Plain(String);

    #[test]
    fn test_constructor_fills_status_text() {
        let status = Status::not_found("user.missing", "no such user");
        assert_eq!(status.code, 404);
        assert_eq!(status.status, "Not Found");
        assert_eq!(status.id, "user.missing");
    }

    #[test]
    fn test_from_error_downcasts() {
        let err: BoxError = Box::new(Status::conflict("dup", "already exists"));
        assert_eq!(Status::from_error(err.as_ref()), Status::conflict("dup", "already exists"));
    }

    #[test]
    fn test_from_error_parses_json_message() {
        let original = Status::forbidden("auth", "nope");
        let err = Plain(original.to_string());
        assert_eq!(Status::from_error(&err), original);
    }

    #[test]
    fn test_from_error_falls_back_to_detail() {
        let status = Status::from_error(&Plain("database is down".to_owned()));
        assert_eq!(status, Status { detail: "database is down".to_owned(), ..Status::default() });
    }

    #[test]
    fn test_parse_partial_json() {
        let status = Status::parse(r#"{"id": "x", "code": 409}"#);
        assert_eq!(status.id, "x");
        assert_eq!(status.code, 409);
        assert!(status.detail.is_empty());
    }
}
