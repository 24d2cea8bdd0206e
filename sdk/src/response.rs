//! Responses written by generated handlers.

use std::fmt::Display;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::codec::{JsonMarshaler, JsonMessage};
use crate::error::Error;
use crate::status::Status;
use crate::{BoxError, JSON_CONTENT_TYPE};

pub const PARSE_REQUEST_FAILED: &str = "ParseRequestFailed";
pub const RENDER_RESPONSE_FAILED: &str = "RenderResponseFailed";

/// Largest request body a generated handler reads (10 MiB).
pub const BODY_LIMIT: usize = 10 << 20;

/// JSON body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorEnvelope {
    pub reason: String,
    pub code: i32,
    pub detail: String,
    pub status: String,
    pub success: bool,
}

impl From<Status> for ErrorEnvelope {
    fn from(status: Status) -> Self {
        ErrorEnvelope {
            reason: status.id,
            code: status.code,
            detail: status.detail,
            status: status.status,
            success: false,
        }
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

/// Request decoding failed.
pub fn parse_failed(err: impl Display) -> Response {
    tracing::debug!("failed to parse request: {}", err);
    ErrorEnvelope {
        reason: PARSE_REQUEST_FAILED.to_owned(),
        code: i32::from(StatusCode::BAD_REQUEST.as_u16()),
        detail: err.to_string(),
        status: String::new(),
        success: false,
    }
    .into_response()
}

/// The handler returned an error.
pub fn handler_failed(err: BoxError) -> Response {
    ErrorEnvelope::from(Status::from_error(err.as_ref())).into_response()
}

pub fn render_json<M: JsonMessage>(msg: &M, marshaler: &JsonMarshaler) -> Response {
    match msg.to_json(marshaler) {
        Ok(buf) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
            buf,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("failed to render response: {}", err);
            let envelope = ErrorEnvelope::from(Status::internal_server_error(RENDER_RESPONSE_FAILED, err.to_string()));
            (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope)).into_response()
        }
    }
}

pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// The request's `Content-Type`, or `""` when absent or not valid text.
pub fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Buffers the request body, failing once it exceeds [`BODY_LIMIT`].
pub async fn read_body(body: Body) -> Result<Bytes, Error> {
    Ok(axum::body::to_bytes(body, BODY_LIMIT).await?)
}
