//! protoweb
//!
//! Runtime support for the code emitted by `protoc-gen-web`.
//!
//! - `JsonMessage` and the `JsonMarshaler` / `JsonUnmarshaler` configurations
//!   implementing protobuf's canonical JSON mapping
//! - Form decoding with weak, type-coercing field assignment
//! - `Status` error translation and the JSON error envelope
//! - Response helpers and the request `Context` handed to handlers

pub mod codec;
pub mod context;
pub mod error;
pub mod form;
pub mod response;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use async_trait::async_trait;
pub use axum;
pub use serde;

pub use codec::{marshal_optional, JsonMarshaler, JsonMessage, JsonUnmarshaler};
pub use context::Context;
pub use error::Error;
pub use response::{
    content_type, handler_failed, no_content, parse_failed, read_body, render_json, ErrorEnvelope, BODY_LIMIT,
};
pub use status::Status;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What a generated handler trait method returns.
pub type HandlerResult = Result<(), BoxError>;
