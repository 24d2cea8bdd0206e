use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Decode(#[from] prost::DecodeError),

    #[error("{0}")]
    Form(String),
}
