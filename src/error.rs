//! Error taxonomy for the Spark service.
//!
//! Four failure classes, each with its own HTTP status. Nothing is retried
//! internally and no partial message is ever returned — a request produces
//! either a complete message or exactly one of these errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SparkError {
    /// No resolvable caller identity behind the bearer credential.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The request is missing a required input (in practice: the mood).
    #[error("{0}")]
    InvalidArgument(&'static str),

    /// The entries lookup failed — distinct from an empty result.
    #[error("entries lookup failed: {0}")]
    Repository(String),

    /// The completion provider failed, timed out, or returned a response
    /// without a usable completion.
    #[error("completion provider failed: {0}")]
    Upstream(String),
}

impl SparkError {
    pub fn status(&self) -> StatusCode {
        match self {
            SparkError::Unauthenticated => StatusCode::UNAUTHORIZED,
            SparkError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            SparkError::Repository(_) | SparkError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for SparkError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
