//! Error types for the Pluton admin daemon

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Main error type for the admin control plane
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Field {0} is mandatory")]
    Validation(&'static str),

    #[error("{0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No functionality is mapped to this endpoint yet: {0}")]
    UnmappedRoute(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Deployment log parse error: {0}")]
    Parse(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        AdminError::Internal(err.to_string())
    }
}

impl AdminError {
    /// HTTP status the error surfaces as at the admin API boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdminError::Validation(_) | AdminError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AdminError::Authorization(_) => StatusCode::UNAUTHORIZED,
            AdminError::NotFound(_) | AdminError::UnmappedRoute(_) => StatusCode::NOT_FOUND,
            // Store failures reach the client only where a handler catches
            // them locally; an uncaught one is a server fault.
            AdminError::Parse(_)
            | AdminError::Store(_)
            | AdminError::IoError(_)
            | AdminError::JsonError(_)
            | AdminError::ConfigError(_)
            | AdminError::ServerError(_)
            | AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
