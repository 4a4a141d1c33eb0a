//! Forwarding error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors a forwarding handler can return to the browser.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Upstream answered with a non-success status; relayed as-is.
    #[error("upstream returned {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    /// The call could not complete (network, malformed body, bad input stream).
    #[error("{message}: {cause}")]
    Failed { message: &'static str, cause: String },

    /// Request rejected before anything was forwarded.
    #[error("bad request: {0}")]
    BadRequest(&'static str),
}

/// Errors building the forwarding client at startup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid upstream base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("upstream base URL cannot take path segments: {0}")]
    OpaqueBaseUrl(String),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

impl ProxyError {
    /// Collapse any failure into a generic 500 with `message`.
    pub fn failed(message: &'static str, cause: impl std::fmt::Display) -> Self {
        ProxyError::Failed {
            message,
            cause: cause.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Upstream { status, .. } => *status,
            ProxyError::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message shown to the client.
    pub fn client_message(&self) -> &str {
        match self {
            ProxyError::Upstream { message, .. } => message,
            ProxyError::Failed { message, .. } => message,
            ProxyError::BadRequest(message) => message,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        if let ProxyError::Failed { message, cause } = &self {
            tracing::error!(error = %cause, "{}", message);
        }
        let body = Json(ErrorBody {
            error: self.client_message(),
        });
        (self.status(), body).into_response()
    }
}
