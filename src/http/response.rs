//! Download responses.
//!
//! # Responsibilities
//! - Stream a processed file from upstream to the client
//! - Set `Content-Disposition: attachment` with the file name
//! - Choose `Content-Type` by the resource's policy
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};

use crate::forward::ProxyError;
use crate::routing::action::DOWNLOAD_FAILURE;
use crate::routing::ContentTypePolicy;

/// `Content-Disposition` value offering `file_name` as a download.
pub fn attachment_disposition(file_name: &str) -> Result<HeaderValue, ProxyError> {
    HeaderValue::from_str(&format!("attachment; filename={}", file_name))
        .map_err(|e| ProxyError::failed(DOWNLOAD_FAILURE, e))
}

/// Build the client response for a successful upstream download.
pub fn attachment(
    file_name: &str,
    policy: ContentTypePolicy,
    upstream: reqwest::Response,
) -> Result<Response, ProxyError> {
    let upstream_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let content_type = policy.resolve(file_name, upstream_type);

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, attachment_disposition(file_name)?);
    if let Some(len) = upstream.content_length() {
        builder = builder.header(header::CONTENT_LENGTH, len);
    }

    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| ProxyError::failed(DOWNLOAD_FAILURE, e))
}
