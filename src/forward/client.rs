//! Upstream client shared by every forwarding handler.
//!
//! # Responsibilities
//! - Build upstream URLs from the configured base and a resource prefix
//! - Issue exactly one upstream call per client request (no retries)
//! - Relay upstream error messages with the upstream status
//! - Collapse transport failures into the handler's generic 500

use std::time::{Duration, Instant};

use url::Url;

use crate::config::UpstreamConfig;
use crate::forward::error::{ProxyError, SetupError};
use crate::forward::form::UploadForm;
use crate::forward::reply::{ProcessReply, UpstreamErrorBody, UpstreamReply};
use crate::observability::metrics;
use crate::routing::action::{
    Action, DELETE_FAILURE, DELETE_FALLBACK, DOWNLOAD_FAILURE, DOWNLOAD_NOT_FOUND,
};
use crate::routing::Resource;

/// Forwards requests to the processing backend.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    base: Url,
}

impl Forwarder {
    /// Build a forwarder for the configured upstream.
    pub fn new(config: &UpstreamConfig) -> Result<Self, SetupError> {
        let base = Url::parse(&config.base_url)?;
        if base.cannot_be_a_base() {
            return Err(SetupError::OpaqueBaseUrl(config.base_url.clone()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Upstream URL for `resource` followed by `path` segments.
    ///
    /// Segments are percent-encoded, so file names cannot escape the prefix.
    pub fn endpoint(&self, resource: Resource, path: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        // cannot_be_a_base was rejected in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(resource.upstream_prefix())
                .extend(path);
        }
        url
    }

    /// Forward a processing upload and reshape the reply.
    pub async fn upload(
        &self,
        action: &Action,
        suffix: Option<&str>,
        form: UploadForm,
    ) -> Result<ProcessReply, ProxyError> {
        let mut url = self.endpoint(action.resource, action.path);
        if let Some(suffix) = suffix {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.push(suffix);
            }
        }

        tracing::debug!(
            route = action.name,
            upstream = %url,
            payload_bytes = form.payload_len(),
            "Forwarding upload"
        );

        let form = form
            .into_form()
            .map_err(|e| ProxyError::failed(action.failure_message, e))?;

        let start = Instant::now();
        let response = match self.client.post(url).multipart(form).send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_upstream(action.name, None, start);
                return Err(ProxyError::failed(action.failure_message, e));
            }
        };
        let status = response.status();
        metrics::record_upstream(action.name, Some(status.as_u16()), start);

        if !status.is_success() {
            return Err(relay_error(response, action.fallback_error).await);
        }

        let upstream: UpstreamReply = response
            .json()
            .await
            .map_err(|e| ProxyError::failed(action.failure_message, e))?;

        let reply = ProcessReply::reshape(action, upstream).ok_or_else(|| {
            ProxyError::failed(action.failure_message, "upstream reply has no fileName")
        })?;

        tracing::info!(
            route = action.name,
            download_url = %reply.download_url,
            "Upload processed"
        );
        Ok(reply)
    }

    /// Fetch a processed file. The returned response has a success status.
    pub async fn download(
        &self,
        resource: Resource,
        file_name: &str,
    ) -> Result<reqwest::Response, ProxyError> {
        let url = self.endpoint(resource, &["download", file_name]);
        let route = download_label(resource);

        let start = Instant::now();
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_upstream(route, None, start);
                return Err(ProxyError::failed(DOWNLOAD_FAILURE, e));
            }
        };
        let status = response.status();
        metrics::record_upstream(route, Some(status.as_u16()), start);

        if !status.is_success() {
            tracing::warn!(resource = resource.as_str(), file = %file_name, status = %status, "Download refused upstream");
            return Err(ProxyError::Upstream {
                status,
                message: DOWNLOAD_NOT_FOUND.to_string(),
            });
        }

        Ok(response)
    }

    /// Delete a processed file, passing the upstream JSON through.
    pub async fn delete(
        &self,
        resource: Resource,
        file_name: &str,
    ) -> Result<serde_json::Value, ProxyError> {
        let url = self.endpoint(resource, &["delete", file_name]);
        let route = delete_label(resource);

        let start = Instant::now();
        let response = match self.client.delete(url).send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_upstream(route, None, start);
                return Err(ProxyError::failed(DELETE_FAILURE, e));
            }
        };
        let status = response.status();
        metrics::record_upstream(route, Some(status.as_u16()), start);

        if !status.is_success() {
            return Err(relay_error(response, DELETE_FALLBACK).await);
        }

        let body = response
            .json()
            .await
            .map_err(|e| ProxyError::failed(DELETE_FAILURE, e))?;

        tracing::info!(resource = resource.as_str(), file = %file_name, "Processed file deleted");
        Ok(body)
    }
}

/// Turn a non-success upstream response into a relayed error.
async fn relay_error(response: reqwest::Response, fallback: &str) -> ProxyError {
    let status = response.status();
    let message = match response.bytes().await {
        Ok(body) => UpstreamErrorBody::message_from(&body),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read upstream error body");
            None
        }
    };

    tracing::warn!(status = %status, message = ?message, "Upstream rejected request");
    ProxyError::Upstream {
        status,
        message: message.unwrap_or_else(|| fallback.to_string()),
    }
}

fn download_label(resource: Resource) -> &'static str {
    match resource {
        Resource::Pdf => "download_pdf",
        Resource::Image => "download_image",
        Resource::Video => "download_video",
        Resource::Document => "download_document",
        Resource::Watermark => "download_watermark",
    }
}

fn delete_label(resource: Resource) -> &'static str {
    match resource {
        Resource::Pdf => "delete_pdf",
        Resource::Image => "delete_image",
        Resource::Video => "delete_video",
        Resource::Document => "delete_document",
        Resource::Watermark => "delete_watermark",
    }
}
