//! Upstream resources and their URL namespaces.
//!
//! # Responsibilities
//! - Map each resource to its upstream path prefix
//! - Map each resource to the proxy route that serves its downloads
//! - Decide the content type of a downloaded file
//!
//! # Design Decisions
//! - One enum instead of per-handler constants; every handler derives its
//!   URLs from the resource it serves

use url::form_urlencoded;

/// A family of processed files sharing one upstream namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Compressed PDFs.
    Pdf,
    /// Compressed images.
    Image,
    /// Compressed videos.
    Video,
    /// Converted documents (PDF ↔ Word).
    Document,
    /// Images or PDFs with a watermark removed.
    Watermark,
}

/// How the `Content-Type` of a download response is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTypePolicy {
    /// Always this type.
    Fixed(&'static str),
    /// Guessed from the file name's extension.
    ByExtension,
    /// Whatever the upstream sent.
    Passthrough,
}

pub const OCTET_STREAM: &str = "application/octet-stream";

impl Resource {
    /// Path segments appended to the upstream base URL.
    pub fn upstream_prefix(self) -> &'static [&'static str] {
        match self {
            Resource::Pdf => &[],
            Resource::Image => &["image"],
            Resource::Video => &["video"],
            Resource::Document => &["convert"],
            Resource::Watermark => &["watermark"],
        }
    }

    /// Proxy route serving `GET ?file=` downloads for this resource.
    pub fn download_route(self) -> &'static str {
        match self {
            Resource::Pdf => "/api/download",
            Resource::Image => "/api/image/download",
            Resource::Video => "/api/video",
            Resource::Document => "/api/convert/download",
            Resource::Watermark => "/api/watermark",
        }
    }

    /// Proxy route accepting `DELETE ?file=` for this resource.
    pub fn delete_route(self) -> &'static str {
        match self {
            Resource::Image => "/api/image/delete",
            other => other.download_route(),
        }
    }

    pub fn content_type_policy(self) -> ContentTypePolicy {
        match self {
            Resource::Pdf => ContentTypePolicy::Fixed("application/pdf"),
            Resource::Document => ContentTypePolicy::ByExtension,
            Resource::Image | Resource::Video | Resource::Watermark => {
                ContentTypePolicy::Passthrough
            }
        }
    }

    /// Relative download URL handed to the browser for `file_name`.
    pub fn download_url(self, file_name: &str) -> String {
        file_url(self.download_route(), file_name)
    }

    /// Relative cleanup URL for `file_name`.
    pub fn delete_url(self, file_name: &str) -> String {
        file_url(self.delete_route(), file_name)
    }

    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Pdf => "pdf",
            Resource::Image => "image",
            Resource::Video => "video",
            Resource::Document => "convert",
            Resource::Watermark => "watermark",
        }
    }
}

impl ContentTypePolicy {
    /// Resolve the content type for `file_name` given the upstream header.
    pub fn resolve(self, file_name: &str, upstream: Option<&str>) -> String {
        match self {
            ContentTypePolicy::Fixed(value) => value.to_string(),
            ContentTypePolicy::ByExtension => mime_guess::from_path(file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
            ContentTypePolicy::Passthrough => upstream
                .filter(|v| !v.is_empty())
                .unwrap_or(OCTET_STREAM)
                .to_string(),
        }
    }
}

fn file_url(route: &str, file_name: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(file_name.as_bytes()).collect();
    format!("{}?file={}", route, encoded)
}
