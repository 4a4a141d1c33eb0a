//! Processing actions the proxy forwards.
//!
//! An action names the upstream endpoint, the reply shape to produce, and
//! the messages used when the upstream or the transport fails.

use crate::routing::resource::Resource;

/// Which optional fields a processing reply carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    /// `originalSize` and `compressedSize`.
    Compression,
    /// `sourceFormat`, `targetFormat` and `message`.
    Conversion,
    /// `fileType` and `message`.
    Watermark,
}

/// A forwarded processing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    /// Route label for logs and metrics.
    pub name: &'static str,
    pub resource: Resource,
    /// Path under the resource prefix, e.g. `["compress"]`.
    pub path: &'static [&'static str],
    pub shape: ReplyShape,
    /// Relayed when the upstream error carries no message.
    pub fallback_error: &'static str,
    /// Returned with 500 when the call cannot complete.
    pub failure_message: &'static str,
}

pub const COMPRESS_PDF: Action = Action {
    name: "compress_pdf",
    resource: Resource::Pdf,
    path: &["compress"],
    shape: ReplyShape::Compression,
    fallback_error: "Compression failed",
    failure_message: "Failed to process PDF",
};

pub const COMPRESS_IMAGE: Action = Action {
    name: "compress_image",
    resource: Resource::Image,
    path: &["compress"],
    shape: ReplyShape::Compression,
    fallback_error: "Compression failed",
    failure_message: "Failed to process image",
};

pub const COMPRESS_VIDEO: Action = Action {
    name: "compress_video",
    resource: Resource::Video,
    path: &["compress"],
    shape: ReplyShape::Compression,
    fallback_error: "Compression failed",
    failure_message: "Failed to process video",
};

pub const WORD_TO_PDF: Action = Action {
    name: "word_to_pdf",
    resource: Resource::Document,
    path: &["word-to-pdf"],
    shape: ReplyShape::Conversion,
    fallback_error: "Conversion failed",
    failure_message: "Failed to convert Word to PDF",
};

pub const PDF_TO_WORD: Action = Action {
    name: "pdf_to_word",
    resource: Resource::Document,
    path: &["pdf-to-word"],
    shape: ReplyShape::Conversion,
    fallback_error: "Conversion failed",
    failure_message: "Failed to convert PDF to Word",
};

/// Watermark removal; the `image` / `pdf` segment is appended per request.
pub const REMOVE_WATERMARK: Action = Action {
    name: "remove_watermark",
    resource: Resource::Watermark,
    path: &["remove"],
    shape: ReplyShape::Watermark,
    fallback_error: "Watermark removal failed",
    failure_message: "Failed to remove watermark",
};

/// Upstream errors on download collapse to this message.
pub const DOWNLOAD_NOT_FOUND: &str = "File not found";
pub const DOWNLOAD_FAILURE: &str = "Failed to download file";
pub const DELETE_FALLBACK: &str = "Deletion failed";
pub const DELETE_FAILURE: &str = "Failed to delete file";
