//! Upstream reply parsing and reshaping into the proxy's namespace.

use serde::{Deserialize, Serialize};

use crate::routing::{Action, ReplyShape};

/// Success body returned by the processing backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamReply {
    pub success: bool,
    pub file_name: Option<String>,
    pub original_size: Option<u64>,
    pub compressed_size: Option<u64>,
    pub source_format: Option<String>,
    pub target_format: Option<String>,
    pub file_type: Option<String>,
    pub message: Option<String>,
}

/// Error body returned by the processing backend.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpstreamErrorBody {
    pub message: Option<String>,
}

impl UpstreamErrorBody {
    /// The upstream message if `body` is JSON carrying a non-empty one.
    pub fn message_from(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<UpstreamErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
    }
}

/// Reply the proxy sends to the browser after a processing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessReply {
    pub success: bool,
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressed_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProcessReply {
    /// Reshape an upstream reply for `action`.
    ///
    /// Returns `None` when the upstream did not name the produced file.
    pub fn reshape(action: &Action, upstream: UpstreamReply) -> Option<Self> {
        let file_name = upstream.file_name.filter(|n| !n.is_empty())?;
        let mut reply = ProcessReply {
            success: upstream.success,
            download_url: action.resource.download_url(&file_name),
            original_size: None,
            compressed_size: None,
            source_format: None,
            target_format: None,
            file_type: None,
            message: None,
        };

        match action.shape {
            ReplyShape::Compression => {
                reply.original_size = upstream.original_size;
                reply.compressed_size = upstream.compressed_size;
            }
            ReplyShape::Conversion => {
                reply.source_format = upstream.source_format;
                reply.target_format = upstream.target_format;
                reply.message = upstream.message;
            }
            ReplyShape::Watermark => {
                reply.file_type = upstream.file_type;
                reply.message = upstream.message;
            }
        }

        Some(reply)
    }
}
