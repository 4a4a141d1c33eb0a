//! Upload descriptors and local file validation.

use std::path::{Path, PathBuf};

use axum::body::Bytes;

use crate::client::error::ClientError;
use crate::client::format::format_file_size;
use crate::client::operation::{Operation, Selection};

/// Largest file accepted for upload (1 GiB).
pub const MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    /// Declared media type, e.g. `application/pdf`.
    pub media_type: String,
    pub data: Bytes,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// A file on disk, described from its metadata only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    pub file_name: String,
    /// Media type the extension implies.
    pub media_type: String,
    pub size: u64,
}

impl LocalFile {
    /// Describe `path` without reading its contents.
    pub async fn stat(path: &Path) -> std::io::Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            media_type,
            size: metadata.len(),
        })
    }

    /// Load the contents into an upload.
    pub async fn read(self) -> std::io::Result<Upload> {
        let data = tokio::fs::read(&self.path).await?;
        Ok(Upload::new(self.file_name, self.media_type, data))
    }
}

/// Check a file's declared type and size against the active selection.
///
/// Type is checked before size. Returns the operation the file resolves to.
pub fn validate_file(
    selection: &Selection,
    media_type: &str,
    size: u64,
    max_size: u64,
) -> Result<Operation, ClientError> {
    let operation = selection
        .resolve(media_type)
        .ok_or_else(|| ClientError::Validation {
            title: "Invalid file type",
            description: selection.type_hint().to_string(),
        })?;

    if size > max_size {
        return Err(ClientError::Validation {
            title: "File too large",
            description: format!("The maximum file size is {}", format_file_size(max_size)),
        });
    }

    Ok(operation)
}
