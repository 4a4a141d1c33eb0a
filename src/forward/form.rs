//! Re-packaging an incoming multipart upload for the upstream call.

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use reqwest::multipart::{Form, Part};

/// One part of an incoming multipart body.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A fully buffered multipart upload, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    fields: Vec<FormField>,
}

impl UploadForm {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields }
    }

    /// Drain every part of `multipart`.
    pub async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut fields = Vec::new();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(String::from);
            let content_type = field.content_type().map(String::from);
            let data = field.bytes().await?;
            fields.push(FormField {
                name,
                file_name,
                content_type,
                data,
            });
        }
        Ok(Self { fields })
    }

    /// First text value named `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name && f.file_name.is_none())
            .and_then(|f| std::str::from_utf8(&f.data).ok())
    }

    /// Total payload bytes across all parts.
    pub fn payload_len(&self) -> usize {
        self.fields.iter().map(|f| f.data.len()).sum()
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Build the outgoing form, keeping names, file names, content types
    /// and bytes of every part.
    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for field in self.fields {
            let len = field.data.len() as u64;
            let mut part = Part::stream_with_length(field.data, len);
            if let Some(file_name) = field.file_name {
                part = part.file_name(file_name);
            }
            if let Some(content_type) = field.content_type {
                part = part.mime_str(&content_type)?;
            }
            form = form.part(field.name, part);
        }
        Ok(form)
    }
}
