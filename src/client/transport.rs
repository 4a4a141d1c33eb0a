//! Transport between a client session and the proxy.
//!
//! # Responsibilities
//! - Submit an upload with its form fields to an operation endpoint
//! - "Navigate" to a download URL (the HTTP transport saves the file)
//! - Issue cleanup deletes
//!
//! # Design Decisions
//! - A trait so sessions can run against the real proxy or an in-memory fake
//! - Error bodies `{ error }` become `ClientError::Rejected` with the status

use std::future::Future;
use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use url::{Host, Url};

use crate::client::error::ClientError;
use crate::client::upload::Upload;
use crate::forward::ProcessReply;

/// One upload for an operation endpoint.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// Proxy-relative endpoint, e.g. `/api/compress`.
    pub endpoint: &'static str,
    pub upload: Upload,
    pub fields: Vec<(&'static str, String)>,
}

/// How a session reaches the proxy.
pub trait Transport: Send + Sync {
    /// POST the upload and parse the success reply.
    fn submit(
        &self,
        request: SubmitRequest,
    ) -> impl Future<Output = Result<ProcessReply, ClientError>> + Send;

    /// Open a relative download URL.
    fn open(
        &self,
        download_url: &str,
        file_name: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// DELETE a relative cleanup URL.
    fn delete(&self, cleanup_url: &str) -> impl Future<Output = Result<(), ClientError>> + Send;
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorReply {
    error: Option<String>,
}

/// Transport speaking HTTP to a running proxy.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
    output_dir: PathBuf,
}

impl HttpTransport {
    /// `base` is the proxy origin; downloads are written to `output_dir`.
    ///
    /// A loopback origin is reached directly, ignoring proxy environment
    /// variables.
    pub fn new(base: &str, output_dir: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let base = Url::parse(base).map_err(|e| ClientError::Transport(e.to_string()))?;
        let mut builder = reqwest::Client::builder();
        if is_loopback(&base) {
            builder = builder.no_proxy();
        }
        Ok(Self {
            client: builder.build()?,
            base,
            output_dir: output_dir.into(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn url(&self, relative: &str) -> Result<Url, ClientError> {
        self.base
            .join(relative)
            .map_err(|e| ClientError::Transport(e.to_string()))
    }

    /// Where a downloaded `file_name` is written. Only the final path
    /// component of the name is used.
    pub fn destination(&self, file_name: &str) -> PathBuf {
        let name = Path::new(file_name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "download".into());
        self.output_dir.join(name)
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(addr)) => addr.is_loopback(),
        Some(Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}

async fn rejection(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorReply>()
        .await
        .ok()
        .and_then(|r| r.error)
        .unwrap_or_else(|| "Operation failed".to_string());
    ClientError::Rejected { status, message }
}

impl Transport for HttpTransport {
    async fn submit(&self, request: SubmitRequest) -> Result<ProcessReply, ClientError> {
        let url = self.url(request.endpoint)?;

        let upload = request.upload;
        let len = upload.size();
        let part = Part::stream_with_length(upload.data, len)
            .file_name(upload.file_name)
            .mime_str(&upload.media_type)?;
        let mut form = Form::new().part("file", part);
        for (name, value) in request.fields {
            form = form.text(name, value);
        }

        let response = self.client.post(url).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(response.json().await?)
    }

    async fn open(&self, download_url: &str, file_name: &str) -> Result<(), ClientError> {
        let url = self.url(download_url)?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let path = self.destination(file_name);
        match save(response, &path).await {
            Ok(bytes) => {
                tracing::info!(path = %path.display(), bytes, "Download saved");
                Ok(())
            }
            Err(err) => {
                // no partial file left behind
                let _ = tokio::fs::remove_file(&path).await;
                Err(err)
            }
        }
    }

    async fn delete(&self, cleanup_url: &str) -> Result<(), ClientError> {
        let url = self.url(cleanup_url)?;
        let response = self.client.delete(url).send().await?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(())
    }
}

/// Stream a response body into `path`, returning the bytes written.
async fn save(mut response: reqwest::Response, path: &Path) -> Result<u64, ClientError> {
    let write_error = |e: std::io::Error| ClientError::Transport(format!("writing {}: {}", path.display(), e));

    let mut file = tokio::fs::File::create(path).await.map_err(write_error)?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await.map_err(write_error)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(write_error)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_urls_join_base() {
        let transport = HttpTransport::new("http://localhost:3000", "/tmp").unwrap();
        assert_eq!(
            transport.url("/api/download?file=x.pdf").unwrap().as_str(),
            "http://localhost:3000/api/download?file=x.pdf"
        );
    }

    #[test]
    fn test_loopback_origins() {
        for origin in ["http://localhost:3000", "http://127.0.0.1:3000", "http://[::1]:3000"] {
            assert!(is_loopback(&Url::parse(origin).unwrap()), "{}", origin);
        }
        for origin in ["https://filepress.example.com", "http://10.0.0.4:3000"] {
            assert!(!is_loopback(&Url::parse(origin).unwrap()), "{}", origin);
        }
    }

    #[test]
    fn test_destination_strips_directories() {
        let transport = HttpTransport::new("http://localhost:3000", "/tmp/out").unwrap();
        assert_eq!(
            transport.destination("../../etc/passwd"),
            PathBuf::from("/tmp/out/passwd")
        );
        assert_eq!(transport.destination("x.pdf"), PathBuf::from("/tmp/out/x.pdf"));
    }
}
