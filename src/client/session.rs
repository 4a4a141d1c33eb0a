//! Client workflow state machine.
//!
//! # States
//! ```text
//! Idle ──select_file──▶ FileSelected ──process──▶ Processing ──▶ ResultReady
//!  ▲                          ▲                        │              │
//!  │                          └──────── Failed ◀───────┘              │
//!  └───────────── clear / switch_tab / download ◀─────────────────────┘
//! ```
//!
//! # Invariants
//! - At most one processed-file reference is held at a time
//! - A reference is always cleaned up (best effort) before it is dropped
//! - Only one operation is in flight; `process` takes `&mut self`
//! - A cancelled `process` or `download` leaves the session usable: the
//!   state rolls back and the reference is kept until its delete completes

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use url::Url;

use crate::client::error::ClientError;
use crate::client::format::format_file_size;
use crate::client::operation::{
    ConversionDirection, Operation, OperationKind, ParamSet, Selection, Tab, WatermarkKind,
};
use crate::client::params::Parameters;
use crate::client::progress::{ProgressConfig, ProgressTicker};
use crate::client::transport::{SubmitRequest, Transport};
use crate::client::upload::{validate_file, LocalFile, Upload, MAX_FILE_SIZE};
use crate::forward::ProcessReply;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    FileSelected,
    Processing,
    ResultReady,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Error,
        }
    }
}

/// Reference to a file the backend produced and still stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    pub file_name: String,
    pub download_url: String,
    /// Operation that produced the file; decides the cleanup route.
    pub operation: Operation,
}

impl ProcessedFile {
    /// Build a reference from a reply, reading the name from `?file=`.
    pub fn from_reply(operation: Operation, reply: &ProcessReply) -> Option<Self> {
        let base = Url::parse("http://proxy.invalid/").ok()?;
        let url = base.join(&reply.download_url).ok()?;
        let file_name = url
            .query_pairs()
            .find(|(key, _)| key == "file")
            .map(|(_, value)| value.into_owned())
            .filter(|name| !name.is_empty())?;

        Some(Self {
            file_name,
            download_url: reply.download_url.clone(),
            operation,
        })
    }

    pub fn cleanup_url(&self) -> String {
        self.operation.descriptor().resource.delete_url(&self.file_name)
    }
}

/// Tunables of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub max_file_size: u64,
    pub progress: ProgressConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            progress: ProgressConfig::default(),
        }
    }
}

/// One user's upload/process/download workflow.
pub struct Session<T> {
    transport: Arc<T>,
    config: SessionConfig,
    selection: Selection,
    params: Parameters,
    state: SessionState,
    file: Option<Upload>,
    operation: Option<Operation>,
    processed: Option<ProcessedFile>,
    original_size: Option<u64>,
    compressed_size: Option<u64>,
    last_error: Option<String>,
    progress: Arc<watch::Sender<u8>>,
    notifications: mpsc::UnboundedSender<Notification>,
}

impl<T: Transport> Session<T> {
    /// Create a session on the PDF tab.
    ///
    /// Returns the session and a receiver for its notifications.
    pub fn new(transport: Arc<T>, config: SessionConfig) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (notifications, rx) = mpsc::unbounded_channel();
        let (progress, _) = watch::channel(0);

        let session = Self {
            transport,
            config,
            selection: Selection::default(),
            params: Parameters::default(),
            state: SessionState::Idle,
            file: None,
            operation: None,
            processed: None,
            original_size: None,
            compressed_size: None,
            last_error: None,
            progress: Arc::new(progress),
            notifications,
        };
        (session, rx)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn file(&self) -> Option<&Upload> {
        self.file.as_ref()
    }

    /// Operation the selected file resolved to.
    pub fn operation(&self) -> Option<Operation> {
        self.operation
    }

    pub fn processed(&self) -> Option<&ProcessedFile> {
        self.processed.as_ref()
    }

    pub fn original_size(&self) -> Option<u64> {
        self.original_size
    }

    pub fn compressed_size(&self) -> Option<u64> {
        self.compressed_size
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    /// Watch the simulated progress (0..=100).
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    fn notify(&self, notification: Notification) {
        // receiver gone means nobody is listening
        let _ = self.notifications.send(notification);
    }

    /// Switch tabs, cleaning up whatever the old tab produced.
    pub async fn switch_tab(&mut self, tab: Tab) {
        self.clear().await;
        self.selection = Selection::for_tab(tab);
        tracing::debug!(tab = ?tab, "Tab switched");
    }

    /// Changing the direction drops the selected file and any pending result.
    pub async fn set_conversion_direction(&mut self, direction: ConversionDirection) {
        if self.selection.direction != direction {
            self.clear().await;
            self.selection.direction = direction;
        }
    }

    /// Changing the kind drops the selected file and any pending result.
    pub async fn set_watermark_kind(&mut self, kind: WatermarkKind) {
        if self.selection.watermark != kind {
            self.clear().await;
            self.selection.watermark = kind;
        }
    }

    /// Pick a file. A rejected file emits one notification and changes nothing.
    pub async fn select_file(&mut self, upload: Upload) -> Result<Operation, ClientError> {
        let operation = self.check(&upload.file_name, &upload.media_type, upload.size())?;

        self.discard_processed().await;
        self.original_size = Some(upload.size());
        self.compressed_size = None;
        self.last_error = None;
        self.file = Some(upload);
        self.operation = Some(operation);
        self.progress.send_replace(0);
        self.state = SessionState::FileSelected;
        Ok(operation)
    }

    /// Pick a file on disk. Type and size are checked from metadata before
    /// any byte is read.
    pub async fn select_path(&mut self, path: &Path) -> Result<Operation, ClientError> {
        let local = LocalFile::stat(path).await?;
        self.check(&local.file_name, &local.media_type, local.size)?;
        let upload = local.read().await?;
        self.select_file(upload).await
    }

    fn check(&self, file_name: &str, media_type: &str, size: u64) -> Result<Operation, ClientError> {
        validate_file(&self.selection, media_type, size, self.config.max_file_size).map_err(|err| {
            if let ClientError::Validation { title, description } = &err {
                self.notify(Notification::error(*title, description.clone()));
            }
            tracing::debug!(file = %file_name, media_type = %media_type, size, "File rejected");
            err
        })
    }

    /// Run the operation on the selected file.
    pub async fn process(&mut self) -> Result<(), ClientError> {
        let (upload, operation) = match (&self.file, self.operation) {
            (Some(upload), Some(operation)) => (upload.clone(), operation),
            _ => return Err(ClientError::InvalidState("no file selected")),
        };

        self.discard_processed().await;
        self.compressed_size = None;
        self.last_error = None;

        let descriptor = operation.descriptor();
        let request = SubmitRequest {
            endpoint: descriptor.endpoint,
            upload,
            fields: self.params.fields(descriptor.params),
        };

        tracing::info!(operation = %operation, endpoint = descriptor.endpoint, "Submitting upload");
        let ticker = ProgressTicker::start(self.progress.clone(), self.config.progress);
        let in_flight = InFlight::enter(&mut self.state, ticker);
        let result = self.transport.submit(request).await;
        let ticker = in_flight.complete();
        let result = result.and_then(|reply| {
            ProcessedFile::from_reply(operation, &reply)
                .map(|processed| (reply, processed))
                .ok_or_else(|| ClientError::Transport("reply has no file reference".to_string()))
        });

        match result {
            Ok((reply, processed)) => {
                if let Some(ticker) = ticker {
                    ticker.finish();
                }
                self.complete(operation, &reply);
                self.processed = Some(processed);
                self.state = SessionState::ResultReady;
                Ok(())
            }
            Err(err) => {
                if let Some(ticker) = ticker {
                    ticker.discard();
                }
                let message = err.user_message();
                self.notify(Notification::error(failure_title(descriptor.kind), message.clone()));
                tracing::warn!(operation = %operation, error = %err, "Operation failed");
                self.last_error = Some(message);
                self.state = SessionState::Failed;
                Err(err)
            }
        }
    }

    fn complete(&mut self, operation: Operation, reply: &ProcessReply) {
        let notification = match operation.descriptor().kind {
            OperationKind::Compression => {
                if reply.original_size.is_some() {
                    self.original_size = reply.original_size;
                }
                self.compressed_size = reply.compressed_size;
                let description = match (self.original_size, self.compressed_size) {
                    (Some(original), Some(compressed)) => format!(
                        "Reduced from {} to {}",
                        format_file_size(original),
                        format_file_size(compressed)
                    ),
                    _ => "File compressed".to_string(),
                };
                Notification::info("Compression complete", description)
            }
            OperationKind::Conversion => Notification::info(
                "Conversion complete",
                format!(
                    "Successfully converted from {} to {}",
                    reply.source_format.as_deref().unwrap_or("source"),
                    reply.target_format.as_deref().unwrap_or("target")
                ),
            ),
            OperationKind::WatermarkRemoval => {
                let target = match operation.descriptor().params {
                    ParamSet::Watermark(WatermarkKind::Pdf) => "PDF",
                    _ => "image",
                };
                Notification::info(
                    "Watermark removal complete",
                    format!("Successfully removed watermark from {}", target),
                )
            }
        };
        self.notify(notification);
    }

    /// Download the result, then clean it up server-side.
    ///
    /// The cleanup delete runs as soon as the download has been handed off;
    /// its failure is logged and never surfaced. A failed or cancelled
    /// download keeps the result so it can be retried.
    pub async fn download(&mut self) -> Result<(), ClientError> {
        let processed = match (&self.processed, self.state) {
            (Some(processed), SessionState::ResultReady) => processed.clone(),
            _ => return Err(ClientError::InvalidState("no result to download")),
        };

        if let Err(err) = self
            .transport
            .open(&processed.download_url, &processed.file_name)
            .await
        {
            tracing::warn!(file = %processed.file_name, error = %err, "Download failed");
            return Err(err);
        }

        self.discard_processed().await;
        self.reset();
        Ok(())
    }

    /// Drop back to idle from any state, cleaning up any pending result first.
    pub async fn clear(&mut self) {
        self.discard_processed().await;
        self.reset();
    }

    /// Delete the held reference. It is only forgotten once the delete has
    /// been attempted.
    async fn discard_processed(&mut self) {
        if let Some(processed) = self.processed.clone() {
            self.cleanup(&processed).await;
            self.processed = None;
        }
    }

    /// Best-effort delete of a processed file.
    async fn cleanup(&self, processed: &ProcessedFile) {
        let url = processed.cleanup_url();
        match self.transport.delete(&url).await {
            Ok(()) => tracing::info!(file = %processed.file_name, "Processed file deleted"),
            Err(err) => {
                tracing::error!(file = %processed.file_name, url = %url, error = %err, "Failed to delete processed file")
            }
        }
    }

    fn reset(&mut self) {
        self.file = None;
        self.operation = None;
        self.processed = None;
        self.original_size = None;
        self.compressed_size = None;
        self.last_error = None;
        self.progress.send_replace(0);
        self.state = SessionState::Idle;
    }
}

/// Marks the session `Processing` while an upload is in flight and rolls it
/// back to `FileSelected` if the owning future is dropped first.
struct InFlight<'a> {
    state: &'a mut SessionState,
    ticker: Option<ProgressTicker>,
}

impl<'a> InFlight<'a> {
    fn enter(state: &'a mut SessionState, ticker: ProgressTicker) -> Self {
        *state = SessionState::Processing;
        Self {
            state,
            ticker: Some(ticker),
        }
    }

    /// The reply arrived; hand the ticker back to settle progress.
    fn complete(mut self) -> Option<ProgressTicker> {
        self.ticker.take()
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            tracing::warn!("Operation cancelled before the reply arrived");
            ticker.discard();
            *self.state = SessionState::FileSelected;
        }
    }
}

fn failure_title(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Compression => "Compression failed",
        OperationKind::Conversion => "Conversion failed",
        OperationKind::WatermarkRemoval => "Watermark removal failed",
    }
}
