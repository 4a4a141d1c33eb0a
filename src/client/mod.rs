//! Client workflow over the proxy.
//!
//! # Data Flow
//! ```text
//! Tab / sub-option (operation.rs)
//!     → select_file / select_path: type + size check (upload.rs)
//!     → process: multipart POST with parameters (params.rs, transport.rs)
//!         progress ticks while in flight (progress.rs)
//!     → download: open URL, then one cleanup DELETE (session.rs)
//! ```
//!
//! # Design Decisions
//! - Every per-operation choice comes from one descriptor table
//! - The session owns at most one processed-file reference and deletes it
//!   before letting go of it
//! - Notifications are pushed on a channel; the caller renders them

pub mod error;
pub mod format;
pub mod operation;
pub mod params;
pub mod progress;
pub mod session;
pub mod transport;
pub mod upload;

pub use error::ClientError;
pub use format::{format_file_size, reduction_percent};
pub use operation::{ConversionDirection, Operation, OperationKind, Selection, Tab, WatermarkKind};
pub use params::Parameters;
pub use progress::ProgressConfig;
pub use session::{Notification, ProcessedFile, Session, SessionConfig, SessionState, Severity};
pub use transport::{HttpTransport, SubmitRequest, Transport};
pub use upload::{validate_file, LocalFile, Upload, MAX_FILE_SIZE};
