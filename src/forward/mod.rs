//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! handler (multipart or ?file=)
//!     → form.rs (buffer and re-package multipart parts)
//!     → client.rs (one upstream call, status check)
//!     → reply.rs (rename fields, rewrite fileName into a proxy download URL)
//!     → error.rs (relay upstream message or collapse to generic 500)
//! ```
//!
//! # Design Decisions
//! - Single base URL, injected from config, shared by all handlers
//! - No retries, no circuit breaking, no partial results
//! - Handlers hold no mutable state

pub mod client;
pub mod error;
pub mod form;
pub mod reply;

pub use client::Forwarder;
pub use error::{ProxyError, SetupError};
pub use form::{FormField, UploadForm};
pub use reply::{ProcessReply, UpstreamReply};
