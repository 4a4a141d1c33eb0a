//! Route table for the forwarding handlers.
//!
//! # Data Flow
//! ```text
//! Incoming request (/api/...)
//!     → http/handlers.rs picks the Action / Resource for the route
//!     → resource.rs gives upstream prefix, download route, content type
//!     → action.rs gives upstream path, reply shape, error messages
//!     → forward layer builds the upstream URL and reshapes the reply
//! ```
//!
//! # Design Decisions
//! - Routes are static; no runtime route configuration
//! - Every proxy URL handed to the browser is derived from `Resource`

pub mod action;
pub mod resource;

pub use action::{Action, ReplyShape};
pub use resource::{ContentTypePolicy, Resource};
