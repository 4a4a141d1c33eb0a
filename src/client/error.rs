//! Client-side error types.

use thiserror::Error;

/// Errors surfaced by a client session or its transport.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A picked file failed local validation; nothing was sent.
    #[error("{title}: {description}")]
    Validation {
        title: &'static str,
        description: String,
    },

    /// The proxy answered with a non-success status.
    #[error("proxy returned {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The request could not complete or the reply could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// A parameter value is off its allowed grid.
    #[error("{name} must be between {min} and {max} in steps of {step}, got {value}")]
    InvalidParameter {
        name: &'static str,
        value: u32,
        min: u32,
        max: u32,
        step: u32,
    },

    /// A local file could not be inspected or read.
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// The action is not available in the current state.
    #[error("not allowed now: {0}")]
    InvalidState(&'static str),
}

impl ClientError {
    /// Text shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation { description, .. } => description.clone(),
            ClientError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}
