//! Client error types.
//!
//! Every failure the client reports, local or remote, is a [`SlurmError`].
//! Errors are grouped by where they originate:
//!
//! | Category | Variants | Recovery |
//! |----------|----------|----------|
//! | **Local** | `ContextRequired`, `ClientNotInitialized`, `Validation` | Fix caller input or setup |
//! | **Capability** | `UnsupportedOperation`, `UnsupportedVersion` | Choose another wire version |
//! | **Remote** | `NotFound`, `Conflict`, `Unauthorized`, `Server` | Depends on status |
//! | **Transport** | `Transport`, `InvalidResponse` | Retry or report |
//!
//! Local errors never reach the wire and are never retried.

use thiserror::Error;

use crate::version::ApiVersion;

/// Normalized error kinds, independent of the message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ContextRequired,
    ClientNotInitialized,
    ValidationError,
    UnsupportedOperation,
    NotFound,
    Conflict,
    Unauthorized,
    ServerError,
    UnsupportedVersion,
    Transport,
}

/// Errors that can occur in client operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SlurmError {
    // ── Local errors ─────────────────────────────────────────────────
    /// The caller's context is cancelled or past its deadline.
    #[error("context is required: {0}")]
    ContextRequired(String),

    /// The adapter was built without a wire client.
    #[error("client not initialized: {0}")]
    ClientNotInitialized(String),

    /// Malformed or missing required input.
    #[error("validation error: {0}")]
    Validation(String),

    // ── Capability errors ────────────────────────────────────────────
    /// The operation does not exist in the selected wire version.
    #[error("{operation} is not supported in {version}")]
    UnsupportedOperation {
        operation: String,
        version: ApiVersion,
    },

    /// The requested wire version is unknown.
    #[error("unsupported API version: {0}")]
    UnsupportedVersion(String),

    // ── Remote errors (status embedded in the message) ───────────────
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("server error: {0}")]
    Server(String),

    // ── Transport errors ─────────────────────────────────────────────
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl SlurmError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for an unsupported operation in `version`.
    pub fn unsupported(operation: impl Into<String>, version: ApiVersion) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            version,
        }
    }

    /// The taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ContextRequired(_) => ErrorKind::ContextRequired,
            Self::ClientNotInitialized(_) => ErrorKind::ClientNotInitialized,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::UnsupportedVersion(_) => ErrorKind::UnsupportedVersion,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Server(_) | Self::InvalidResponse(_) => ErrorKind::ServerError,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }

    /// HTTP status embedded in a remote error message, if any.
    pub fn status(&self) -> Option<u16> {
        let message = match self {
            Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Unauthorized(m)
            | Self::Server(m)
            | Self::Validation(m) => m,
            _ => return None,
        };
        message
            .strip_prefix("HTTP ")?
            .get(..3)
            .and_then(|code| code.parse().ok())
    }

    /// Returns `true` if the operation may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Server(_) | Self::Transport(_))
    }
}

impl From<reqwest::Error> for SlurmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SlurmError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

/// Result type for client operations.
pub type SlurmResult<T> = Result<T, SlurmError>;
