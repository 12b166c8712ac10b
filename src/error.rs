//! Error types for stdio-exchange.

use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Main error type for all exchange operations.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Read or write attempted before the session token was set.
    #[error("exchange channel has not been initialized")]
    Uninitialized,

    /// Value could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Input after the token line is not a valid JSON document.
    #[error("malformed input: {0}")]
    MalformedInput(#[source] serde_json::Error),

    /// The one-shot read or write was already used (strict repeat policy).
    #[error("{0} already consumed")]
    AlreadyConsumed(&'static str),

    /// I/O error on the underlying streams.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Child output did not start with the session token.
    #[error("child output is not prefixed by the session token")]
    MissingToken,

    /// Child process exited unsuccessfully.
    #[error("child exited with {status}: {stderr}")]
    ChildFailed {
        /// Exit status reported by the OS.
        status: ExitStatus,
        /// Everything the child wrote to stderr.
        stderr: String,
    },

    /// Child did not finish within the configured timeout.
    #[error("child timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type alias using ExchangeError.
pub type Result<T> = std::result::Result<T, ExchangeError>;
