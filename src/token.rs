//! Session token handling.
//!
//! The host writes the token as the first line of the child's stdin. The child
//! echoes it verbatim, including the line terminator, in front of its JSON
//! output. A host uses the prefix to know where the payload starts.

use std::fmt;
use std::io::BufRead;

use uuid::Uuid;

use crate::error::{ExchangeError, Result};

/// Session token established by the first input line.
///
/// An empty token means the channel is not initialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token string. Kept as-is, terminator included.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Generate a fresh token line for a host to send.
    ///
    /// Format: `exchange-{uuid}\n`
    pub fn generate() -> Self {
        Self(format!("exchange-{}\n", Uuid::new_v4().simple()))
    }

    /// Read one line (terminator included) from `reader`.
    ///
    /// Returns an empty token on EOF.
    pub fn read_line<R: BufRead>(reader: &mut R) -> Result<Self> {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        Ok(Self(line))
    }

    /// Raw token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw token bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// True if no token has been read.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Strip this token from the start of a child's output.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::MissingToken`] if `output` does not begin
    /// with the token.
    pub fn strip_from<'a>(&self, output: &'a [u8]) -> Result<&'a [u8]> {
        output
            .strip_prefix(self.as_bytes())
            .ok_or(ExchangeError::MissingToken)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.trim_end())
    }
}
