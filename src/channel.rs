//! Exchange channel - one inbound and one outbound JSON payload.
//!
//! # Wire format (token-framed)
//!
//! ```text
//! stdin:  <token>\n<json document>
//! stdout: <token>\n<json document>
//! ```
//!
//! The token is echoed exactly as it was read. Nothing separates it from the
//! JSON document beyond the newline it already carries.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use serde_json::Value;
//! use stdio_exchange::Channel;
//!
//! let input = Cursor::new(b"t1\n[3, 1, 2]".to_vec());
//! let mut channel = Channel::new(input, Vec::new());
//!
//! channel.initialize().unwrap();
//! let mut data: Vec<i64> = channel.read_input().unwrap().unwrap();
//! data.sort();
//! channel.write_output(&data).unwrap();
//!
//! let (_, out) = channel.into_parts();
//! assert_eq!(out, b"t1\n[1,2,3]");
//! ```

use std::io::{BufRead, Stdin, StdinLock, Stdout, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::codec::JsonCodec;
use crate::config::{ExchangeConfig, RepeatPolicy};
use crate::error::{ExchangeError, Result};
use crate::token::SessionToken;

/// Channel over the process stdin/stdout.
pub type StdioChannel = Channel<StdinLock<'static>, Stdout>;

/// Single-exchange channel over a buffered reader and a writer.
///
/// Owns both streams for its lifetime; nothing else may read the input or
/// write the output while the channel exists.
pub struct Channel<R, W> {
    reader: R,
    writer: W,
    config: ExchangeConfig,
    token: SessionToken,
    input_consumed: bool,
    output_written: bool,
}

impl StdioChannel {
    /// Bind a token-framed channel to the process stdin/stdout.
    pub fn stdio() -> Self {
        Self::stdio_with_config(ExchangeConfig::default())
    }

    /// Bind a channel with the given configuration to stdin/stdout.
    pub fn stdio_with_config(config: ExchangeConfig) -> Self {
        let stdin: Stdin = std::io::stdin();
        Channel::with_config(stdin.lock(), std::io::stdout(), config)
    }
}

impl<R, W> Channel<R, W>
where
    R: BufRead,
    W: Write,
{
    /// Create a token-framed channel.
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, ExchangeConfig::default())
    }

    /// Create a channel with an explicit configuration.
    pub fn with_config(reader: R, writer: W, config: ExchangeConfig) -> Self {
        Self {
            reader,
            writer,
            config,
            token: SessionToken::default(),
            input_consumed: false,
            output_written: false,
        }
    }

    /// Read the session token from the first input line.
    ///
    /// Only reads while the token is still empty, so calling this again is a
    /// no-op. At EOF the token stays empty and later I/O fails with
    /// [`ExchangeError::Uninitialized`]. Does nothing when unframed.
    pub fn initialize(&mut self) -> Result<()> {
        if !self.config.is_framed() || !self.token.is_empty() {
            return Ok(());
        }

        self.token = SessionToken::read_line(&mut self.reader)?;
        if self.token.is_empty() {
            warn!("input closed before the session token line");
        } else {
            debug!(token = %self.token, "exchange initialized");
        }
        Ok(())
    }

    /// Read the single input payload.
    ///
    /// Token-framed: returns `Ok(None)` if the input was already read or the
    /// output already written (or fails with
    /// [`ExchangeError::AlreadyConsumed`] under [`RepeatPolicy::Reject`]).
    /// Unframed: parses one document from the remaining input on every call.
    ///
    /// # Errors
    ///
    /// - [`ExchangeError::Uninitialized`] if framed and no token was read
    /// - [`ExchangeError::MalformedInput`] if the input is not valid JSON
    pub fn read_input<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        if self.config.is_framed() {
            self.ensure_initialized()?;
            if self.input_consumed || self.output_written {
                return self.repeated("input").map(|()| None);
            }
            self.input_consumed = true;
        }

        let value = JsonCodec::decode_reader(&mut self.reader)?;
        trace!("input payload parsed");
        Ok(Some(value))
    }

    /// Write the single output payload.
    ///
    /// The value is encoded before anything is written, so a serialization
    /// failure leaves the output untouched and the write still available.
    /// Token-framed: the token is written first, then the document; a
    /// repeated call writes nothing.
    ///
    /// # Errors
    ///
    /// - [`ExchangeError::Uninitialized`] if framed and no token was read
    /// - [`ExchangeError::Serialization`] if `value` has no JSON form
    pub fn write_output<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        if self.config.is_framed() {
            self.ensure_initialized()?;
            if self.output_written {
                return self.repeated("output");
            }
        }

        let body = JsonCodec::encode(value)?;

        if self.config.is_framed() {
            self.output_written = true;
            self.writer.write_all(self.token.as_bytes())?;
        }
        self.writer.write_all(&body)?;
        self.writer.flush()?;

        trace!(len = body.len(), "output payload written");
        Ok(())
    }

    /// Run one full exchange: initialize, read, process, write.
    ///
    /// Returns `false` without calling `process` when no input was available
    /// (the one-shot read was already used).
    pub fn exchange<I, O, F>(&mut self, process: F) -> Result<bool>
    where
        I: DeserializeOwned,
        O: Serialize,
        F: FnOnce(I) -> O,
    {
        self.initialize()?;
        match self.read_input::<I>()? {
            Some(input) => {
                let output = process(input);
                self.write_output(&output)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Session token (empty until initialized).
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// True once a token has been read.
    pub fn is_initialized(&self) -> bool {
        !self.token.is_empty()
    }

    /// True once the one-shot read has been used.
    pub fn input_consumed(&self) -> bool {
        self.input_consumed
    }

    /// True once the one-shot write has been used.
    pub fn output_written(&self) -> bool {
        self.output_written
    }

    /// Active configuration.
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Consume the channel, returning the reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(ExchangeError::Uninitialized);
        }
        Ok(())
    }

    fn repeated(&self, what: &'static str) -> Result<()> {
        match self.config.repeat {
            RepeatPolicy::Ignore => {
                debug!("{} already consumed, ignoring repeated call", what);
                Ok(())
            }
            RepeatPolicy::Reject => Err(ExchangeError::AlreadyConsumed(what)),
        }
    }
}
