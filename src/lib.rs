//! # stdio-exchange
//!
//! Single-shot JSON exchange between a host process and a child over stdio.
//!
//! The child reads one JSON payload from stdin and writes one JSON payload to
//! stdout. In the token-framed mode the host first sends a session token line
//! which the child echoes in front of its output, and each direction may be
//! used only once.
//!
//! ## Architecture
//!
//! - **Child side** ([`Channel`]): blocking, owns its reader and writer
//! - **Host side** ([`host::Runner`]): async, spawns the child with tokio
//! - **Inline scripts** ([`script::Script`]): source run from a temporary file
//!
//! ## Example
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use stdio_exchange::Channel;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Weather {
//!     temp: f64,
//!     description: String,
//! }
//!
//! fn main() -> stdio_exchange::Result<()> {
//!     let mut channel = Channel::stdio();
//!     channel.exchange(|mut w: Weather| {
//!         w.temp += 12.8;
//!         w.description = "warm".to_string();
//!         w
//!     })?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod codec;
pub mod config;
pub mod error;
pub mod host;
pub mod script;
pub mod token;

pub use channel::{Channel, StdioChannel};
pub use config::{ExchangeConfig, Framing, RepeatPolicy};
pub use error::{ExchangeError, Result};
pub use token::SessionToken;
