//! Channel configuration.
//!
//! Selects between the two behaviours of the exchange contract:
//!
//! - **token-framed, single-use** ([`Framing::Token`]): the first input line
//!   is a session token that prefixes the output; one read, one write.
//! - **unframed, unrestricted** ([`Framing::Unframed`]): no token, every call
//!   performs its I/O.
//!
//! # Example
//!
//! ```
//! use stdio_exchange::config::{ExchangeConfig, Framing, RepeatPolicy};
//!
//! let config = ExchangeConfig::default().repeat(RepeatPolicy::Reject);
//! assert_eq!(config.framing, Framing::Token);
//!
//! let unframed = ExchangeConfig::unframed();
//! assert_eq!(unframed.framing, Framing::Unframed);
//! ```

/// How payloads are framed on the streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// First input line is the session token; output is prefixed by it.
    /// Read and write are each allowed once.
    #[default]
    Token,
    /// Bare JSON documents, no initialization, no call-count restriction.
    Unframed,
}

/// What a token-framed channel does when a one-shot operation is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatPolicy {
    /// Return without doing anything (`read_input` yields `None`).
    #[default]
    Ignore,
    /// Fail with [`ExchangeError::AlreadyConsumed`](crate::ExchangeError::AlreadyConsumed).
    Reject,
}

/// Configuration for an exchange channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExchangeConfig {
    /// Framing mode.
    pub framing: Framing,
    /// Behaviour on repeated read/write (token-framed only).
    pub repeat: RepeatPolicy,
}

impl ExchangeConfig {
    /// Token-framed, single-use configuration with the lenient repeat policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unframed, unrestricted configuration.
    pub fn unframed() -> Self {
        Self::default().framing(Framing::Unframed)
    }

    /// Set the framing mode.
    pub fn framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Set the repeat policy.
    pub fn repeat(mut self, repeat: RepeatPolicy) -> Self {
        self.repeat = repeat;
        self
    }

    /// Whether the token line and one-shot guards apply.
    pub fn is_framed(&self) -> bool {
        self.framing == Framing::Token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_token_framed_and_lenient() {
        let config = ExchangeConfig::default();
        assert_eq!(config.framing, Framing::Token);
        assert_eq!(config.repeat, RepeatPolicy::Ignore);
        assert!(config.is_framed());
    }

    #[test]
    fn test_builder_methods() {
        let config = ExchangeConfig::new()
            .framing(Framing::Unframed)
            .repeat(RepeatPolicy::Reject);
        assert_eq!(config.framing, Framing::Unframed);
        assert_eq!(config.repeat, RepeatPolicy::Reject);
        assert!(!config.is_framed());
    }
}
