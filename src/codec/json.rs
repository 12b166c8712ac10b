//! JSON codec using `serde_json`.
//!
//! Output is always compact (no pretty printing, no trailing newline) so the
//! bytes on the wire are exactly one JSON document.
//!
//! # Example
//!
//! ```
//! use stdio_exchange::codec::JsonCodec;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Weather {
//!     temp: f64,
//!     description: String,
//! }
//!
//! let w = Weather { temp: 10.0, description: "cold".to_string() };
//! let encoded = JsonCodec::encode(&w).unwrap();
//! assert_eq!(encoded, br#"{"temp":10.0,"description":"cold"}"#);
//! let decoded: Weather = JsonCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, w);
//! ```

use std::io::Read;

use crate::error::{ExchangeError, Result};

/// JSON codec for exchange payloads.
///
/// A struct's derived `Serialize` impl is its mapping to JSON; there is no
/// runtime fallback to field inspection.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to compact JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::Serialization`] if the value has no JSON
    /// representation (for example a map keyed by a non-string type).
    #[inline]
    pub fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(ExchangeError::Serialization)
    }

    /// Decode one JSON document from a byte slice.
    ///
    /// Surrounding whitespace is allowed; anything else after the document
    /// is an error.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(Self::map_decode_error)
    }

    /// Decode one JSON document from the remainder of a reader.
    pub fn decode_reader<T, R>(reader: R) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        R: Read,
    {
        serde_json::from_reader(reader).map_err(Self::map_decode_error)
    }

    fn map_decode_error(e: serde_json::Error) -> ExchangeError {
        if e.is_io() {
            ExchangeError::Io(e.into())
        } else {
            ExchangeError::MalformedInput(e)
        }
    }
}
