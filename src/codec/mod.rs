//! Codec module - serialization/deserialization for exchange payloads.
//!
//! - [`JsonCodec`] - compact JSON using `serde_json`
//!
//! # Design
//!
//! Codecs are marker structs with static methods rather than trait objects.
//! Payload types pick their JSON shape at compile time through `serde`.

mod json;

pub use json::JsonCodec;
