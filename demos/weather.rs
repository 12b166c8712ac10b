//! Weather worker - token-framed child with a typed payload.
//!
//! Reads a `Weather` record, warms it up, writes it back.
//!
//! # Running by hand
//!
//! ```sh
//! printf 'tok\n{"temp": 10.0, "description": "cold"}' \
//!     | cargo run --example weather
//! # tok
//! # {"temp":22.8,"description":"warm"}
//! ```

use serde::{Deserialize, Serialize};
use stdio_exchange::Channel;
use tracing_subscriber::EnvFilter;

/// Payload exchanged with the host.
#[derive(Serialize, Deserialize, Debug)]
struct Weather {
    temp: f64,
    description: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries the payload
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut channel = Channel::stdio();
    channel.exchange(|mut weather: Weather| {
        weather.temp += 12.8;
        weather.description = "warm".to_string();
        weather
    })?;

    Ok(())
}
