//! Sort-and-double worker - untyped numeric payload.
//!
//! Integers stay integers and floats stay floats.
//!
//! ```sh
//! printf 'tok\n[3, 1, 2]' | cargo run --example sort_double
//! # tok
//! # [2,4,6]
//! ```

use serde_json::Number;
use stdio_exchange::Channel;
use tracing_subscriber::EnvFilter;

/// Sort ascending, then double each element.
///
/// Returns `None` if a doubled value leaves the range JSON can carry.
fn sort_double(mut values: Vec<Number>) -> Option<Vec<Number>> {
    values.sort_by(|a, b| {
        let a = a.as_f64().unwrap_or(f64::NAN);
        let b = b.as_f64().unwrap_or(f64::NAN);
        a.total_cmp(&b)
    });

    values
        .into_iter()
        .map(|n| match n.as_i64().and_then(|i| i.checked_mul(2)) {
            Some(i) => Some(Number::from(i)),
            None => Number::from_f64(n.as_f64()? * 2.0),
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut channel = Channel::stdio();
    channel.initialize()?;

    let Some(values) = channel.read_input::<Vec<Number>>()? else {
        tracing::warn!("no input payload");
        return Ok(());
    };

    let doubled = sort_double(values).ok_or("doubled value out of range")?;
    channel.write_output(&doubled)?;
    Ok(())
}
