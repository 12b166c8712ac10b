//! Host driver - runs another program as an exchange child.
//!
//! ```sh
//! cargo build --example weather
//! cargo run --example host -- ./target/debug/examples/weather
//! ```

use std::time::Duration;

use serde_json::json;
use stdio_exchange::host::Runner;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args_os().skip(1);
    let program = args.next().ok_or("usage: host <program> [args...]")?;

    let runner = Runner::new(program)
        .args(args)
        .timeout(Duration::from_secs(30));

    let exchange = runner
        .call::<_, serde_json::Value>(&json!({"temp": 10.0, "description": "cold"}))
        .await?;

    tracing::info!(elapsed = ?exchange.elapsed, "child finished");
    if !exchange.stderr.is_empty() {
        eprint!("{}", exchange.stderr);
    }
    println!("{}", exchange.output);
    Ok(())
}
