use clap::Parser;
use tracing_subscriber::EnvFilter;

use pendulum_runtime::runtime::{self, RuntimeConfig};

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with_writer(std::io::stderr) // stdout carries telemetry when no port is given
        .init();

    let config = RuntimeConfig::parse();
    if let Err(e) = runtime::run(config).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
