//! marine-weather binary
//!
//! Thin CLI wrapper around the library. Takes an optional config path and a
//! `--dry-run` flag, then invokes `marine_weather::run`.

use anyhow::Result;
use std::env;
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = "marine-weather.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let dry_run = args.iter().any(|a| a == "--dry-run");
    let config = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    marine_weather::run(&config, dry_run).await
}
