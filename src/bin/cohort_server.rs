//!
//! cohort server binary
//! --------------------
//! Command-line entry point for the participant HTTP API. Configuration comes from
//! environment variables, overridden by CLI flags (see `--help`).

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use cohort::config::{self, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if config::wants_help(&args) {
        println!("{}", config::USAGE);
        return Ok(());
    }

    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("invalid RUST_LOG filter")?;
    fmt().with_env_filter(filter).init();

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let cfg = ServerConfig::from_process().context("While reading server configuration")?;
    info!(
        target: "cohort",
        "cohort starting: RUST_LOG='{}', addr={}, users_file={:?}",
        rust_log, cfg.socket_addr(), cfg.users_file
    );

    cohort::server::run(cfg).await
}
