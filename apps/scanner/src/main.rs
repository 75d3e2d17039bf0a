mod config;
mod main_lib;
mod notifier;
mod scheduler;

use config::Config;
use main_lib::{build_scanner, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(&config.log_format);
    let scanner = build_scanner(&config)?;

    let handle = scheduler::start_scan_scheduler(scanner, config.scan_interval, config.top_n);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested, stopping scheduler");
    handle.abort();
    Ok(())
}
