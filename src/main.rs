use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use httpmon::args::Args;
use httpmon::logging::init_logging;
use httpmon::runtime::{RuntimeConfig, shutdown_signal};
use httpmon::{Monitor, MonitorOptions};

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(args.log_file.as_deref());

    let config = args.resolve_config()?;
    let rt = RuntimeConfig::from_args(args.threads).build_runtime()?;

    rt.block_on(async move {
        let monitor = Monitor::new(MonitorOptions::new(config))
            .context("Failed to create log monitor")?;

        let shutdown = monitor.shutdown_handle();
        tokio::spawn(async move {
            shutdown_signal().await;
            info!("Stopping monitor...");
            shutdown.cancel();
        });

        monitor.run().await.context("Log monitor failed")
    })
}
