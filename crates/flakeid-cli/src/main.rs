#![doc = include_str!("../README.md")]

mod cli;

use std::io::Write;

use clap::Parser;
use cli::commands::run;
use cli::config::{CliArgs, CliConfig};
use cli::telemetry::init_telemetry;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();

    init_telemetry()?;

    let config = CliConfig::try_from(args)?;
    log_startup_info(&config);

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    run(&config, &mut out)?;
    out.flush()?;
    Ok(())
}

fn log_startup_info(config: &CliConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting flakeid with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting flakeid as worker {} (epoch {} ms)",
            config.generator.worker_id,
            config.generator.epoch_millis
        );
    }
}
