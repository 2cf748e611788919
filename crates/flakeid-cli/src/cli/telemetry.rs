//! Log output for the `flakeid` binary.
//!
//! Events are written to stderr through `tracing_subscriber::fmt` so that
//! stdout only ever carries ids or decoded output. The level is taken from
//! `RUST_LOG` and defaults to `info`. Events emitted inside the `flakeid`
//! library (configuration at `debug`, clock regressions at `warn`) go through
//! the same subscriber.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()?;
    Ok(())
}
