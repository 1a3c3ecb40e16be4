//! Log output for the CLI.
//!
//! Logs always go to stderr so stdout carries nothing but ids. The filter is
//! read from `RUST_LOG` and defaults to `info`; generator internals log under
//! the `flakeid` target (`RUST_LOG=flakeid=trace` shows every call).

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}
