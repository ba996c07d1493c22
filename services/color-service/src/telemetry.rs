//! Logging setup

use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::LogFormat;

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = FmtSubscriber::builder().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
