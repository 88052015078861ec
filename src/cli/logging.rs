//! cli::logging
//!
//! Diagnostic logging setup.
//!
//! `SUBREL_LOG` takes an `EnvFilter` directive (e.g. `subrel=trace`). Without
//! it, `--debug` selects `debug` and everything else `warn`. Logs go to
//! stderr so they never mix with command output.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "SUBREL_LOG";

/// Install the global subscriber. Safe to call more than once.
pub fn init(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
