//! Log output setup for the binary

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `TRIAGE_LOG=triage=debug`
pub const LOG_ENV: &str = "TRIAGE_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Logs go to stderr so stdout stays clean for reports.
///
/// `verbose` raises the default level to `debug` when `TRIAGE_LOG` is unset. Calling this
/// more than once is harmless.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "triage=debug" } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
