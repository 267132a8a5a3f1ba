use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter, e.g. `finmodel_core=debug`.
pub const LOG_ENV: &str = "FINMODEL_LOG";

static TRACING_INIT: Once = Once::new();

/// Install the stderr subscriber once. `--verbose` wins over the
/// environment; otherwise `FINMODEL_LOG` applies, defaulting to `warn`.
pub fn init(verbose: bool) {
    TRACING_INIT.call_once(|| {
        let filter = if verbose {
            EnvFilter::new("finmodel_core=debug,finmodel_cli=debug")
        } else {
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
        };

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
