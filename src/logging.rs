//! Logging initialization
//!
//! Filter precedence: the `TWEAKSET_LOG` environment variable, then `-v`
//! (debug), then the configured `logging.level`.

use std::sync::Once;

use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive
pub const LOG_ENV: &str = "TWEAKSET_LOG";

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbose: bool, configured_level: &str) {
    let directive = filter_directive(std::env::var(LOG_ENV).ok(), verbose, configured_level);

    INIT_ONCE.call_once(|| {
        let (filter, rejected) = match EnvFilter::try_new(&directive) {
            Ok(filter) => (filter, None),
            Err(e) => (EnvFilter::new("info"), Some(e)),
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();

        if let Some(e) = rejected {
            warn!(directive = %directive, error = %e, "invalid log filter, using info");
        }
    });
}

fn filter_directive(env: Option<String>, verbose: bool, configured_level: &str) -> String {
    match env.filter(|v| !v.trim().is_empty()) {
        Some(directive) => directive,
        None if verbose => "debug".to_string(),
        None => configured_level.to_string(),
    }
}
