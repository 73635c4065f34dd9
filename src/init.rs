//! Initialization helpers for the application startup.

use tracing_subscriber::EnvFilter;

/// Sets up the tracing subscriber. An explicit `RUST_LOG` wins; otherwise
/// the verbosity flags pick the level, with the HTTP stack internals damped
/// so `-D` output stays about indicators.
pub fn setup_logging(verbose: bool, debug: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = match (debug, verbose) {
            (true, _) => "debug",
            (false, true) => "info",
            (false, false) => "warn",
        }
        .to_string();

        filter.push_str(",hyper=warn,hyper_util=warn,reqwest=warn");
        EnvFilter::new(filter)
    });

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
