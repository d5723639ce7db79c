//! Log subscriber setup
//!
//! Library code only emits `tracing` events; the binary installs the
//! subscriber once. `RUST_LOG` wins over the CLI verbosity when set.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Verbosity;

/// Filter for `verbosity`, unless `RUST_LOG` overrides it
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()))
}

/// Install the global subscriber. Logs go to stderr so they never mix with
/// command output. Later calls are no-ops.
pub fn init(verbosity: Verbosity) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(matches!(verbosity, Verbosity::VeryVerbose));

    tracing_subscriber::registry()
        .with(env_filter(verbosity))
        .with(layer)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init(Verbosity::Quiet);
        init(Verbosity::VeryVerbose);
    }

    #[test]
    fn test_filter_follows_verbosity() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(env_filter(Verbosity::Verbose).to_string(), "info");
        }
    }
}
