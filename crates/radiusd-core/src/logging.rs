//! tracing subscriber setup

use crate::config::Config;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// `log_level` if set, else `debug` when verbose, else `info`
pub fn filter_directive(config: &Config) -> &str {
    if let Some(level) = &config.log_level {
        level.as_str()
    } else if config.verbose {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber; `RUST_LOG` takes precedence over the config
pub fn init(config: &Config) -> Result<(), TryInitError> {
    let directive = filter_directive(config);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        let mut config = Config::default();
        assert_eq!(filter_directive(&config), "info");

        config.verbose = true;
        assert_eq!(filter_directive(&config), "debug");

        config.log_level = Some("warn".to_string());
        assert_eq!(filter_directive(&config), "warn");
    }
}
