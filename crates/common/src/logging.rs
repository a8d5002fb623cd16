//! Logging and tracing initialization.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Directive used when the caller asks for verbose output.
const VERBOSE_DIRECTIVE: &str = "composer=debug,composer_interaction=debug,composer_render_engine=debug,info";

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level. Returns `false`
/// when a global subscriber was already installed (e.g. by a test harness).
pub fn init_logging(config: &LoggingConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(config));

    let installed = if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    };

    if installed {
        tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    }
    installed
}

/// Initialize logging for a command-line tool, optionally forcing debug output.
pub fn init_cli_logging(config: &LoggingConfig, verbose: bool) -> bool {
    if verbose {
        let verbose_config = LoggingConfig {
            level: VERBOSE_DIRECTIVE.to_string(),
            ..config.clone()
        };
        init_logging(&verbose_config)
    } else {
        init_logging(config)
    }
}

/// Build the filter for a config, falling back to `info` on a malformed level.
fn filter_for(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"))
}
