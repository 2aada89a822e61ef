//! Tracing setup for the service binary.

use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, AppEnvironment};
use crate::error::AppError;

/// Install the global subscriber. `RUST_LOG` wins over the configured level
/// so operators can raise verbosity without touching service config.
pub(crate) fn init(config: &AppConfig) -> Result<(), AppError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(config.environment == AppEnvironment::Development)
        .try_init()
        .map_err(|err| AppError::Telemetry(format!("cannot install tracing subscriber: {err}")))
}

fn parse_filter(directives: &str) -> Result<EnvFilter, AppError> {
    EnvFilter::try_new(directives)
        .map_err(|err| AppError::Telemetry(format!("invalid log filter '{directives}': {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_levels_and_per_target_directives_parse() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("curbcheck=debug,info").is_ok());
    }

    #[test]
    fn garbage_filter_is_rejected() {
        assert!(parse_filter("this is not a filter!!!").is_err());
    }
}
