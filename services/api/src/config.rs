//! Runtime configuration for the CurbCheck service, read from
//! `CURBCHECK_`-prefixed environment variables (a `.env` file is honored
//! when present).

use std::env;
use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use curbcheck::ScoringConfig;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG: &str = "info";

/// Deployment stage; development keeps ANSI-colored log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

impl AppEnvironment {
    fn from_value(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("production") || value.eq_ignore_ascii_case("prod") {
            Self::Production
        } else {
            Self::Development
        }
    }
}

/// Everything the service binary needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub log_level: String,
    /// Optional JSON file overriding the engine's scoring constants.
    pub scoring_config_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = env::var("CURBCHECK_ENV")
            .map(|value| AppEnvironment::from_value(&value))
            .unwrap_or(AppEnvironment::Development);

        let host = env::var("CURBCHECK_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match env::var("CURBCHECK_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value: raw })?,
            Err(_) => DEFAULT_PORT,
        };

        let log_level = env::var("CURBCHECK_LOG").unwrap_or_else(|_| DEFAULT_LOG.to_string());
        let scoring_config_path = env::var("CURBCHECK_SCORING_CONFIG").ok().map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            log_level,
            scoring_config_path,
        })
    }

    /// Engine scoring constants: the built-in defaults, or the JSON file
    /// named by `CURBCHECK_SCORING_CONFIG`. Overrides are partial; fields
    /// left out keep their defaults.
    pub fn scoring_config(&self) -> Result<ScoringConfig, ConfigError> {
        let Some(path) = &self.scoring_config_path else {
            return Ok(ScoringConfig::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ScoringRead {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::ScoringParse {
            path: path.clone(),
            source,
        })
    }
}

/// HTTP listener binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Resolve host and port into a bind address. Hostnames such as
    /// `localhost` are accepted alongside literal IPs.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| ConfigError::HostNotResolved {
                host: self.host.clone(),
            })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort {
        value: String,
    },
    HostNotResolved {
        host: String,
    },
    ScoringRead {
        path: PathBuf,
        source: std::io::Error,
    },
    ScoringParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort { value } => {
                write!(f, "CURBCHECK_PORT '{value}' is not a valid port number")
            }
            ConfigError::HostNotResolved { host } => {
                write!(f, "CURBCHECK_HOST '{host}' does not resolve to a socket address")
            }
            ConfigError::ScoringRead { path, .. } => {
                write!(f, "cannot read scoring config '{}'", path.display())
            }
            ConfigError::ScoringParse { path, .. } => {
                write!(f, "scoring config '{}' is not valid JSON", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort { .. } | ConfigError::HostNotResolved { .. } => None,
            ConfigError::ScoringRead { source, .. } => Some(source),
            ConfigError::ScoringParse { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("CURBCHECK_ENV");
        env::remove_var("CURBCHECK_HOST");
        env::remove_var("CURBCHECK_PORT");
        env::remove_var("CURBCHECK_LOG");
        env::remove_var("CURBCHECK_SCORING_CONFIG");
    }

    #[test]
    fn load_uses_development_defaults() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();

        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.log_level, DEFAULT_LOG);
        assert!(config.scoring_config_path.is_none());
        assert_eq!(
            config.scoring_config().expect("defaults"),
            ScoringConfig::default()
        );
    }

    #[test]
    fn production_is_recognized_case_insensitively() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CURBCHECK_ENV", "Production");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        env::remove_var("CURBCHECK_ENV");
    }

    #[test]
    fn rejects_non_numeric_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CURBCHECK_PORT", "not-a-port");

        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidPort { .. })
        ));
        env::remove_var("CURBCHECK_PORT");
    }

    #[test]
    fn localhost_resolves_to_a_loopback_bind() {
        let server = ServerConfig {
            host: "localhost".to_string(),
            port: 9100,
        };

        let addr = server.socket_addr().expect("localhost resolves");
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 9100);
    }

    #[test]
    fn unresolvable_host_is_an_error() {
        let server = ServerConfig {
            host: "curbcheck-no-such-host.invalid".to_string(),
            port: 9100,
        };

        assert!(matches!(
            server.socket_addr(),
            Err(ConfigError::HostNotResolved { .. })
        ));
    }

    #[test]
    fn scoring_override_file_merges_with_defaults() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();

        let path = env::temp_dir().join("curbcheck-scoring-override.json");
        fs::write(&path, r#"{"overall": {"buy_threshold": 7.5}}"#).expect("write override");
        env::set_var("CURBCHECK_SCORING_CONFIG", &path);

        let config = AppConfig::load().expect("config loads");
        let scoring = config.scoring_config().expect("override parses");
        assert_eq!(scoring.overall.buy_threshold, 7.5);
        assert_eq!(scoring.overall.maybe_threshold, 4.0);

        env::remove_var("CURBCHECK_SCORING_CONFIG");
        fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_scoring_file_is_an_error() {
        let config = AppConfig {
            environment: AppEnvironment::Development,
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            log_level: DEFAULT_LOG.to_string(),
            scoring_config_path: Some(PathBuf::from("/definitely/not/here.json")),
        };

        assert!(matches!(
            config.scoring_config(),
            Err(ConfigError::ScoringRead { .. })
        ));
    }
}
