//! Runtime configuration loaded from the environment.

use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::workflow::domain::User;

/// Distinguishes runtime behaviour for different deployment stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    /// Local development.
    Development,
    /// Automated test runs.
    Test,
    /// Production deployment.
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Deployment stage.
    pub environment: AppEnvironment,
    /// HTTP binding.
    pub server: ServerConfig,
    /// Logging controls.
    pub telemetry: TelemetryConfig,
    /// Storage and directory sources.
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Loads configuration from `.env` and the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable holds an invalid value.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing `.env` file is the normal case outside development.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] when `APP_PORT` is not a valid
    /// port number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = AppEnvironment::parse(&lookup("APP_ENV").unwrap_or_default());
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let port = match lookup("APP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => 3000,
        };
        let log_level = lookup("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());
        let users_file = non_blank(lookup("APP_USERS_FILE")).map(PathBuf::from);
        let database_url = non_blank(lookup("DATABASE_URL"));

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig {
                users_file,
                database_url,
            },
        })
    }

    /// Loads the users named by `APP_USERS_FILE`.
    ///
    /// Returns `Ok(None)` when no file is configured outside production, in
    /// which case the caller may generate throwaway demo users.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UsersFileRequired`] in production when no file
    /// is configured, and the errors of [`load_users`] otherwise.
    pub fn configured_users(&self) -> Result<Option<Vec<User>>, ConfigError> {
        match &self.storage.users_file {
            Some(path) => load_users(path).map(Some),
            None if self.environment == AppEnvironment::Production => {
                Err(ConfigError::UsersFileRequired)
            }
            None => Ok(None),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl ServerConfig {
    /// Resolves the binding address. `localhost` maps to the IPv4 loopback.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHost`] when the host is not an IP
    /// address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost {
                host: self.host.clone(),
                source,
            })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Fallback filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

/// Where users and applications are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// JSON file seeding the user directory.
    pub users_file: Option<PathBuf>,
    /// `PostgreSQL` connection string.
    pub database_url: Option<String>,
}

/// Reads a JSON array of users.
///
/// Entries without an `id` receive a fresh one.
///
/// # Errors
///
/// Returns [`ConfigError::UsersFile`] when the file cannot be read and
/// [`ConfigError::UsersFormat`] when it is not a valid user list.
pub fn load_users(path: &Path) -> Result<Vec<User>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::UsersFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_users(&raw).map_err(|source| ConfigError::UsersFormat {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a JSON array of users.
///
/// # Errors
///
/// Returns the JSON error when `raw` is not a valid user list.
pub fn parse_users(raw: &str) -> Result<Vec<User>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `APP_PORT` is not a valid port number.
    #[error("APP_PORT must be a valid u16, got '{0}'")]
    InvalidPort(String),

    /// `APP_HOST` is not an IP address.
    #[error("APP_HOST must parse to an IPv4 or IPv6 address, got '{host}'")]
    InvalidHost {
        /// Rejected host value.
        host: String,
        /// Parse failure.
        source: AddrParseError,
    },

    /// Production requires an explicit user directory.
    #[error("APP_USERS_FILE must be set when APP_ENV is production")]
    UsersFileRequired,

    /// The users file could not be read.
    #[error("cannot read users file {}: {source}", path.display())]
    UsersFile {
        /// Offending path.
        path: PathBuf,
        /// I/O failure.
        source: std::io::Error,
    },

    /// The users file is not a valid user list.
    #[error("users file {} is malformed: {source}", path.display())]
    UsersFormat {
        /// Offending path.
        path: PathBuf,
        /// JSON failure.
        source: serde_json::Error,
    },
}
