//! Error types for configuration resolution.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No server URL from flag, environment, or properties file.
    #[error("missing --server parameter or {env} variable")]
    MissingServer {
        /// Environment variable that was consulted.
        env: &'static str,
    },
    /// No shared secret from flag, environment, or properties file.
    #[error("missing --secret parameter or {env} variable")]
    MissingSecret {
        /// Environment variable that was consulted.
        env: &'static str,
    },
    /// The server value could not be turned into an API URL.
    #[error("invalid server URL '{value}': {reason}")]
    InvalidEndpoint {
        /// Value supplied by the user.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// None of the candidate properties files exist.
    #[error("unable to find server config files at the usual locations: {}", format_paths(.locations))]
    PropertiesNotFound {
        /// Candidate paths that were checked.
        locations: Vec<PathBuf>,
    },
    /// A properties file exists but could not be read.
    #[error("found {} but could not read it", .path.display())]
    PropertiesUnreadable {
        /// File that failed to open.
        path: PathBuf,
        /// Source IO error.
        #[source]
        source: io::Error,
    },
    /// The authoritative properties file does not define the key.
    #[error("unable to find '{key}' in {}", .path.display())]
    PropertyMissing {
        /// Property key that was looked up.
        key: String,
        /// File that was searched.
        path: PathBuf,
    },
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
