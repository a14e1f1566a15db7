//! Resolution of the server URL and shared secret.

use std::fmt::{self, Debug, Formatter};

use tracing::debug;

use crate::endpoint::normalize_endpoint;
use crate::error::{ConfigError, ConfigResult};
use crate::properties::{PropertiesLookup, SECRET_KEY, SERVER_URL_KEY};

/// Environment variable consulted when `--server` is absent.
pub const ENV_SERVER: &str = "BBBCTL_SERVER";

/// Environment variable consulted when `--secret` is absent.
pub const ENV_SECRET: &str = "BBBCTL_SECRET";

/// Shared API secret. Never shown by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSecret(String);

impl ApiSecret {
    /// Wrap a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw secret for request signing.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiSecret {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("ApiSecret(<redacted>)")
    }
}

/// Normalized endpoint and secret, fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API endpoint ending in `/bigbluebutton/api`.
    pub endpoint: String,
    /// Shared secret.
    pub secret: ApiSecret,
}

/// Resolve credentials from explicit values, falling back to the properties
/// file only when `local` is provided.
///
/// `server` and `secret` carry the flag value or, when the flag is absent,
/// the environment variable. Empty values count as absent.
///
/// # Errors
///
/// Returns [`ConfigError::MissingServer`] / [`ConfigError::MissingSecret`]
/// when a value cannot be found, any properties lookup error, or
/// [`ConfigError::InvalidEndpoint`] when the server cannot be normalized.
pub fn resolve_credentials(
    server: Option<&str>,
    secret: Option<&str>,
    local: Option<&PropertiesLookup>,
) -> ConfigResult<Credentials> {
    let server = resolve_value(server, local, SERVER_URL_KEY)?
        .ok_or(ConfigError::MissingServer { env: ENV_SERVER })?;
    let secret = resolve_value(secret, local, SECRET_KEY)?
        .ok_or(ConfigError::MissingSecret { env: ENV_SECRET })?;

    let endpoint = normalize_endpoint(&server)?;
    debug!(%endpoint, local = local.is_some(), "resolved API endpoint");
    Ok(Credentials {
        endpoint,
        secret: ApiSecret::new(secret),
    })
}

fn resolve_value(
    explicit: Option<&str>,
    local: Option<&PropertiesLookup>,
    key: &str,
) -> ConfigResult<Option<String>> {
    if let Some(value) = explicit.map(str::trim).filter(|value| !value.is_empty()) {
        return Ok(Some(value.to_string()));
    }
    local.map(|lookup| lookup.find(key)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn properties(dir: &TempDir, contents: &str) -> PropertiesLookup {
        let path = dir.path().join("bbb-web.properties");
        fs::write(&path, contents).expect("write properties");
        PropertiesLookup::new([path])
    }

    #[test]
    fn explicit_values_win() {
        let credentials =
            resolve_credentials(Some("bbb.example.org"), Some("s3cret"), None).expect("resolved");
        assert_eq!(
            credentials.endpoint,
            "https://bbb.example.org/bigbluebutton/api"
        );
        assert_eq!(credentials.secret.expose(), "s3cret");
    }

    #[test]
    fn missing_server_without_local_is_an_error() {
        let err = resolve_credentials(None, Some("s"), None).expect_err("missing server");
        assert!(matches!(err, ConfigError::MissingServer { .. }));
        assert_eq!(
            err.to_string(),
            "missing --server parameter or BBBCTL_SERVER variable"
        );
    }

    #[test]
    fn empty_secret_counts_as_missing() {
        let err = resolve_credentials(Some("bbb.example.org"), Some("  "), None)
            .expect_err("missing secret");
        assert!(matches!(err, ConfigError::MissingSecret { .. }));
    }

    #[test]
    fn local_properties_fill_in_missing_values() {
        let dir = TempDir::new().expect("tempdir");
        let lookup = properties(
            &dir,
            "bigbluebutton.web.serverURL=https://bbb.example.org\nsecuritySalt=from-file\n",
        );
        let credentials = resolve_credentials(None, None, Some(&lookup)).expect("resolved");
        assert_eq!(
            credentials.endpoint,
            "https://bbb.example.org/bigbluebutton/api"
        );
        assert_eq!(credentials.secret.expose(), "from-file");
    }

    #[test]
    fn explicit_secret_overrides_local_properties() {
        let dir = TempDir::new().expect("tempdir");
        let lookup = properties(
            &dir,
            "bigbluebutton.web.serverURL=https://bbb.example.org\nsecuritySalt=from-file\n",
        );
        let credentials =
            resolve_credentials(None, Some("flag"), Some(&lookup)).expect("resolved");
        assert_eq!(credentials.secret.expose(), "flag");
    }

    #[test]
    fn local_lookup_errors_propagate() {
        let lookup = PropertiesLookup::new([PathBuf::from("/nonexistent/bbb.properties")]);
        let err = resolve_credentials(None, None, Some(&lookup)).expect_err("no file");
        assert!(matches!(err, ConfigError::PropertiesNotFound { .. }));
    }

    #[test]
    fn secret_is_redacted_in_debug_output() {
        let credentials =
            resolve_credentials(Some("bbb.example.org"), Some("s3cret"), None).expect("resolved");
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
