//! API endpoint normalization.

use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Path every API command lives under.
pub const API_PATH: &str = "/bigbluebutton/api";

const DEFAULT_SCHEME: &str = "https://";

/// Turn a server base into the API endpoint.
///
/// Trailing slashes are stripped, `https://` is assumed when no scheme is
/// given, and [`API_PATH`] is appended unless the path already ends with it.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEndpoint`] when the result is not a valid
/// absolute URL.
pub fn normalize_endpoint(server: &str) -> ConfigResult<String> {
    let trimmed = server.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidEndpoint {
            value: server.to_string(),
            reason: "empty server".to_string(),
        });
    }
    let mut endpoint = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("{DEFAULT_SCHEME}{trimmed}")
    };
    if !endpoint.ends_with(API_PATH) {
        endpoint.push_str(API_PATH);
    }

    let parsed = Url::parse(&endpoint).map_err(|err| ConfigError::InvalidEndpoint {
        value: server.to_string(),
        reason: err.to_string(),
    })?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::InvalidEndpoint {
            value: server.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(endpoint)
}
