//! Lookup of `key=value` properties files installed on a server host.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Property holding the public server URL.
pub const SERVER_URL_KEY: &str = "bigbluebutton.web.serverURL";

/// Property holding the shared API secret.
pub const SECRET_KEY: &str = "securitySalt";

/// Candidate files, highest priority first.
pub const DEFAULT_PROPERTIES_LOCATIONS: [&str; 3] = [
    "/etc/bigbluebutton/bbb-web.properties",
    "/usr/share/bbb-web/WEB-INF/classes/bigbluebutton.properties",
    "/var/lib/tomcat7/webapps/bigbluebutton/WEB-INF/classes/bigbluebutton.properties",
];

/// Ordered list of candidate properties files.
///
/// The first file that exists is authoritative: a key missing from it is an
/// error even if a lower-priority file would define it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertiesLookup {
    locations: Vec<PathBuf>,
}

impl Default for PropertiesLookup {
    fn default() -> Self {
        Self::new(DEFAULT_PROPERTIES_LOCATIONS.iter().map(PathBuf::from))
    }
}

impl PropertiesLookup {
    /// Lookup over custom candidate paths.
    #[must_use]
    pub fn new(locations: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            locations: locations.into_iter().collect(),
        }
    }

    /// Candidate paths in priority order.
    #[must_use]
    pub fn locations(&self) -> &[PathBuf] {
        &self.locations
    }

    /// Trimmed value of `key` from the first existing candidate file.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::PropertiesNotFound`] if no candidate exists.
    /// - [`ConfigError::PropertiesUnreadable`] if the first existing file cannot be read.
    /// - [`ConfigError::PropertyMissing`] if that file does not define `key`.
    pub fn find(&self, key: &str) -> ConfigResult<String> {
        for path in &self.locations {
            if !path.is_file() {
                continue;
            }
            debug!(path = %path.display(), key, "reading properties file");
            let contents = read_properties(path)?;
            return find_property(&contents, key).ok_or_else(|| ConfigError::PropertyMissing {
                key: key.to_string(),
                path: path.clone(),
            });
        }
        Err(ConfigError::PropertiesNotFound {
            locations: self.locations.clone(),
        })
    }
}

fn read_properties(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|source| ConfigError::PropertiesUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

fn find_property(contents: &str, key: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let (name, value) = line.split_once('=')?;
        (name.trim() == key).then(|| value.trim().to_string())
    })
}
