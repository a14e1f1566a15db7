#![forbid(unsafe_code)]
#![deny(
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Connection settings for the command-line client.
//!
//! Layout: `endpoint.rs` (API URL normalization), `properties.rs` (server-local
//! properties file lookup), `settings.rs` (flag/env/file resolution),
//! `error.rs` (`ConfigError`).

pub mod endpoint;
pub mod error;
pub mod properties;
pub mod settings;

pub use endpoint::{API_PATH, normalize_endpoint};
pub use error::{ConfigError, ConfigResult};
pub use properties::{DEFAULT_PROPERTIES_LOCATIONS, PropertiesLookup, SECRET_KEY, SERVER_URL_KEY};
pub use settings::{ApiSecret, Credentials, ENV_SECRET, ENV_SERVER, resolve_credentials};
