//! Shared application context and error types for the CLI.

use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;
use bbbctl_api::{ApiError, BbbClient, BbbError, ChecksumAlgorithm, TlsPolicy};
use bbbctl_config::{ConfigError, Credentials};

use crate::output::{OutputFormat, format_human};

/// CLI-level error type to distinguish validation, API, and operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Api(ApiError),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    /// Every fatal error exits with status 1.
    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::Api(_) | Self::Failure(_) => 1,
        }
    }

    /// API failures are always shown as a human tree, whatever `--format` says.
    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Api(err) => format!("{err}\n{}", format_human(&err.response)),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<BbbError> for CliError {
    fn from(error: BbbError) -> Self {
        match error {
            BbbError::Api(err) => Self::Api(err),
            other => Self::failure(other),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        Self::Validation(error.to_string())
    }
}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) api: BbbClient,
    pub(crate) format: OutputFormat,
}

impl AppContext {
    pub(crate) fn new(
        credentials: &Credentials,
        tls: TlsPolicy,
        checksum: ChecksumAlgorithm,
        format: OutputFormat,
    ) -> CliResult<Self> {
        let api = BbbClient::new(
            credentials.endpoint.as_str(),
            credentials.secret.expose(),
            tls,
            checksum,
        )
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;
        Ok(Self { api, format })
    }
}
