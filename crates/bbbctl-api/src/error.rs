//! Error types for API calls.
//!
//! Three failure families stay distinct: the server answered with a
//! non-`SUCCESS` status ([`ApiError`]), the body was not valid XML
//! ([`ParseError`]), or the HTTP exchange itself failed ([`TransportError`]).

use reqwest::StatusCode;
use thiserror::Error;

use crate::element::Element;

/// Convenience alias for API operations.
pub type BbbResult<T> = Result<T, BbbError>;

/// Malformed response body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed XML at byte {position}: {message}")]
pub struct ParseError {
    /// Byte offset where parsing stopped.
    pub position: u64,
    /// Parser diagnostic.
    pub message: String,
}

impl ParseError {
    /// Build a parse error at the given byte offset.
    #[must_use]
    pub fn new(position: u64, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// Well-formed response whose `returncode` is not `SUCCESS`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{command} failed with returncode {}", .response.returncode().unwrap_or("<missing>"))]
pub struct ApiError {
    /// API command that was called.
    pub command: String,
    /// Full response tree as returned by the server.
    pub response: Element,
}

impl ApiError {
    /// `messageKey` reported by the server, when present.
    #[must_use]
    pub fn message_key(&self) -> Option<&str> {
        self.response.child_value("messageKey")
    }
}

/// HTTP-level failure.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// Connection, DNS, TLS, or body read failure.
    #[error("request to {command} failed")]
    Request {
        /// API command that was called.
        command: String,
        /// Underlying request error.
        #[source]
        source: reqwest::Error,
    },
    /// Non-2xx status whose body is not an API failure document.
    #[error("{command} returned HTTP status {status}")]
    Status {
        /// API command that was called.
        command: String,
        /// HTTP status returned by the server.
        status: StatusCode,
    },
}

/// Any failure produced by an API call.
#[derive(Debug, Error)]
pub enum BbbError {
    /// The server rejected the call.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The response body could not be parsed.
    #[error("malformed response to {command}")]
    Parse {
        /// API command that was called.
        command: String,
        /// Parser diagnostic.
        #[source]
        source: ParseError,
    },
    /// The HTTP exchange failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl BbbError {
    /// The API failure, if this error came from a non-`SUCCESS` response.
    #[must_use]
    pub const fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            Self::Parse { .. } | Self::Transport(_) => None,
        }
    }
}
