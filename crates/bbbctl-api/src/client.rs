//! HTTP transport and typed API operations.

use std::fmt::{self, Debug, Formatter};

use reqwest::Client;
use tracing::{debug, warn};

use crate::checksum::ChecksumAlgorithm;
use crate::element::Element;
use crate::error::{ApiError, BbbError, BbbResult, TransportError};
use crate::request::{QueryParams, build_url};

const USER_AGENT: &str = concat!("bbbctl/", env!("CARGO_PKG_VERSION"));

/// Whether server certificates are verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Verify certificates against the system trust roots.
    #[default]
    Verify,
    /// Accept any certificate. Unsafe: responses and the request checksum can
    /// be intercepted by anyone on the network path.
    SkipVerification,
}

/// Client bound to one API endpoint and shared secret.
///
/// Calls run one at a time and are never retried.
#[derive(Clone)]
pub struct BbbClient {
    http: Client,
    endpoint: String,
    secret: String,
    checksum: ChecksumAlgorithm,
}

impl Debug for BbbClient {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("BbbClient")
            .field("endpoint", &self.endpoint)
            .field("secret", &"<redacted>")
            .field("checksum", &self.checksum)
            .finish_non_exhaustive()
    }
}

impl BbbClient {
    /// Build a client for an already normalized endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the HTTP client cannot be constructed.
    pub fn new(
        endpoint: impl Into<String>,
        secret: impl Into<String>,
        tls: TlsPolicy,
        checksum: ChecksumAlgorithm,
    ) -> Result<Self, TransportError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if tls == TlsPolicy::SkipVerification {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder
            .build()
            .map_err(|source| TransportError::Client { source })?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            secret: secret.into(),
            checksum,
        })
    }

    /// Endpoint every command is appended to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Signed URL for a command without issuing it.
    #[must_use]
    pub fn url(&self, command: &str, params: &QueryParams) -> String {
        build_url(&self.endpoint, command, params, &self.secret, self.checksum)
    }

    /// Issue a command and return the parsed root element.
    ///
    /// # Errors
    ///
    /// - [`BbbError::Transport`] when the request fails or returns a non-2xx
    ///   status without an API failure document.
    /// - [`BbbError::Parse`] when the body is not well-formed XML.
    /// - [`BbbError::Api`] when the `returncode` is not `SUCCESS`.
    pub async fn call(&self, command: &str, params: &QueryParams) -> BbbResult<Element> {
        let url = self.url(command, params);
        debug!(command, "calling API");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                command: command.to_string(),
                source,
            })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Request {
                command: command.to_string(),
                source,
            })?;
        debug!(command, %status, bytes = body.len(), "API responded");

        if !status.is_success() {
            return Err(match Element::parse(&body) {
                Ok(root) if root.returncode().is_some() && !root.is_success() => {
                    api_failure(command, root)
                }
                _ => TransportError::Status {
                    command: command.to_string(),
                    status,
                }
                .into(),
            });
        }

        let root = Element::parse(&body).map_err(|source| BbbError::Parse {
            command: command.to_string(),
            source,
        })?;
        if !root.is_success() {
            return Err(api_failure(command, root));
        }
        Ok(root)
    }

    /// Running meetings (`meetings/meeting`).
    ///
    /// # Errors
    ///
    /// See [`BbbClient::call`].
    pub async fn get_meetings(&self) -> BbbResult<Vec<Element>> {
        let root = self.call("getMeetings", &QueryParams::new()).await?;
        Ok(collect(&root, "meetings/meeting"))
    }

    /// Recordings matching the query (`recordings/recording`).
    ///
    /// # Errors
    ///
    /// See [`BbbClient::call`].
    pub async fn get_recordings(&self, params: &QueryParams) -> BbbResult<Vec<Element>> {
        let root = self.call("getRecordings", params).await?;
        Ok(collect(&root, "recordings/recording"))
    }

    /// Details of one meeting.
    ///
    /// # Errors
    ///
    /// See [`BbbClient::call`].
    pub async fn get_meeting_info(&self, meeting_id: &str) -> BbbResult<Element> {
        self.call("getMeetingInfo", &QueryParams::new().with("meetingID", meeting_id))
            .await
    }

    /// Create a meeting.
    ///
    /// # Errors
    ///
    /// See [`BbbClient::call`].
    pub async fn create_meeting(&self, params: &QueryParams) -> BbbResult<Element> {
        self.call("create", params).await
    }

    /// End a meeting using its moderator password.
    ///
    /// # Errors
    ///
    /// See [`BbbClient::call`].
    pub async fn end(&self, meeting_id: &str, password: Option<&str>) -> BbbResult<Element> {
        let params = QueryParams::new()
            .with("meetingID", meeting_id)
            .with_opt("password", password);
        self.call("end", &params).await
    }

    /// Publish or unpublish a recording.
    ///
    /// # Errors
    ///
    /// See [`BbbClient::call`].
    pub async fn publish_recordings(&self, record_id: &str, publish: bool) -> BbbResult<Element> {
        let params = QueryParams::new()
            .with("recordID", record_id)
            .with("publish", if publish { "true" } else { "false" });
        self.call("publishRecordings", &params).await
    }

    /// Delete a recording.
    ///
    /// # Errors
    ///
    /// See [`BbbClient::call`].
    pub async fn delete_recordings(&self, record_id: &str) -> BbbResult<Element> {
        self.call("deleteRecordings", &QueryParams::new().with("recordID", record_id))
            .await
    }

    /// Post a chat message into a running meeting.
    ///
    /// # Errors
    ///
    /// See [`BbbClient::call`].
    pub async fn send_chat_message(
        &self,
        meeting_id: &str,
        message: &str,
        user_name: Option<&str>,
    ) -> BbbResult<Element> {
        let params = QueryParams::new()
            .with("meetingID", meeting_id)
            .with("message", message)
            .with_opt("userName", user_name);
        self.call("sendChatMessage", &params).await
    }

    /// Signed `join` link. The link is only built, never fetched.
    #[must_use]
    pub fn join_link(&self, params: &QueryParams) -> String {
        self.url("join", params)
    }
}

fn api_failure(command: &str, response: Element) -> BbbError {
    ApiError {
        command: command.to_string(),
        response,
    }
    .into()
}

fn collect(root: &Element, path: &str) -> Vec<Element> {
    root.find_all(path).into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BbbClient {
        BbbClient::new(
            "https://bbb.example.org/bigbluebutton/api/",
            "secret",
            TlsPolicy::Verify,
            ChecksumAlgorithm::Sha1,
        )
        .expect("client")
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        assert_eq!(
            client().endpoint(),
            "https://bbb.example.org/bigbluebutton/api"
        );
    }

    #[test]
    fn debug_output_redacts_secret() {
        let rendered = format!("{:?}", client());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("\"secret\""));
    }

    #[test]
    fn join_link_is_signed_join_url() {
        let link = client().join_link(
            &QueryParams::new()
                .with("meetingID", "room-1")
                .with("fullName", "Ada Lovelace")
                .with("role", "MODERATOR"),
        );
        assert!(link.starts_with(
            "https://bbb.example.org/bigbluebutton/api/join?meetingID=room-1&fullName=Ada+Lovelace&role=MODERATOR&checksum="
        ));
    }
}
