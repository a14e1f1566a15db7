use bbbctl_api::{
    BbbClient, BbbError, ChecksumAlgorithm, QueryParams, TlsPolicy, TransportError, sign,
};
use bbbctl_test_support::fixtures;
use httpmock::prelude::*;

const API_PATH: &str = "/bigbluebutton/api";

fn client_for(server: &MockServer) -> BbbClient {
    BbbClient::new(
        format!("{}{API_PATH}", server.base_url()),
        "secret",
        TlsPolicy::Verify,
        ChecksumAlgorithm::Sha1,
    )
    .expect("client")
}

#[tokio::test]
async fn get_meetings_sends_signed_request_and_returns_meetings() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let checksum = sign(ChecksumAlgorithm::Sha1, "getMeetings", "", "secret");
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{API_PATH}/getMeetings"))
            .query_param("checksum", checksum.as_str());
        then.status(200).body(fixtures::meetings_response(&[
            fixtures::meeting("room-1", "First", 2),
            fixtures::meeting("room-2", "Second", 5),
        ]));
    });

    let meetings = client_for(&server).get_meetings().await?;

    mock.assert();
    assert_eq!(meetings.len(), 2);
    assert_eq!(meetings[0].child_value("meetingID"), Some("room-1"));
    assert_eq!(meetings[1].child_value("participantCount"), Some("5"));
    Ok(())
}

#[tokio::test]
async fn empty_meeting_list_is_not_an_error() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(format!("{API_PATH}/getMeetings"));
        then.status(200).body(
            "<response><returncode>SUCCESS</returncode><meetings/>\
<messageKey>noMeetings</messageKey></response>",
        );
    });

    let meetings = client_for(&server).get_meetings().await?;
    assert!(meetings.is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_returncode_surfaces_api_error_with_full_tree() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(format!("{API_PATH}/create"));
        then.status(200)
            .body(fixtures::failure_response("idNotUnique", "A meeting already exists"));
    });

    let err = client_for(&server)
        .create_meeting(&QueryParams::new().with("meetingID", "dup"))
        .await
        .expect_err("api failure expected");

    let api = err.as_api().expect("api error");
    assert_eq!(api.command, "create");
    assert_eq!(api.response.returncode(), Some("FAILED"));
    assert_eq!(api.message_key(), Some("idNotUnique"));
    assert_eq!(
        api.response.child_value("message"),
        Some("A meeting already exists")
    );
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(format!("{API_PATH}/getMeetingInfo"));
        then.status(200).body("<response><returncode>SUCCESS");
    });

    let err = client_for(&server)
        .get_meeting_info("room-1")
        .await
        .expect_err("parse failure expected");
    assert!(matches!(err, BbbError::Parse { ref command, .. } if command == "getMeetingInfo"));
}

#[tokio::test]
async fn non_success_status_without_api_document_is_transport_error() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(format!("{API_PATH}/getRecordings"));
        then.status(502).body("Bad Gateway");
    });

    let err = client_for(&server)
        .get_recordings(&QueryParams::new())
        .await
        .expect_err("transport failure expected");
    assert!(matches!(
        err,
        BbbError::Transport(TransportError::Status { status, .. }) if status.as_u16() == 502
    ));
}

#[tokio::test]
async fn non_success_status_with_failure_document_is_api_error() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path(format!("{API_PATH}/end"));
        then.status(404)
            .body(fixtures::failure_response("notFound", "No such meeting"));
    });

    let err = client_for(&server)
        .end("missing", Some("mp"))
        .await
        .expect_err("api failure expected");
    assert_eq!(
        err.as_api().and_then(|api| api.message_key()),
        Some("notFound")
    );
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let client = BbbClient::new(
        "http://127.0.0.1:9/bigbluebutton/api",
        "secret",
        TlsPolicy::Verify,
        ChecksumAlgorithm::Sha1,
    )
    .expect("client");

    let err = client.get_meetings().await.expect_err("connection refused");
    assert!(matches!(
        err,
        BbbError::Transport(TransportError::Request { .. })
    ));
}

#[tokio::test]
async fn publish_and_chat_send_expected_parameters() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let publish = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{API_PATH}/publishRecordings"))
            .query_param("recordID", "rec-1")
            .query_param("publish", "false");
        then.status(200)
            .body(fixtures::success_response("published"));
    });
    let chat = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{API_PATH}/sendChatMessage"))
            .query_param("meetingID", "room-1")
            .query_param("message", "hello all")
            .query_param("userName", "ops");
        then.status(200).body(fixtures::success_response("sent"));
    });

    let client = client_for(&server);
    client.publish_recordings("rec-1", false).await?;
    client
        .send_chat_message("room-1", "hello all", Some("ops"))
        .await?;

    publish.assert();
    chat.assert();
    Ok(())
}
