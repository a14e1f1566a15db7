//! Canned API response documents.
//!
//! Meetings built here use `mp-<id>` / `ap-<id>` as moderator and attendee
//! passwords and [`CREATE_TIME`] as their `createTime` token.

/// `createTime` reported for every fixture meeting.
pub const CREATE_TIME: &str = "1700000000000";

/// A `<meeting>` element for `getMeetings`.
#[must_use]
pub fn meeting(id: &str, name: &str, participants: u32) -> String {
    format!(
        "<meeting>\
<meetingName><![CDATA[{name}]]></meetingName>\
<meetingID>{id}</meetingID>\
<internalMeetingID>internal-{id}</internalMeetingID>\
<createTime>{CREATE_TIME}</createTime>\
<voiceBridge>70{participants:03}</voiceBridge>\
<attendeePW>ap-{id}</attendeePW>\
<moderatorPW>mp-{id}</moderatorPW>\
<running>true</running>\
<duration>0</duration>\
<hasUserJoined>true</hasUserJoined>\
<recording>false</recording>\
<startTime>{CREATE_TIME}</startTime>\
<endTime>0</endTime>\
<participantCount>{participants}</participantCount>\
<moderatorCount>1</moderatorCount>\
<attendees>\
<attendee><userID>w_1</userID><fullName>Ada</fullName><role>MODERATOR</role></attendee>\
</attendees>\
<metadata />\
</meeting>"
    )
}

/// `getMeetings` response wrapping the given `<meeting>` elements.
#[must_use]
pub fn meetings_response(meetings: &[String]) -> String {
    format!(
        "<response><returncode>SUCCESS</returncode><meetings>{}</meetings></response>",
        meetings.concat()
    )
}

/// `getMeetingInfo` response for one meeting.
#[must_use]
pub fn meeting_info_response(id: &str, name: &str) -> String {
    format!(
        "<response>\
<returncode>SUCCESS</returncode>\
<meetingName>{name}</meetingName>\
<meetingID>{id}</meetingID>\
<createTime>{CREATE_TIME}</createTime>\
<attendeePW>ap-{id}</attendeePW>\
<moderatorPW>mp-{id}</moderatorPW>\
<running>true</running>\
<participantCount>2</participantCount>\
<attendees />\
</response>"
    )
}

/// `create` response for a new meeting.
#[must_use]
pub fn create_response(id: &str) -> String {
    format!(
        "<response>\
<returncode>SUCCESS</returncode>\
<meetingID>{id}</meetingID>\
<internalMeetingID>internal-{id}</internalMeetingID>\
<attendeePW>ap-{id}</attendeePW>\
<moderatorPW>mp-{id}</moderatorPW>\
<createTime>{CREATE_TIME}</createTime>\
<hasBeenForciblyEnded>false</hasBeenForciblyEnded>\
<messageKey />\
<message />\
</response>"
    )
}

/// A `<recording>` element for `getRecordings`.
#[must_use]
pub fn recording(record_id: &str, meeting_id: &str) -> String {
    format!(
        "<recording>\
<recordID>{record_id}</recordID>\
<meetingID>{meeting_id}</meetingID>\
<name>Lecture {meeting_id}</name>\
<published>true</published>\
<state>published</state>\
<startTime>1700000000000</startTime>\
<endTime>1700003600000</endTime>\
<participants>4</participants>\
<playback><format><type>presentation</type><length>60</length></format></playback>\
</recording>"
    )
}

/// `getRecordings` response wrapping the given `<recording>` elements.
#[must_use]
pub fn recordings_response(recordings: &[String]) -> String {
    format!(
        "<response><returncode>SUCCESS</returncode><recordings>{}</recordings></response>",
        recordings.concat()
    )
}

/// Successful response carrying only a `messageKey`, as returned by `end`,
/// `publishRecordings`, `deleteRecordings`, and `sendChatMessage`.
#[must_use]
pub fn success_response(message_key: &str) -> String {
    format!(
        "<response><returncode>SUCCESS</returncode><messageKey>{message_key}</messageKey></response>"
    )
}

/// Failed response with the given `messageKey` and human message.
#[must_use]
pub fn failure_response(message_key: &str, message: &str) -> String {
    format!(
        "<response>\
<returncode>FAILED</returncode>\
<messageKey>{message_key}</messageKey>\
<message>{message}</message>\
</response>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meetings_response_concatenates_elements() {
        let body = meetings_response(&[meeting("a", "A", 1), meeting("b", "B", 2)]);
        assert_eq!(body.matches("<meeting>").count(), 2);
        assert!(body.starts_with("<response><returncode>SUCCESS</returncode>"));
    }

    #[test]
    fn meeting_passwords_follow_the_id() {
        let body = meeting("room", "Room", 3);
        assert!(body.contains("<moderatorPW>mp-room</moderatorPW>"));
        assert!(body.contains("<participantCount>3</participantCount>"));
    }
}
