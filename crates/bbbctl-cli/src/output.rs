//! Output renderers and formatting helpers for CLI commands.
//!
//! Every renderer is a pure function over an [`Element`] subtree; the
//! selected [`OutputFormat`] only chooses which one runs.

use std::io::Write;

use anyhow::{Context, anyhow};
use bbbctl_api::Element;
use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use serde_json::{Map, Value};

use crate::client::{CliError, CliResult};

/// Output format selected once per invocation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Indented `tag: value` tree.
    #[default]
    Human,
    /// One line per element: `tag=value(child, ...)`.
    Compact,
    /// XML subtree as returned by the server.
    Xml,
    /// Pretty-printed JSON.
    Json,
    /// Single-line JSON.
    #[value(name = "jsonline")]
    JsonLine,
}

/// Tag sets consulted when converting a tree to JSON.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldCoercionRules {
    /// Tags rendered as arrays of their children, even when empty or singular.
    pub(crate) lists: &'static [&'static str],
    /// Leaf tags whose text must parse as an integer.
    pub(crate) numbers: &'static [&'static str],
}

pub(crate) const COERCION_RULES: FieldCoercionRules = FieldCoercionRules {
    lists: &[
        "meetings",
        "recordings",
        "attendees",
        "breakoutRooms",
        "playback",
        "images",
    ],
    numbers: &[
        "createTime",
        "startTime",
        "endTime",
        "duration",
        "participantCount",
        "listenerCount",
        "voiceParticipantCount",
        "videoCount",
        "maxUsers",
        "moderatorCount",
        "participants",
        "size",
        "rawSize",
        "length",
        "processingTime",
    ],
};

const TIMESTAMP_TAGS: [&str; 2] = ["starttime", "endtime"];
const INDENT: &str = "  ";

/// Render an element in the selected format.
pub(crate) fn render(element: &Element, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Human => Ok(format_human(element)),
        OutputFormat::Compact => Ok(format_compact(element)),
        OutputFormat::Xml => Ok(element.to_xml()),
        OutputFormat::Json => {
            let value = to_json(element, &COERCION_RULES).map_err(CliError::failure)?;
            serde_json::to_string_pretty(&value)
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
        }
        OutputFormat::JsonLine => {
            let value = to_json(element, &COERCION_RULES).map_err(CliError::failure)?;
            serde_json::to_string(&value)
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
        }
    }
}

/// Write one rendered block followed by a newline.
pub(crate) fn write_line(out: &mut dyn Write, text: &str) -> CliResult<()> {
    writeln!(out, "{text}")
        .map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
}

/// Indented tree, two spaces per depth level.
#[must_use]
pub(crate) fn format_human(element: &Element) -> String {
    let mut out = String::new();
    write_human(element, 0, &mut out);
    out
}

fn write_human(element: &Element, depth: usize, out: &mut String) {
    out.push_str(&INDENT.repeat(depth));
    out.push_str(element.tag());
    out.push(':');

    let value = element.value().map(|raw| {
        if is_timestamp_tag(element.tag()) {
            format_timestamp(raw)
        } else {
            raw.to_string()
        }
    });
    if let Some(value) = value {
        out.push(' ');
        out.push_str(&safe_str(&value));
    }

    for child in element.children() {
        out.push('\n');
        write_human(child, depth + 1, out);
    }
}

fn is_timestamp_tag(tag: &str) -> bool {
    TIMESTAMP_TAGS
        .iter()
        .any(|candidate| tag.eq_ignore_ascii_case(candidate))
}

/// `<RFC 3339 UTC> (<millis>)`, or the raw value if it is not a millisecond timestamp.
fn format_timestamp(raw: &str) -> String {
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map_or_else(
            || raw.to_string(),
            |time| {
                format!(
                    "{} ({raw})",
                    time.to_rfc3339_opts(SecondsFormat::Millis, true)
                )
            },
        )
}

/// Single line: `tag`, optional `=value`, optional `(child, ...)`.
#[must_use]
pub(crate) fn format_compact(element: &Element) -> String {
    let mut out = element.tag().to_string();
    if let Some(value) = element.value() {
        out.push('=');
        out.push_str(&safe_str(value));
    }
    if !element.is_leaf() {
        let children = element
            .children()
            .iter()
            .map(format_compact)
            .collect::<Vec<_>>()
            .join(", ");
        out.push('(');
        out.push_str(&children);
        out.push(')');
    }
    out
}

/// Quote values that would be ambiguous in human or compact output.
#[must_use]
pub(crate) fn safe_str(value: &str) -> String {
    if value.contains(['\n', ' ', ',', '"', '\'', '=']) {
        quote(value)
    } else {
        value.to_string()
    }
}

/// JSON string literal for a value.
#[must_use]
pub(crate) fn quote(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Convert a tree to a plain JSON value.
///
/// Fails when a numeric field holds non-integer text.
pub(crate) fn to_json(element: &Element, rules: &FieldCoercionRules) -> anyhow::Result<Value> {
    let tag = element.tag();
    if rules.lists.contains(&tag) {
        return element
            .children()
            .iter()
            .map(|child| to_json(child, rules))
            .collect::<anyhow::Result<Vec<_>>>()
            .map(Value::Array);
    }

    if !element.is_leaf() {
        let mut object = Map::new();
        for child in element.children() {
            object.insert(child.tag().to_string(), to_json(child, rules)?);
        }
        return Ok(Value::Object(object));
    }

    let text = element.value();
    if rules.numbers.contains(&tag) {
        let raw = text.unwrap_or_default();
        let number = raw
            .parse::<i64>()
            .with_context(|| format!("field '{tag}' is not an integer: '{raw}'"))?;
        return Ok(Value::from(number));
    }

    Ok(match text {
        None => Value::Null,
        Some("true") => Value::Bool(true),
        Some("false") => Value::Bool(false),
        Some(text) => Value::String(text.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meeting() -> Element {
        Element::new("meeting")
            .with_child(Element::new("meetingName").with_text("Weekly sync"))
            .with_child(Element::new("meetingID").with_text("room-1"))
            .with_child(Element::new("participantCount").with_text(" 7 "))
            .with_child(Element::new("running").with_text("true"))
            .with_child(Element::new("attendees"))
            .with_child(
                Element::new("metadata").with_child(Element::new("bbb-origin").with_text("lms")),
            )
    }

    #[test]
    fn human_indents_two_spaces_per_level() {
        let tree = Element::new("a").with_child(
            Element::new("b").with_child(Element::new("c").with_child(Element::new("d"))),
        );
        let rendered = format_human(&tree);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec!["a:", "  b:", "    c:", "      d:"]);
        for (depth, line) in lines.iter().enumerate() {
            let leading = line.len() - line.trim_start().len();
            assert_eq!(leading, 2 * depth);
        }
    }

    #[test]
    fn human_quotes_values_with_separators() {
        let rendered = format_human(&meeting());
        assert!(rendered.starts_with("meeting:\n  meetingName: \"Weekly sync\"\n"));
        assert!(rendered.contains("\n  meetingID: room-1\n"));
        assert!(rendered.contains("\n  participantCount: 7\n"));
        assert!(rendered.contains("\n  attendees:\n"));
        assert!(rendered.ends_with("  metadata:\n    bbb-origin: lms"));
    }

    #[test]
    fn human_renders_timestamps_as_utc() {
        let tree = Element::new("recording")
            .with_child(Element::new("startTime").with_text("1700000000000"))
            .with_child(Element::new("ENDTIME").with_text("0"))
            .with_child(Element::new("endTime").with_text("unknown"));
        let rendered = format_human(&tree);
        assert!(rendered.contains("  startTime: \"2023-11-14T22:13:20.000Z (1700000000000)\""));
        assert!(rendered.contains("  ENDTIME: \"1970-01-01T00:00:00.000Z (0)\""));
        assert!(rendered.contains("  endTime: unknown"));
    }

    #[test]
    fn compact_is_single_line() {
        let rendered = format_compact(&meeting());
        assert_eq!(
            rendered,
            "meeting(meetingName=\"Weekly sync\", meetingID=room-1, participantCount=7, \
running=true, attendees, metadata(bbb-origin=lms))"
        );
    }

    #[test]
    fn safe_str_escapes_only_when_needed() {
        assert_eq!(safe_str("plain"), "plain");
        assert_eq!(safe_str("a=b"), "\"a=b\"");
        assert_eq!(safe_str("it's"), "\"it's\"");
        assert_eq!(safe_str("line\nbreak"), "\"line\\nbreak\"");
        assert_eq!(safe_str("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn json_applies_coercion_rules() -> anyhow::Result<()> {
        let value = to_json(&meeting(), &COERCION_RULES)?;
        assert_eq!(
            value,
            json!({
                "meetingName": "Weekly sync",
                "meetingID": "room-1",
                "participantCount": 7,
                "running": true,
                "attendees": [],
                "metadata": {"bbb-origin": "lms"}
            })
        );
        let keys: Vec<&String> = value.as_object().expect("object").keys().collect();
        assert_eq!(
            keys,
            vec![
                "meetingName",
                "meetingID",
                "participantCount",
                "running",
                "attendees",
                "metadata"
            ]
        );
        Ok(())
    }

    #[test]
    fn json_list_fields_stay_arrays_when_singular() -> anyhow::Result<()> {
        let attendees = Element::new("attendees").with_child(
            Element::new("attendee").with_child(Element::new("fullName").with_text("Ada")),
        );
        let value = to_json(&attendees, &COERCION_RULES)?;
        assert_eq!(value, json!([{"fullName": "Ada"}]));
        Ok(())
    }

    #[test]
    fn json_empty_leaf_is_null_and_duplicates_last_win() -> anyhow::Result<()> {
        let tree = Element::new("response")
            .with_child(Element::new("messageKey"))
            .with_child(Element::new("note").with_text("first"))
            .with_child(Element::new("note").with_text("second"));
        let value = to_json(&tree, &COERCION_RULES)?;
        assert_eq!(value, json!({"messageKey": null, "note": "second"}));
        Ok(())
    }

    #[test]
    fn json_rejects_non_numeric_counts() {
        let leaf = Element::new("participantCount").with_text("many");
        let err = to_json(&leaf, &COERCION_RULES).expect_err("not a number");
        assert!(err.to_string().contains("participantCount"));
    }

    #[test]
    fn render_dispatches_on_format() -> CliResult<()> {
        let leaf = Element::new("returncode").with_text("SUCCESS");
        assert_eq!(render(&leaf, OutputFormat::Human)?, "returncode: SUCCESS");
        assert_eq!(render(&leaf, OutputFormat::Compact)?, "returncode=SUCCESS");
        assert_eq!(
            render(&leaf, OutputFormat::Xml)?,
            "<returncode>SUCCESS</returncode>"
        );
        assert_eq!(render(&leaf, OutputFormat::JsonLine)?, "\"SUCCESS\"");

        let tree = Element::new("r").with_child(Element::new("duration").with_text("5"));
        assert_eq!(render(&tree, OutputFormat::JsonLine)?, "{\"duration\":5}");
        assert_eq!(render(&tree, OutputFormat::Json)?, "{\n  \"duration\": 5\n}");
        Ok(())
    }
}
