use std::io::{BufRead, Write};

use anyhow::anyhow;
use bbbctl_api::{Element, QueryParams};
use tracing::{info, warn};

use crate::cli::{
    MeetingChatArgs, MeetingCreateArgs, MeetingIdArgs, MeetingJoinArgs, MeetingListArgs,
    MeetingNukeArgs,
};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{quote, render, write_line};

/// Meeting ID that fans a chat message out to every running meeting.
pub(crate) const BROADCAST: &str = "BROADCAST";

const ROLE_MODERATOR: &str = "MODERATOR";
const ROLE_VIEWER: &str = "VIEWER";
const NUKE_PROMPT: &str = "End this meeting? [y]es/[n]o/[a]ll: ";

pub(crate) async fn handle_meeting_list(
    ctx: &AppContext,
    args: MeetingListArgs,
    out: &mut dyn Write,
) -> CliResult<()> {
    let mut meetings = ctx.api.get_meetings().await?;
    if let Some(field) = args.sort.as_deref() {
        meetings = sort_by_field(meetings, field)?;
    }
    if args.no_user {
        for meeting in &mut meetings {
            meeting.remove_children("attendees");
        }
    }
    for meeting in &meetings {
        write_line(out, &render(meeting, ctx.format)?)?;
    }
    Ok(())
}

/// Stable ascending sort on the integer value of `field`.
///
/// Every meeting must carry the field with integer text.
pub(crate) fn sort_by_field(meetings: Vec<Element>, field: &str) -> CliResult<Vec<Element>> {
    let mut keyed = meetings
        .into_iter()
        .map(|meeting| sort_key(&meeting, field).map(|key| (key, meeting)))
        .collect::<CliResult<Vec<_>>>()?;
    keyed.sort_by_key(|(key, _)| *key);
    Ok(keyed.into_iter().map(|(_, meeting)| meeting).collect())
}

fn sort_key(meeting: &Element, field: &str) -> CliResult<i64> {
    let id = meeting.child_value("meetingID").unwrap_or("<unknown>");
    let raw = meeting.child_value(field).ok_or_else(|| {
        CliError::validation(format!("cannot sort by '{field}': meeting {id} has no such field"))
    })?;
    raw.parse::<i64>().map_err(|_| {
        CliError::validation(format!(
            "cannot sort by '{field}': meeting {id} has non-integer value '{raw}'"
        ))
    })
}

pub(crate) async fn handle_meeting_info(
    ctx: &AppContext,
    args: MeetingIdArgs,
    out: &mut dyn Write,
) -> CliResult<()> {
    let meeting = ctx.api.get_meeting_info(&args.id).await?;
    write_line(out, &render(&meeting, ctx.format)?)
}

/// Create a meeting, then print a moderator join link per `--mod` name.
pub(crate) async fn handle_meeting_create(
    ctx: &AppContext,
    args: MeetingCreateArgs,
    out: &mut dyn Write,
) -> CliResult<()> {
    let params = QueryParams::new()
        .with("meetingID", args.id.as_str())
        .with("name", args.name.as_str())
        .with("record", if args.record { "true" } else { "false" });
    let created = ctx.api.create_meeting(&params).await?;
    write_line(out, &render(&created, ctx.format)?)?;

    if args.moderators.is_empty() {
        return Ok(());
    }
    write_line(out, "")?;
    let create_time = created.child_value("createTime");
    for name in &args.moderators {
        let link = join_link(ctx, &args.id, name, ROLE_MODERATOR, create_time);
        write_line(out, &format!("{name}: {link}"))?;
    }
    Ok(())
}

pub(crate) async fn handle_meeting_join(
    ctx: &AppContext,
    args: MeetingJoinArgs,
    out: &mut dyn Write,
) -> CliResult<()> {
    let meeting = ctx.api.get_meeting_info(&args.id).await?;
    let role = if args.moderator {
        ROLE_MODERATOR
    } else {
        ROLE_VIEWER
    };
    let link = join_link(
        ctx,
        &args.id,
        &args.name,
        role,
        meeting.child_value("createTime"),
    );

    if args.open {
        info!(meeting_id = %args.id, role, "opening join link in browser");
        webbrowser::open(&link)
            .map_err(|err| CliError::failure(anyhow!("failed to open web browser: {err}")))
    } else {
        write_line(out, &link)
    }
}

fn join_link(
    ctx: &AppContext,
    meeting_id: &str,
    full_name: &str,
    role: &str,
    create_time: Option<&str>,
) -> String {
    let params = QueryParams::new()
        .with("meetingID", meeting_id)
        .with("fullName", full_name)
        .with("role", role)
        .with_opt("createTime", create_time);
    ctx.api.join_link(&params)
}

/// End a meeting using the moderator password from its current info.
pub(crate) async fn handle_meeting_end(
    ctx: &AppContext,
    args: MeetingIdArgs,
    out: &mut dyn Write,
) -> CliResult<()> {
    let meeting = ctx.api.get_meeting_info(&args.id).await?;
    let response = ctx
        .api
        .end(&args.id, meeting.child_value("moderatorPW"))
        .await?;
    write_line(out, &render(&response, ctx.format)?)
}

pub(crate) async fn handle_meeting_chat(
    ctx: &AppContext,
    args: MeetingChatArgs,
    out: &mut dyn Write,
) -> CliResult<()> {
    if args.id != BROADCAST {
        let response = ctx
            .api
            .send_chat_message(&args.id, &args.message, Some(&args.user_name))
            .await?;
        return write_line(out, &render(&response, ctx.format)?);
    }

    let meetings = ctx.api.get_meetings().await?;
    let mut failed = Vec::new();
    for meeting in &meetings {
        let Some(meeting_id) = meeting.child_value("meetingID") else {
            warn!(
                name = meeting.child_value("meetingName").unwrap_or_default(),
                "skipping meeting without meetingID"
            );
            continue;
        };
        match ctx
            .api
            .send_chat_message(meeting_id, &args.message, Some(&args.user_name))
            .await
        {
            Ok(response) => write_line(out, &render(&response, ctx.format)?)?,
            Err(err) => {
                warn!(meeting_id, error = %err, "chat message not delivered");
                failed.push(meeting_id.to_string());
            }
        }
    }
    fan_out_result("chat message", meetings.len(), &failed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Yes,
    No,
    All,
}

/// Preview every running meeting and, with `--doit`, end them one by one.
pub(crate) async fn handle_meeting_nuke(
    ctx: &AppContext,
    args: MeetingNukeArgs,
    out: &mut dyn Write,
    input: &mut dyn BufRead,
) -> CliResult<()> {
    let meetings = ctx.api.get_meetings().await?;
    let mut ask = args.ask;
    let mut failed = Vec::new();

    for meeting in &meetings {
        let meeting_id = meeting.child_value("meetingID").unwrap_or_default();
        write_line(out, &preview_line(meeting, args.doit))?;
        if !args.doit {
            continue;
        }
        if ask {
            match prompt(out, input)? {
                Answer::Yes => {}
                Answer::No => continue,
                Answer::All => ask = false,
            }
        }
        if let Err(err) = ctx
            .api
            .end(meeting_id, meeting.child_value("moderatorPW"))
            .await
        {
            warn!(meeting_id, error = %err, "failed to end meeting");
            failed.push(meeting_id.to_string());
        }
    }
    fan_out_result("end", meetings.len(), &failed)
}

fn preview_line(meeting: &Element, doit: bool) -> String {
    format!(
        "{}id={} user={} name={}",
        if doit { "" } else { "(dry run) " },
        meeting.child_value("meetingID").unwrap_or_default(),
        meeting.child_value("participantCount").unwrap_or("0"),
        quote(meeting.child_value("meetingName").unwrap_or_default()),
    )
}

fn prompt(out: &mut dyn Write, input: &mut dyn BufRead) -> CliResult<Answer> {
    loop {
        write!(out, "{NUKE_PROMPT}")
            .and_then(|()| out.flush())
            .map_err(|err| CliError::failure(anyhow!("failed to write prompt: {err}")))?;
        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|err| CliError::failure(anyhow!("failed to read answer: {err}")))?;
        if read == 0 {
            return Err(CliError::validation("aborted: no answer on standard input"));
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(Answer::Yes),
            "n" | "no" => return Ok(Answer::No),
            "a" | "all" => return Ok(Answer::All),
            _ => {}
        }
    }
}

fn fan_out_result(action: &str, total: usize, failed: &[String]) -> CliResult<()> {
    if failed.is_empty() {
        return Ok(());
    }
    Err(CliError::failure(anyhow!(
        "{action} failed for {} of {total} meetings: {}",
        failed.len(),
        failed.join(", ")
    )))
}
