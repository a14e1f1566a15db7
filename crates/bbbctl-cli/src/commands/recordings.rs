use std::io::Write;

use bbbctl_api::QueryParams;

use crate::cli::{RecordIdArgs, RecordListArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render, write_line};

/// Print every recording in server order, optionally filtered by meeting ID.
pub(crate) async fn handle_record_list(
    ctx: &AppContext,
    args: RecordListArgs,
    out: &mut dyn Write,
) -> CliResult<()> {
    let params = QueryParams::new().with_opt("meetingID", args.meeting);
    let recordings = ctx.api.get_recordings(&params).await?;
    for recording in &recordings {
        write_line(out, &render(recording, ctx.format)?)?;
    }
    Ok(())
}

pub(crate) async fn handle_record_info(
    ctx: &AppContext,
    args: RecordIdArgs,
    out: &mut dyn Write,
) -> CliResult<()> {
    let params = QueryParams::new().with("recordID", args.id.as_str());
    let recordings = ctx.api.get_recordings(&params).await?;
    let recording = recordings
        .first()
        .ok_or_else(|| CliError::validation(format!("recording '{}' not found", args.id)))?;
    write_line(out, &render(recording, ctx.format)?)
}

pub(crate) async fn handle_record_publish(
    ctx: &AppContext,
    args: RecordIdArgs,
    publish: bool,
    out: &mut dyn Write,
) -> CliResult<()> {
    let response = ctx.api.publish_recordings(&args.id, publish).await?;
    write_line(out, &render(&response, ctx.format)?)
}

pub(crate) async fn handle_record_delete(
    ctx: &AppContext,
    args: RecordIdArgs,
    out: &mut dyn Write,
) -> CliResult<()> {
    let response = ctx.api.delete_recordings(&args.id).await?;
    write_line(out, &render(&response, ctx.format)?)
}
