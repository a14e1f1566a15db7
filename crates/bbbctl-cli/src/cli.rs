//! Command-line interface for administering a BigBlueButton server.

use std::io::{self, BufRead, Write};

use bbbctl_api::{ChecksumAlgorithm, TlsPolicy};
use bbbctl_config::{PropertiesLookup, resolve_credentials};
use bbbctl_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;

use crate::client::{AppContext, CliResult};
use crate::commands::meetings::{
    handle_meeting_chat, handle_meeting_create, handle_meeting_end, handle_meeting_info,
    handle_meeting_join, handle_meeting_list, handle_meeting_nuke,
};
use crate::commands::recordings::{
    handle_record_delete, handle_record_info, handle_record_list, handle_record_publish,
};
use crate::output::OutputFormat;

/// Sender name used for chat messages when `--name` is absent.
pub(crate) const DEFAULT_CHAT_USER: &str = "bbbctl";

/// Parses CLI arguments, executes the requested command, and reports errors.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { DEFAULT_LOG_LEVEL };
    if let Err(err) = init_logging(&LoggingConfig {
        level,
        format: cli.log_format.into(),
    }) {
        eprintln!("warning: {err:#}");
    }

    let command_name = command_label(&cli.command);
    let mut out = io::stdout().lock();
    let mut input = io::stdin().lock();

    match dispatch(cli, &mut out, &mut input).await {
        Ok(()) => {
            debug!(command = command_name, "command completed");
            0
        }
        Err(err) => {
            let _ = out.flush();
            debug!(command = command_name, "command failed");
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, out: &mut dyn Write, input: &mut dyn BufRead) -> CliResult<()> {
    let local = cli.local.then(PropertiesLookup::default);
    let credentials = resolve_credentials(
        cli.server.as_deref(),
        cli.secret.as_deref(),
        local.as_ref(),
    )?;
    let tls = if cli.insecure {
        TlsPolicy::SkipVerification
    } else {
        TlsPolicy::Verify
    };
    let ctx = AppContext::new(&credentials, tls, cli.checksum, cli.format)?;

    match cli.command {
        Command::Record(record) => match record {
            RecordCommand::List(args) => handle_record_list(&ctx, args, out).await,
            RecordCommand::Info(args) => handle_record_info(&ctx, args, out).await,
            RecordCommand::Publish(args) => handle_record_publish(&ctx, args, true, out).await,
            RecordCommand::Unpublish(args) => handle_record_publish(&ctx, args, false, out).await,
            RecordCommand::Delete(args) => handle_record_delete(&ctx, args, out).await,
        },
        Command::Meeting(meeting) => match meeting {
            MeetingCommand::List(args) => handle_meeting_list(&ctx, args, out).await,
            MeetingCommand::Info(args) => handle_meeting_info(&ctx, args, out).await,
            MeetingCommand::Create(args) => handle_meeting_create(&ctx, args, out).await,
            MeetingCommand::Join(args) => handle_meeting_join(&ctx, args, out).await,
            MeetingCommand::End(args) => handle_meeting_end(&ctx, args, out).await,
            MeetingCommand::Chat(args) => handle_meeting_chat(&ctx, args, out).await,
            MeetingCommand::Nuke(args) => handle_meeting_nuke(&ctx, args, out, input).await,
        },
    }
}

#[derive(Parser)]
#[command(
    name = "bbbctl",
    version,
    about = "Administrative CLI for BigBlueButton servers"
)]
struct Cli {
    /// Server URL or host name.
    #[arg(long, global = true, env = "BBBCTL_SERVER")]
    server: Option<String>,
    /// Shared API secret.
    #[arg(long, global = true, env = "BBBCTL_SECRET", hide_env_values = true)]
    secret: Option<String>,
    /// Read missing server and secret values from the local bbb-web properties.
    #[arg(long, global = true)]
    local: bool,
    /// Skip TLS certificate verification.
    #[arg(long, global = true)]
    insecure: bool,
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Human,
        help = "Select output format for rendered responses"
    )]
    format: OutputFormat,
    /// Digest used to sign requests.
    #[arg(long, global = true, env = "BBBCTL_CHECKSUM", default_value = "sha1")]
    checksum: ChecksumAlgorithm,
    /// Format of diagnostic logs written to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Pretty)]
    log_format: LogFormatArg,
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Manage recordings.
    #[command(subcommand, visible_alias = "r")]
    Record(RecordCommand),
    /// Manage meetings.
    #[command(subcommand, visible_alias = "m")]
    Meeting(MeetingCommand),
}

#[derive(Subcommand)]
enum RecordCommand {
    /// List recordings.
    List(RecordListArgs),
    /// Show one recording.
    Info(RecordIdArgs),
    /// Publish a recording.
    Publish(RecordIdArgs),
    /// Unpublish a recording.
    Unpublish(RecordIdArgs),
    /// Delete a recording.
    Delete(RecordIdArgs),
}

#[derive(Subcommand)]
enum MeetingCommand {
    /// List running meetings.
    List(MeetingListArgs),
    /// Show meeting details.
    Info(MeetingIdArgs),
    /// Create a meeting.
    Create(MeetingCreateArgs),
    /// Generate a join link for a meeting.
    Join(MeetingJoinArgs),
    /// End a meeting.
    End(MeetingIdArgs),
    /// Post a chat message into a meeting, or every meeting with BROADCAST.
    Chat(MeetingChatArgs),
    /// End all running meetings.
    Nuke(MeetingNukeArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct RecordListArgs {
    /// Filter by external meeting ID.
    #[arg(long)]
    pub(crate) meeting: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct RecordIdArgs {
    /// Recording ID.
    pub(crate) id: String,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct MeetingListArgs {
    /// Sort by a numeric field of each meeting.
    #[arg(long, value_name = "FIELD")]
    pub(crate) sort: Option<String>,
    /// Do not show participants.
    #[arg(long)]
    pub(crate) no_user: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct MeetingIdArgs {
    /// Meeting ID.
    pub(crate) id: String,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct MeetingCreateArgs {
    /// Meeting ID.
    pub(crate) id: String,
    /// Meeting name.
    pub(crate) name: String,
    /// Allow recording.
    #[arg(long)]
    pub(crate) record: bool,
    /// Print a moderator join link for this user. Can be repeated.
    #[arg(long = "mod", value_name = "NAME")]
    pub(crate) moderators: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct MeetingJoinArgs {
    /// Meeting ID.
    pub(crate) id: String,
    /// Display name.
    pub(crate) name: String,
    /// Join as moderator (default: viewer).
    #[arg(long = "mod")]
    pub(crate) moderator: bool,
    /// Open the link in a web browser instead of printing it.
    #[arg(long)]
    pub(crate) open: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct MeetingChatArgs {
    /// Meeting ID, or BROADCAST for every running meeting.
    pub(crate) id: String,
    /// Message text.
    pub(crate) message: String,
    /// Sender name shown in the chat.
    #[arg(long = "name", default_value = DEFAULT_CHAT_USER)]
    pub(crate) user_name: String,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct MeetingNukeArgs {
    /// Really end all meetings (default: dry run).
    #[arg(long)]
    pub(crate) doit: bool,
    /// Ask before ending each meeting.
    #[arg(long, requires = "doit")]
    pub(crate) ask: bool,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Record(record) => match record {
            RecordCommand::List(_) => "record_list",
            RecordCommand::Info(_) => "record_info",
            RecordCommand::Publish(_) => "record_publish",
            RecordCommand::Unpublish(_) => "record_unpublish",
            RecordCommand::Delete(_) => "record_delete",
        },
        Command::Meeting(meeting) => match meeting {
            MeetingCommand::List(_) => "meeting_list",
            MeetingCommand::Info(_) => "meeting_info",
            MeetingCommand::Create(_) => "meeting_create",
            MeetingCommand::Join(_) => "meeting_join",
            MeetingCommand::End(_) => "meeting_end",
            MeetingCommand::Chat(_) => "meeting_chat",
            MeetingCommand::Nuke(_) => "meeting_nuke",
        },
    }
}
