//! Argument parsing and command dispatch.

use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliResult, parse_url};
use crate::commands::files::handle_files;
use crate::commands::ingest::handle_ingest;
use crate::commands::status::{handle_health, handle_ping};
use crate::commands::workspace::handle_workspace;

const DEFAULT_TIMEOUT_SECS: u64 = 600;
const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let trace_id = Uuid::new_v4().to_string();
    match dispatch(cli, &trace_id).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, trace_id: &str) -> CliResult<()> {
    let ctx = AppContext::new(cli.api_url, cli.timeout, trace_id)?;
    match cli.command {
        Command::Ping => handle_ping(&ctx, cli.output).await,
        Command::Health => handle_health(&ctx, cli.output).await,
        Command::Workspace(args) => handle_workspace(&ctx, args, cli.output).await,
        Command::Files(args) => handle_files(&ctx, args, cli.output).await,
        Command::Ingest(args) => handle_ingest(&ctx, args, cli.output).await,
    }
}

#[derive(Parser)]
#[command(name = "vfxpipe", about = "Client for the vfxpipe ingestion service")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "VFXPIPE_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(
        long,
        global = true,
        env = "VFXPIPE_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "Request timeout; sequence ingests can take minutes"
    )]
    pub(crate) timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Check that the server answers.
    Ping,
    /// Show build and copy counters.
    Health,
    /// Provision a versioned department workspace from its template.
    Workspace(WorkspaceArgs),
    /// List a folder with frame sequences compacted.
    Files(FilesArgs),
    /// Copy a delivered file or frame sequence into the project tree.
    Ingest(IngestArgs),
}

#[derive(Args)]
pub(crate) struct ShotArgs {
    #[arg(long)]
    pub(crate) project: String,
    #[arg(long)]
    pub(crate) sequence: String,
    #[arg(long)]
    pub(crate) shot: String,
    #[arg(long)]
    pub(crate) department: String,
    #[arg(long, env = "USER")]
    pub(crate) user: String,
}

#[derive(Args)]
pub(crate) struct WorkspaceArgs {
    #[command(flatten)]
    pub(crate) shot: ShotArgs,
}

#[derive(Args)]
pub(crate) struct FilesArgs {
    #[arg(long)]
    pub(crate) search_path: String,
    #[arg(long = "folder")]
    pub(crate) folder: String,
    #[arg(long)]
    pub(crate) extension: Option<String>,
}

#[derive(Args)]
pub(crate) struct IngestArgs {
    #[command(flatten)]
    pub(crate) shot: ShotArgs,
    #[arg(long = "type")]
    pub(crate) asset_type: String,
    #[arg(long)]
    pub(crate) src_path: String,
    #[arg(long)]
    pub(crate) extension: String,
    #[arg(long)]
    pub(crate) naming_scheme: String,
    #[arg(long, help = "Treat --src-path as a directory of frames")]
    pub(crate) sequence_mode: bool,
    #[arg(long, help = "Leave the version label out of output names")]
    pub(crate) no_versioning: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}
