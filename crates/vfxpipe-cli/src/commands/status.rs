use vfxpipe_api_models::{HealthResponse, PingResponse};

use crate::cli::OutputFormat;
use crate::client::{AppContext, CliResult};
use crate::output::{print_json, render_health};

pub(crate) async fn handle_ping(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let pong: PingResponse = ctx.get_json("/ping").await?;
    match format {
        OutputFormat::Json => print_json(&pong),
        OutputFormat::Table => {
            println!("{}", pong.message);
            Ok(())
        }
    }
}

pub(crate) async fn handle_health(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let health: HealthResponse = ctx.get_json("/health").await?;
    render_health(&health, format)
}
