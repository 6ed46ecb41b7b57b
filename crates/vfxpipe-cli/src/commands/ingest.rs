use anyhow::anyhow;
use vfxpipe_api_models::{IngestRequest, IngestResponse};

use crate::cli::{IngestArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::rejected_fields;
use crate::output::render_ingest;

impl From<IngestArgs> for IngestRequest {
    fn from(args: IngestArgs) -> Self {
        Self {
            project: args.shot.project,
            sequence: args.shot.sequence,
            shot: args.shot.shot,
            department: args.shot.department,
            asset_type: args.asset_type,
            is_sequence: args.sequence_mode,
            src_path: args.src_path,
            extension: args.extension,
            naming_scheme: args.naming_scheme,
            versioning: !args.no_versioning,
            user: args.shot.user,
        }
    }
}

pub(crate) async fn handle_ingest(
    ctx: &AppContext,
    args: IngestArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let request = IngestRequest::from(args);
    request
        .validate()
        .map_err(|params| CliError::validation(rejected_fields(&params)))?;

    let response: IngestResponse = ctx.post_json("/ingest_request", &request).await?;
    render_ingest(&response, format)?;
    if response.result {
        Ok(())
    } else {
        Err(CliError::failure(anyhow!(
            "ingest of {} did not complete",
            response.source_path
        )))
    }
}
