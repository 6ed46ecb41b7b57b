use vfxpipe_api_models::{FilesFoldersRequest, FilesFoldersResponse};

use crate::cli::{FilesArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::rejected_fields;
use crate::output::render_listing;

pub(crate) async fn handle_files(
    ctx: &AppContext,
    args: FilesArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let request = FilesFoldersRequest {
        search_path: args.search_path,
        folders_to_search: args.folder,
        extension: args.extension,
    };
    request
        .validate()
        .map_err(|params| CliError::validation(rejected_fields(&params)))?;

    let listing: FilesFoldersResponse = ctx.post_json("/get_files_folders", &request).await?;
    render_listing(&listing, format)
}
