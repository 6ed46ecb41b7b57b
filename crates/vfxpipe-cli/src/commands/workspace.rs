use anyhow::anyhow;
use vfxpipe_api_models::{CreateWorkspaceRequest, CreateWorkspaceResponse};

use crate::cli::{OutputFormat, WorkspaceArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::rejected_fields;
use crate::output::render_workspace;

pub(crate) async fn handle_workspace(
    ctx: &AppContext,
    args: WorkspaceArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let request = CreateWorkspaceRequest {
        project: args.shot.project,
        sequence: args.shot.sequence,
        shot: args.shot.shot,
        department: args.shot.department,
        user: args.shot.user,
    };
    request
        .validate()
        .map_err(|params| CliError::validation(rejected_fields(&params)))?;

    let response: CreateWorkspaceResponse = ctx.post_json("/create_workspace", &request).await?;
    render_workspace(&response, format)?;
    if response.result {
        Ok(())
    } else {
        Err(CliError::failure(anyhow!("workspace was not provisioned")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::cli::ShotArgs;
    use crate::commands::test_support::context;

    fn args(shot: &str) -> WorkspaceArgs {
        WorkspaceArgs {
            shot: ShotArgs {
                project: "PROJ_ABC".to_string(),
                sequence: "Seq2".to_string(),
                shot: shot.to_string(),
                department: "comp".to_string(),
                user: "Alice".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn workspace_posts_request_fields() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/create_workspace").json_body(json!({
                "project": "PROJ_ABC",
                "sequence": "Seq2",
                "shot": "Shot1",
                "department": "comp",
                "user": "Alice"
            }));
            then.status(200).json_body(json!({
                "result": true,
                "destination": "/projects/PROJ_ABC/Seq2/Shot1/comp/v0001/comp",
                "template_used": "/templates/Templates/comp",
                "error": null
            }));
        });

        handle_workspace(&context(&server)?, args("Shot1"), OutputFormat::Table)
            .await
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn failed_result_exits_as_failure() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/create_workspace");
            then.status(200).json_body(json!({
                "result": false,
                "destination": "",
                "template_used": "/templates/Templates/comp",
                "error": "template path not found: /templates/Templates/comp"
            }));
        });

        let outcome = handle_workspace(&context(&server)?, args("Shot1"), OutputFormat::Json).await;
        assert!(matches!(outcome, Err(CliError::Failure(_))));
        Ok(())
    }

    #[tokio::test]
    async fn empty_fields_never_reach_the_server() -> Result<()> {
        let server = MockServer::start_async().await;
        let outcome = handle_workspace(&context(&server)?, args(" "), OutputFormat::Table).await;
        let Err(CliError::Validation(message)) = outcome else {
            anyhow::bail!("expected a validation error");
        };
        assert!(message.contains("shot"));
        Ok(())
    }
}
