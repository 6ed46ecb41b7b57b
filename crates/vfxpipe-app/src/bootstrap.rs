//! Service bootstrap: configuration, logging, engine, and listener wiring.

use std::net::SocketAddr;

use tracing::info;
use vfxpipe_api::ApiServer;
use vfxpipe_config::PipelineConfig;
use vfxpipe_fsops::{EngineSettings, FsOpsService};
use vfxpipe_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, Metrics};

use crate::error::{AppError, AppResult};

/// Build identifier stamped into logs and `/health`.
const BUILD_SHA: &str = match option_env!("VFXPIPE_BUILD_SHA") {
    Some(sha) => sha,
    None => env!("CARGO_PKG_VERSION"),
};

/// Load configuration from the process environment and serve until shutdown.
///
/// # Errors
///
/// Returns an error if configuration, logging, engine construction, or the
/// listener fails.
pub async fn run_app() -> AppResult<()> {
    let config =
        vfxpipe_config::load_from_env().map_err(|err| AppError::config("config.load", err))?;
    run_app_with(config).await
}

/// Boot sequence over an already loaded configuration.
pub(crate) async fn run_app_with(config: PipelineConfig) -> AppResult<()> {
    let logging = LoggingConfig {
        level: &config.log_level,
        format: LogFormat::from_setting(config.log_format_name()),
        build_sha: BUILD_SHA,
    };
    vfxpipe_telemetry::init_logging(&logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new("serve");

    let (server, addr) = assemble(&config)?;
    info!(
        template_root = %config.template_root.display(),
        project_root = %config.project_root.display(),
        %addr,
        "vfxpipe bootstrap complete"
    );
    server
        .serve(addr)
        .await
        .map_err(|err| AppError::api_server("api.serve", err))
}

/// Construct the metrics registry, the engine, and the API server.
pub(crate) fn assemble(config: &PipelineConfig) -> AppResult<(ApiServer, SocketAddr)> {
    let metrics = Metrics::new().map_err(|err| AppError::telemetry("metrics.init", err))?;
    let engine = FsOpsService::new(EngineSettings::from_config(config), metrics.clone())
        .map_err(|err| AppError::fsops("engine.init", err))?;
    Ok((ApiServer::new(engine, metrics), config.socket_addr()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use vfxpipe_config::ConfigLoader;
    use vfxpipe_test_support::PipelineTree;

    type TestResult<T> = anyhow::Result<T>;

    fn config_for(tree: &PipelineTree, extra: &[(&str, &str)]) -> TestResult<PipelineConfig> {
        let mut vars: HashMap<String, String> = HashMap::from([
            (
                "VFXPIPE_TEMPLATE_ROOT".to_string(),
                tree.template_root().display().to_string(),
            ),
            (
                "VFXPIPE_PROJECT_ROOT".to_string(),
                tree.project_root().display().to_string(),
            ),
        ]);
        for (name, value) in extra {
            vars.insert((*name).to_string(), (*value).to_string());
        }
        Ok(ConfigLoader::new(|name| vars.get(name).cloned()).load()?)
    }

    #[test]
    fn assemble_uses_configured_listener() -> TestResult<()> {
        let tree = PipelineTree::new()?;
        let config = config_for(&tree, &[("VFXPIPE_HTTP_PORT", "5123")])?;
        let (_server, addr) = assemble(&config)?;
        assert_eq!(addr.port(), 5123);
        assert!(addr.ip().is_loopback());
        Ok(())
    }

    #[test]
    fn assemble_rejects_zero_workers_from_a_hand_built_config() -> TestResult<()> {
        let tree = PipelineTree::new()?;
        let mut config = config_for(&tree, &[])?;
        config.copy_workers = 0;
        assert!(matches!(assemble(&config), Err(AppError::FsOps { .. })));
        Ok(())
    }
}
