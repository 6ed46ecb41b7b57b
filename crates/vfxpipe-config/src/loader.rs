//! Layered configuration loading.
//!
//! # Design
//! - Sources apply in order: built-in defaults, an optional JSON file, then
//!   environment overrides. Validation runs once on the merged result.
//! - Variable lookup is injected so tests never touch the process environment.
//! - Empty variables are treated as unset.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::defaults::{
    ENV_BIND_ADDR, ENV_CONFIG_FILE, ENV_COPY_WORKERS, ENV_HTTP_PORT, ENV_LOG_FORMAT,
    ENV_LOG_LEVEL, ENV_PROJECT_ROOT, ENV_TEMPLATE_ROOT, ENV_VERSION_RETRIES,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::PipelineConfig;
use crate::validate::{parse_bind_addr, parse_log_format, parse_port, parse_positive, validate};

/// Loads [`PipelineConfig`] from a file and a variable source.
pub struct ConfigLoader<F> {
    lookup: F,
}

impl<F> ConfigLoader<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Build a loader that resolves variables through `lookup`.
    pub const fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// Merge every source and validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be read or parsed,
    /// when an override is malformed, or when the merged result is invalid.
    pub fn load(&self) -> ConfigResult<PipelineConfig> {
        let mut config = match self.var(ENV_CONFIG_FILE) {
            Some(path) => read_file(Path::new(&path))?,
            None => PipelineConfig::default(),
        };
        self.apply_overrides(&mut config)?;
        validate(&config)?;
        info!(
            template_root = %config.template_root.display(),
            project_root = %config.project_root.display(),
            listen = %config.socket_addr(),
            "configuration loaded"
        );
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut PipelineConfig) -> ConfigResult<()> {
        if let Some(value) = self.var(ENV_TEMPLATE_ROOT) {
            config.template_root = PathBuf::from(value);
        }
        if let Some(value) = self.var(ENV_PROJECT_ROOT) {
            config.project_root = PathBuf::from(value);
        }
        if let Some(value) = self.var(ENV_BIND_ADDR) {
            config.bind_addr = parse_bind_addr(&value)?;
        }
        if let Some(value) = self.var(ENV_HTTP_PORT) {
            config.http_port = parse_port(&value, "http_port")?;
        }
        if let Some(value) = self.var(ENV_LOG_LEVEL) {
            config.log_level = value;
        }
        if let Some(value) = self.var(ENV_LOG_FORMAT) {
            config.log_format = Some(parse_log_format(&value)?);
        }
        if let Some(value) = self.var(ENV_VERSION_RETRIES) {
            config.version_retry_limit = parse_positive(&value, "version_retry_limit")?;
        }
        if let Some(value) = self.var(ENV_COPY_WORKERS) {
            config.copy_workers = parse_positive(&value, "copy_workers")?;
        }
        Ok(())
    }

    fn var(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }
}

/// Load configuration from the process environment.
///
/// # Errors
///
/// See [`ConfigLoader::load`].
pub fn load_from_env() -> ConfigResult<PipelineConfig> {
    ConfigLoader::new(|name: &str| std::env::var(name).ok()).load()
}

fn read_file(path: &Path) -> ConfigResult<PipelineConfig> {
    debug!(path = %path.display(), "reading configuration file");
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "config.read_file",
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}
