//! Default values and environment variable names.

/// Address the HTTP listener binds to when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Port the HTTP listener binds to when none is configured.
pub const DEFAULT_HTTP_PORT: u16 = 5000;
/// Log level used when neither the file nor the environment sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Attempts made to reserve a version directory before giving up.
pub const DEFAULT_VERSION_RETRY_LIMIT: u32 = 5;
/// Concurrent copy workers used for sequence ingestion.
pub const DEFAULT_COPY_WORKERS: usize = 4;

/// Path to an optional JSON configuration file.
pub const ENV_CONFIG_FILE: &str = "VFXPIPE_CONFIG_FILE";
/// Root holding `Templates/{department}` trees.
pub const ENV_TEMPLATE_ROOT: &str = "VFXPIPE_TEMPLATE_ROOT";
/// Root under which projects are provisioned and ingested.
pub const ENV_PROJECT_ROOT: &str = "VFXPIPE_PROJECT_ROOT";
/// Listener address override.
pub const ENV_BIND_ADDR: &str = "VFXPIPE_BIND_ADDR";
/// Listener port override.
pub const ENV_HTTP_PORT: &str = "VFXPIPE_HTTP_PORT";
/// Log level override.
pub const ENV_LOG_LEVEL: &str = "VFXPIPE_LOG_LEVEL";
/// Log format override (`json` or `pretty`).
pub const ENV_LOG_FORMAT: &str = "VFXPIPE_LOG_FORMAT";
/// Version reservation retry limit override.
pub const ENV_VERSION_RETRIES: &str = "VFXPIPE_VERSION_RETRIES";
/// Copy worker count override.
pub const ENV_COPY_WORKERS: &str = "VFXPIPE_COPY_WORKERS";
