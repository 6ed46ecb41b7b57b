//! Parsing and validation helpers for configuration values.

use std::net::IpAddr;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{LogFormatSetting, PipelineConfig};

/// Parse a listener port, rejecting zero and anything outside `u16`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an integer in `1..=65535`.
pub fn parse_port(value: &str, field: &'static str) -> ConfigResult<u16> {
    let port = value
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::invalid(field, value, "not_an_integer"))?;
    if !(1..=65_535).contains(&port) {
        return Err(ConfigError::invalid(field, value, "out_of_range"));
    }
    u16::try_from(port).map_err(|_| ConfigError::invalid(field, value, "out_of_range"))
}

/// Parse a bind address, tolerating a trailing CIDR suffix such as `/32`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the host part is not an IP address.
pub fn parse_bind_addr(value: &str) -> ConfigResult<IpAddr> {
    let host = value.split('/').next().unwrap_or_default().trim();
    host.parse::<IpAddr>()
        .map_err(|_| ConfigError::invalid("bind_addr", value, "not_an_ip_address"))
}

/// Parse a strictly positive count such as the retry limit or worker count.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for non-numeric or zero values.
pub fn parse_positive<T>(value: &str, field: &'static str) -> ConfigResult<T>
where
    T: std::str::FromStr + PartialEq + From<u8>,
{
    let parsed = value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::invalid(field, value, "not_an_integer"))?;
    if parsed == T::from(0) {
        return Err(ConfigError::invalid(field, value, "must_be_positive"));
    }
    Ok(parsed)
}

/// Parse a log format name.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for anything other than `json` or `pretty`.
pub fn parse_log_format(value: &str) -> ConfigResult<LogFormatSetting> {
    match value.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(LogFormatSetting::Json),
        "pretty" => Ok(LogFormatSetting::Pretty),
        _ => Err(ConfigError::invalid("log_format", value, "unknown_format")),
    }
}

/// Check the fully merged configuration before it is handed to the service.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] when a root is unset and
/// [`ConfigError::InvalidField`] for out-of-range tunables.
pub fn validate(config: &PipelineConfig) -> ConfigResult<()> {
    require_root(&config.template_root, "template_root")?;
    require_root(&config.project_root, "project_root")?;
    if config.http_port == 0 {
        return Err(ConfigError::invalid("http_port", "0", "out_of_range"));
    }
    if config.version_retry_limit == 0 {
        return Err(ConfigError::invalid(
            "version_retry_limit",
            "0",
            "must_be_positive",
        ));
    }
    if config.copy_workers == 0 {
        return Err(ConfigError::invalid("copy_workers", "0", "must_be_positive"));
    }
    if config.log_level.trim().is_empty() {
        return Err(ConfigError::MissingField { field: "log_level" });
    }
    Ok(())
}

fn require_root(path: &Path, field: &'static str) -> ConfigResult<()> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::MissingField { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn configured() -> PipelineConfig {
        PipelineConfig {
            template_root: PathBuf::from("/mnt/templates"),
            project_root: PathBuf::from("/mnt/projects"),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn parse_port_accepts_valid_range() -> ConfigResult<()> {
        assert_eq!(parse_port("8080", "http_port")?, 8080);
        assert_eq!(parse_port(" 1 ", "http_port")?, 1);
        Ok(())
    }

    #[test]
    fn parse_port_rejects_out_of_range_and_non_numeric() {
        assert!(matches!(
            parse_port("0", "http_port"),
            Err(ConfigError::InvalidField {
                reason: "out_of_range",
                ..
            })
        ));
        assert!(matches!(
            parse_port("70000", "http_port"),
            Err(ConfigError::InvalidField {
                reason: "out_of_range",
                ..
            })
        ));
        assert!(matches!(
            parse_port("not-a-port", "http_port"),
            Err(ConfigError::InvalidField {
                reason: "not_an_integer",
                ..
            })
        ));
    }

    #[test]
    fn parse_bind_addr_strips_prefix_length() -> ConfigResult<()> {
        assert_eq!(parse_bind_addr("0.0.0.0/0")?.to_string(), "0.0.0.0");
        assert_eq!(parse_bind_addr("::1")?.to_string(), "::1");
        assert!(parse_bind_addr("localhost").is_err());
        Ok(())
    }

    #[test]
    fn parse_positive_rejects_zero() {
        assert!(matches!(parse_positive::<u32>("3", "version_retry_limit"), Ok(3)));
        assert!(parse_positive::<usize>("0", "copy_workers").is_err());
        assert!(parse_positive::<usize>("-2", "copy_workers").is_err());
    }

    #[test]
    fn parse_log_format_is_case_insensitive() -> ConfigResult<()> {
        assert_eq!(parse_log_format("JSON")?, LogFormatSetting::Json);
        assert_eq!(parse_log_format("pretty")?, LogFormatSetting::Pretty);
        assert!(parse_log_format("xml").is_err());
        Ok(())
    }

    #[test]
    fn validate_requires_both_roots() {
        let mut config = configured();
        assert!(validate(&config).is_ok());

        config.project_root = PathBuf::new();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::MissingField {
                field: "project_root"
            })
        ));

        assert!(matches!(
            validate(&PipelineConfig::default()),
            Err(ConfigError::MissingField {
                field: "template_root"
            })
        ));
    }

    #[test]
    fn validate_rejects_zero_tunables() {
        let config = PipelineConfig {
            copy_workers: 0,
            ..configured()
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidField {
                field: "copy_workers",
                ..
            })
        ));

        let config = PipelineConfig {
            version_retry_limit: 0,
            ..configured()
        };
        assert!(validate(&config).is_err());
    }
}
