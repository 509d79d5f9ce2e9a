//! Command implementations.

mod info;
mod send;
mod serve;
mod validate;

pub use info::run_info;
pub use send::run_send;
pub use serve::run_serve;
pub use validate::run_validate;

use std::path::PathBuf;

use config_loader::{AppConfig, ConfigLoader, DEFAULT_CONFIG_PATHS};
use tracing::{info, warn};

use crate::cli::ConfigArgs;
use crate::error::CliError;

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file found; built from defaults plus `--producer-host`
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => write!(f, "<defaults>"),
        }
    }
}

/// Load configuration, apply CLI overrides, re-validate
///
/// An explicit `--config` must load. Without it the default locations are
/// tried in order; if none exists, `--producer-host` alone is enough to run
/// on defaults.
pub fn load_config(args: &ConfigArgs) -> Result<(AppConfig, ConfigSource), CliError> {
    let (mut config, source) = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            let config = ConfigLoader::load_from_path(path)
                .map_err(|e| CliError::config_not_found(format!("{}: {e}", path.display())))?;
            (config, ConfigSource::File(path.clone()))
        }
        None => match ConfigLoader::load_first_existing(DEFAULT_CONFIG_PATHS) {
            Ok((config, path)) => (config, ConfigSource::File(path)),
            Err(e) => match &args.producer_host {
                Some(host) => {
                    warn!(error = %e, "No configuration file found, using defaults");
                    (AppConfig::with_producer_host(host.clone()), ConfigSource::Defaults)
                }
                None => return Err(CliError::config_not_found(e.to_string())),
            },
        },
    };

    apply_overrides(&mut config, args);
    ConfigLoader::validate(&config).map_err(|e| CliError::config_validation(e.to_string()))?;

    Ok((config, source))
}

fn apply_overrides(config: &mut AppConfig, args: &ConfigArgs) {
    if let Some(ref host) = args.producer_host {
        info!(host = %host, "Overriding producer host from CLI");
        config.producer.host = host.clone();
    }
    if let Some(port) = args.producer_port {
        info!(port = %port, "Overriding producer port from CLI");
        config.producer.port = port;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CONFIG: &str = r#"
[producer]
host = "producer.local"
port = 9090

[retry]
max_attempts = 5
"#;

    fn args(config: Option<PathBuf>) -> ConfigArgs {
        ConfigArgs {
            config,
            producer_host: None,
            producer_port: None,
        }
    }

    fn write_config(dir: &std::path::Path, content: &str) -> PathBuf {
        let path = dir.join("api.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_explicit_config_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), CONFIG);
        let mut args = args(Some(path.clone()));
        args.producer_host = Some("10.1.1.1".to_string());
        args.producer_port = Some(7000);

        let (config, source) = load_config(&args).unwrap();

        assert_eq!(source, ConfigSource::File(path));
        assert_eq!(config.producer.publish_url(), "http://10.1.1.1:7000/publish");
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&args(Some(dir.path().join("nope.toml")))).unwrap_err();
        assert!(matches!(err, CliError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_override_is_revalidated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), CONFIG);
        let mut args = args(Some(path));
        args.producer_port = Some(0);

        let err = load_config(&args).unwrap_err();
        assert!(matches!(err, CliError::ConfigValidation { .. }));
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Defaults.to_string(), "<defaults>");
        assert_eq!(
            ConfigSource::File(PathBuf::from("/etc/albumstore/api.toml")).to_string(),
            "/etc/albumstore/api.toml"
        );
    }
}
