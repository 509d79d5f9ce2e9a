//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `AppConfig`
//! - Pick the first existing file from a list of candidate locations
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("config.toml")).unwrap();
//! println!("Producer: {}", config.producer.publish_url());
//! ```

mod parser;
mod validator;

pub use contracts::AppConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default candidate locations, in priority order
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["/etc/albumstore/api.toml", "config.toml"];

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<AppConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<AppConfig, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Load from the first candidate that exists and is valid
    ///
    /// A candidate that exists but fails to load is logged and skipped, so an
    /// external override that is broken falls back to the bundled file.
    ///
    /// # Errors
    /// `ConfigParse` when no candidate could be loaded.
    pub fn load_first_existing<P: AsRef<Path>>(
        candidates: &[P],
    ) -> Result<(AppConfig, PathBuf), ContractError> {
        for candidate in candidates {
            let path = candidate.as_ref();
            if !path.exists() {
                continue;
            }
            match Self::load_from_path(path) {
                Ok(config) => {
                    info!(path = %path.display(), "Loaded configuration");
                    return Ok((config, path.to_path_buf()));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to load configuration, trying next");
                }
            }
        }

        let tried: Vec<String> = candidates
            .iter()
            .map(|p| p.as_ref().display().to_string())
            .collect();
        Err(ContractError::config_parse(format!(
            "no usable configuration file among: {}",
            tried.join(", ")
        )))
    }

    /// Serialize AppConfig to TOML string
    pub fn to_toml(config: &AppConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize AppConfig to JSON string
    pub fn to_json(config: &AppConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }

    /// Run validation rules on an already-built config (e.g. after CLI overrides)
    pub fn validate(config: &AppConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<AppConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
[producer]
host = "producer.local"
port = 9090

[server]
port = 8080
"#;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.producer.host, "producer.local");
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.producer.host, config2.producer.host);
        assert_eq!(config.retry.max_attempts, config2.retry.max_attempts);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.producer.publish_url(), config2.producer.publish_url());
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[producer]
host = "p"
max_connections = 10
max_connections_per_route = 50
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_connections"));
    }

    #[test]
    fn test_load_from_path_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "api.properties", "producer.host=p");
        let err = ConfigLoader::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn test_load_first_existing_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = write_file(dir.path(), "config.toml", MINIMAL_TOML);
        let missing = dir.path().join("etc-api.toml");

        let (config, used) = ConfigLoader::load_first_existing(&[&missing, &fallback]).unwrap();
        assert_eq!(used, fallback);
        assert_eq!(config.producer.host, "producer.local");
    }

    #[test]
    fn test_load_first_existing_skips_broken_override() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write_file(dir.path(), "override.toml", "[producer]\nhost = \"\"\n");
        let fallback = write_file(dir.path(), "config.toml", MINIMAL_TOML);

        let (_, used) = ConfigLoader::load_first_existing(&[&broken, &fallback]).unwrap();
        assert_eq!(used, fallback);
    }

    #[test]
    fn test_load_first_existing_none_usable() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ConfigLoader::load_first_existing(&[&missing]).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }
}
