//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{AppConfig, ContractError};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<AppConfig, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<AppConfig, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<AppConfig, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
[producer]
host = "producer.internal"
port = 9191
connect_timeout_ms = 1000
socket_timeout_ms = 2000
max_connections = 64
max_connections_per_route = 16

[retry]
max_attempts = 5
base_delay_ms = 50

[stats]
interval_ms = 1000
shutdown_grace_ms = 500

[server]
host = "127.0.0.1"
port = 8081
request_timeout_ms = 3000
max_image_bytes = 1048576
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.producer.host, "producer.internal");
        assert_eq!(config.producer.port, 9191);
        assert_eq!(config.producer.max_connections_per_route, 16);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.stats.shutdown_grace_ms, 500);
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn test_parse_toml_minimal_uses_defaults() {
        let config = parse_toml("[producer]\nhost = \"p\"\n").unwrap();
        assert_eq!(config.producer.port, 9090);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.stats.interval_ms, 5000);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "producer": { "host": "p", "port": 9000 },
            "server": { "port": 9999 }
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.producer.port, 9000);
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_parse_toml_missing_producer() {
        let result = parse_toml("[server]\nport = 8080\n");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("properties"), None);
    }
}
