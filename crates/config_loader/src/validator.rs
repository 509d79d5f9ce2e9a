//! 配置校验模块
//!
//! 校验规则：
//! - producer.host 非空，端口 > 0
//! - 所有超时与周期 > 0
//! - max_connections_per_route <= max_connections
//! - retry.max_attempts >= 1
//! - server.max_image_bytes > 0

use contracts::{AppConfig, ContractError};
use ::validator::{Validate, ValidationErrors};

/// 校验 AppConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &AppConfig) -> Result<(), ContractError> {
    check_section("producer", config.producer.validate())?;
    check_section("retry", config.retry.validate())?;
    check_section("stats", config.stats.validate())?;
    check_section("server", config.server.validate())?;
    validate_connection_bounds(config)?;
    Ok(())
}

/// 将 validator 派生规则的错误转换为 ContractError (按字段名排序，取第一个)
fn check_section(
    section: &str,
    result: Result<(), ValidationErrors>,
) -> Result<(), ContractError> {
    let Err(errors) = result else {
        return Ok(());
    };

    let mut fields: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect();
    fields.sort();

    match fields.into_iter().next() {
        Some((field, message)) => Err(ContractError::config_validation(
            format!("{section}.{field}"),
            message,
        )),
        None => Err(ContractError::config_validation(section, errors.to_string())),
    }
}

/// 校验连接池上限
fn validate_connection_bounds(config: &AppConfig) -> Result<(), ContractError> {
    let producer = &config.producer;
    if producer.max_connections_per_route > producer.max_connections {
        return Err(ContractError::config_validation(
            "producer.max_connections_per_route / producer.max_connections",
            format!(
                "max_connections_per_route ({}) must be <= max_connections ({})",
                producer.max_connections_per_route, producer.max_connections
            ),
        ));
    }
    Ok(())
}
