//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::AppConfig;
use dispatcher::BackoffPolicy;

use crate::cli::ValidateArgs;
use crate::commands::load_config;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    producer_url: String,
    max_attempts: u32,
    max_connections: usize,
    listen: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!("Validating configuration");

    let result = match load_config(&args.config) {
        Ok((config, source)) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_source: Some(source.to_string()),
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    producer_url: config.producer.publish_url(),
                    max_attempts: config.retry.max_attempts,
                    max_connections: config.producer.max_connections,
                    listen: config.server.bind_addr(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_source: args.config.config.as_ref().map(|p| p.display().to_string()),
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    };

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.retry.max_attempts == 1 {
        warnings.push("retry.max_attempts is 1 - failed dispatches are never retried".to_string());
    }

    // Worst case: every attempt hits the socket timeout, plus every backoff sleep
    let policy = BackoffPolicy::from_config(&config.retry);
    let worst_case = (1..policy.max_attempts())
        .map(|attempt| policy.delay(attempt))
        .fold(
            config.producer.socket_timeout() * policy.max_attempts(),
            |total, delay| total.saturating_add(delay),
        );
    if config.server.request_timeout() < worst_case {
        warnings.push(format!(
            "server.request_timeout_ms ({}ms) is shorter than the worst-case retry schedule ({}ms) - slow reviews will be cancelled",
            config.server.request_timeout_ms,
            worst_case.as_millis()
        ));
    }

    if config.stats.shutdown_grace() > config.stats.interval() {
        warnings.push(
            "stats.shutdown_grace_ms exceeds stats.interval_ms - shutdown may wait a full report period".to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    let source = result.config_source.as_deref().unwrap_or("<default locations>");
    if result.valid {
        println!("✓ Configuration is valid: {}", source);

        if let Some(ref summary) = result.summary {
            println!("\n  Producer: {}", summary.producer_url);
            println!("  Max attempts: {}", summary.max_attempts);
            println!("  Max connections: {}", summary.max_connections);
            println!("  Listen: {}", summary.listen);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", source);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
