//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::AppConfig;
use dispatcher::BackoffPolicy;

use crate::cli::InfoArgs;
use crate::commands::{load_config, ConfigSource};

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    source: String,
    producer: ProducerInfo,
    retry: RetryInfo,
    stats: StatsInfo,
    server: ServerInfo,
}

#[derive(Serialize)]
struct ProducerInfo {
    publish_url: String,
    connect_timeout_ms: u64,
    socket_timeout_ms: u64,
    max_connections: usize,
    max_connections_per_route: usize,
}

#[derive(Serialize)]
struct RetryInfo {
    max_attempts: u32,
    /// Delay after each failed attempt that is followed by another
    backoff_schedule_ms: Vec<u64>,
}

#[derive(Serialize)]
struct StatsInfo {
    interval_ms: u64,
    shutdown_grace_ms: u64,
}

#[derive(Serialize)]
struct ServerInfo {
    listen: String,
    request_timeout_ms: u64,
    max_image_bytes: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!("Loading configuration info");

    let (config, source) = load_config(&args.config).context("Failed to load configuration")?;
    let info = build_config_info(&config, &source);

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(config: &AppConfig, source: &ConfigSource) -> ConfigInfo {
    let policy = BackoffPolicy::from_config(&config.retry);
    let backoff_schedule_ms = (1..policy.max_attempts())
        .map(|attempt| policy.delay(attempt).as_millis() as u64)
        .collect();

    ConfigInfo {
        source: source.to_string(),
        producer: ProducerInfo {
            publish_url: config.producer.publish_url(),
            connect_timeout_ms: config.producer.connect_timeout_ms,
            socket_timeout_ms: config.producer.socket_timeout_ms,
            max_connections: config.producer.max_connections,
            max_connections_per_route: config.producer.max_connections_per_route,
        },
        retry: RetryInfo {
            max_attempts: policy.max_attempts(),
            backoff_schedule_ms,
        },
        stats: StatsInfo {
            interval_ms: config.stats.interval_ms,
            shutdown_grace_ms: config.stats.shutdown_grace_ms,
        },
        server: ServerInfo {
            listen: config.server.bind_addr(),
            request_timeout_ms: config.server.request_timeout_ms,
            max_image_bytes: config.server.max_image_bytes,
        },
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Album Store Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Source: {}\n", info.source);

    println!("Producer:");
    println!("  Publish URL:     {}", info.producer.publish_url);
    println!("  Connect timeout: {}ms", info.producer.connect_timeout_ms);
    println!("  Socket timeout:  {}ms", info.producer.socket_timeout_ms);
    println!(
        "  Connections:     {} total / {} per route",
        info.producer.max_connections, info.producer.max_connections_per_route
    );

    println!("\nRetry:");
    println!("  Max attempts:    {}", info.retry.max_attempts);
    println!("  Backoff (ms):    {:?}", info.retry.backoff_schedule_ms);

    println!("\nStats:");
    println!("  Interval:        {}ms", info.stats.interval_ms);
    println!("  Shutdown grace:  {}ms", info.stats.shutdown_grace_ms);

    println!("\nServer:");
    println!("  Listen:          {}", info.server.listen);
    println!("  Review timeout:  {}ms", info.server.request_timeout_ms);
    println!("  Max image:       {} bytes", info.server.max_image_bytes);
    println!();
}
