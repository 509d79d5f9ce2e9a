//! `serve` command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use api::{build_router, AppState, InMemoryAlbumStore};
use contracts::AppConfig;
use dispatcher::{CountersSnapshot, DispatchClient};

use crate::cli::ServeArgs;
use crate::commands::{load_config, ConfigSource};
use crate::error::CliError;

/// Execute the `serve` command
pub async fn run_serve(args: &ServeArgs) -> Result<()> {
    let (mut config, source) = load_config(&args.config)?;

    if let Some(port) = args.port {
        info!(port = %port, "Overriding HTTP port from CLI");
        config.server.port = port;
    }

    info!(
        source = %source,
        producer = %config.producer.publish_url(),
        listen = %config.server.bind_addr(),
        max_attempts = config.retry.max_attempts,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config, &source);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let client = Arc::new(
        DispatchClient::from_config(&config).context("Failed to create dispatch client")?,
    );
    let store = Arc::new(InMemoryAlbumStore::new());
    let state = AppState::new(store, Arc::clone(&client), &config.server);
    let router = build_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CliError::bind(&addr, e))?;

    info!(addr = %addr, "Album store listening");

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Stop dispatching even if the server loop failed
    info!("Stopping dispatch client...");
    client.close().await;
    print_final_stats(&client.snapshot());

    served.map_err(CliError::from)?;
    info!("Album store finished");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
///
/// If a handler cannot be installed the error is logged and that signal is
/// never considered received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Received shutdown signal, draining connections...");
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &AppConfig, source: &ConfigSource) {
    println!("\n=== Configuration Summary ===\n");
    println!("Source: {source}");
    println!("\nProducer:");
    println!("  Endpoint: {}", config.producer.publish_url());
    println!(
        "  Pool: {} total / {} per route",
        config.producer.max_connections, config.producer.max_connections_per_route
    );
    println!(
        "  Timeouts: connect {}ms, socket {}ms",
        config.producer.connect_timeout_ms, config.producer.socket_timeout_ms
    );
    println!("\nRetry:");
    println!(
        "  {} attempts, base delay {}ms",
        config.retry.max_attempts, config.retry.base_delay_ms
    );
    println!("\nServer:");
    println!("  Listen: {}", config.server.bind_addr());
    println!("  Review timeout: {}ms", config.server.request_timeout_ms);
    println!();
}

fn print_final_stats(stats: &CountersSnapshot) {
    println!("\n=== Dispatch Statistics ===\n");
    println!("  Sent:         {}", stats.sent);
    println!("  Succeeded:    {}", stats.succeeded);
    println!("  Failed:       {}", stats.failed);
    println!("  Success rate: {}%", stats.success_rate());
    println!();
}
