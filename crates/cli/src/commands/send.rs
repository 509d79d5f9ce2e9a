//! `send` command implementation.
//!
//! Dispatches review events straight to the producer, bypassing the HTTP API.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::DispatchOutcome;
use dispatcher::DispatchClient;

use crate::cli::SendArgs;
use crate::commands::load_config;

/// Result summary for one `send` run
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
struct SendReport {
    delivered: usize,
    failed: usize,
    /// Failure cause -> count
    causes: std::collections::BTreeMap<String, usize>,
}

impl SendReport {
    fn record(&mut self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Success => self.delivered += 1,
            DispatchOutcome::Failure(cause) => {
                self.failed += 1;
                *self.causes.entry(cause.to_string()).or_default() += 1;
            }
        }
    }
}

/// Execute the `send` command
pub async fn run_send(args: &SendArgs) -> Result<()> {
    let (config, _) = load_config(&args.config)?;
    let client =
        DispatchClient::from_config(&config).context("Failed to create dispatch client")?;

    info!(
        producer = %config.producer.publish_url(),
        review_type = %args.review_type,
        album_id = %args.album_id,
        count = args.count,
        "Dispatching review events"
    );

    let started = Instant::now();
    let mut handles = Vec::with_capacity(args.count);
    for _ in 0..args.count {
        let handle = if args.timeout_ms == 0 {
            client.send_review(&args.review_type, &args.album_id)?
        } else {
            let event = contracts::ReviewEvent::new(args.review_type.parse()?, args.album_id.as_str());
            client.dispatch_with_timeout(event, Duration::from_millis(args.timeout_ms))
        };
        handles.push(handle);
    }

    let mut report = SendReport::default();
    for handle in handles {
        report.record(&handle.await);
    }

    client.close().await;

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize send report")?
    );
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        stats = %client.snapshot(),
        "Send finished"
    );

    if report.failed > 0 {
        anyhow::bail!("{} of {} review events failed", report.failed, args.count);
    }
    Ok(())
}
