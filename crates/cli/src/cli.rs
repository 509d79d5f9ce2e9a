//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Album Store - album API with asynchronous review event dispatch
#[derive(Parser, Debug)]
#[command(
    name = "album-store",
    author,
    version,
    about = "Album store API with asynchronous review dispatch",
    long_about = "Serves the album store HTTP API.\n\n\
                  Review requests are forwarded to the producer service as JSON events, \n\
                  with pooled connections, bounded retries and periodic delivery stats."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "ALBUM_STORE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "ALBUM_STORE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),

    /// Dispatch review events to the producer and report the outcome
    Send(SendArgs),
}

/// Configuration source shared by every command
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to configuration file (TOML or JSON); defaults to
    /// /etc/albumstore/api.toml, then ./config.toml
    #[arg(short, long, env = "ALBUM_STORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override producer host from configuration
    #[arg(long, env = "PRODUCER_HOST")]
    pub producer_host: Option<String>,

    /// Override producer port from configuration
    #[arg(long, env = "PRODUCER_PORT")]
    pub producer_port: Option<u16>,
}

/// Arguments for the `serve` command
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Override HTTP listen port from configuration
    #[arg(long, env = "ALBUM_STORE_PORT")]
    pub port: Option<u16>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "ALBUM_STORE_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without serving
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `send` command
#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Review type: like or dislike
    #[arg(long = "type", default_value = "like")]
    pub review_type: String,

    /// Album id the review is for
    #[arg(long)]
    pub album_id: String,

    /// Number of events to dispatch concurrently
    #[arg(long, default_value = "1")]
    pub count: usize,

    /// Per-event timeout in milliseconds (0 = wait for the retry budget)
    #[arg(long, default_value = "0")]
    pub timeout_ms: u64,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
