mod bindings;
mod printer;
mod pulse;
mod tui;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use otelview_core::config::ViewerConfig;
use otelview_core::filter::SubstringFilter;
use otelview_core::signal::Signal;

const LOG_ENV: &str = "OTELVIEW_LOG";

#[derive(Parser, Debug)]
#[command(name = "otelview")]
#[command(about = "Watch OTLP logs, metrics and traces live in the terminal", long_about = None)]
struct Cli {
    /// YAML configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, allow_negative_numbers = true)]
    http_port: Option<i64>,

    #[arg(long)]
    disable_http: bool,

    #[arg(long, allow_negative_numbers = true)]
    grpc_port: Option<i64>,

    #[arg(long)]
    disable_grpc: bool,

    /// Listen for newline-delimited OTLP/JSON on this port
    #[arg(long, allow_negative_numbers = true)]
    stream_port: Option<i64>,

    #[arg(long)]
    disable_stream: bool,

    /// Initial filter text
    #[arg(short, long)]
    filter: Option<String>,

    /// Number of signals kept in history
    #[arg(long)]
    capacity: Option<usize>,

    /// Print accepted signals to stdout instead of opening the dashboard
    #[arg(long)]
    non_interactive: bool,

    /// Write diagnostics here while the dashboard owns the terminal
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ViewerConfig::default(),
        };

        if let Some(port) = self.http_port {
            config.http_port = port;
        }
        if self.disable_http {
            config.http_enabled = false;
        }
        if let Some(port) = self.grpc_port {
            config.grpc_port = port;
        }
        if self.disable_grpc {
            config.grpc_enabled = false;
        }
        if let Some(port) = self.stream_port {
            config.stream_enabled = true;
            config.stream_port = port;
        }
        if self.disable_stream {
            config.stream_enabled = false;
        }
        if let Some(filter) = &self.filter {
            config.filter = filter.clone();
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }

        config.validate().context("refusing to start")?;
        Ok(config)
    }
}

fn init_logging(log_file: Option<&Path>, interactive: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None if interactive => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .try_init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(cli.log_file.as_deref(), !cli.non_interactive)?;

    let (signal_tx, signal_rx) = mpsc::channel::<Signal>(config.channel_capacity);
    bindings::spawn_all(&config, signal_tx).await?;

    if cli.non_interactive {
        printer::run(signal_rx, SubstringFilter::with_pattern(config.filter.clone())).await;
        return Ok(());
    }

    tui::run(&config, signal_rx).await
}
