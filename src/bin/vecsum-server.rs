//! vecsum server binary.
//!
//! # Usage
//!
//! ```bash
//! # Serve on the default port with tracing-only logging
//! vecsum-server --clients clients.db
//!
//! # Custom port plus a line-oriented event log file
//! vecsum-server --clients clients.db --log events.log --port 9000
//! ```

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vecsum::config::ServerConfig;
use vecsum::directory::ClientDirectory;
use vecsum::transport::tcp;
use vecsum::utils::{EventSink, FileSink, TracingSink};

/// Authenticated saturating vector-sum server
#[derive(Parser, Debug)]
#[command(name = "vecsum-server")]
#[command(about = "Authenticated TCP service for saturating vector summation")]
#[command(version)]
struct Args {
    /// Path to the client credentials file (one id:secret per line)
    #[arg(short = 'c', long)]
    clients: String,

    /// Path to the event log file (tracing output is always emitted)
    #[arg(short = 'l', long)]
    log: Option<String>,

    /// Port to listen on (overrides the configured address's port)
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::from_env()?,
    };
    if let Some(port) = args.port {
        let host = config
            .server
            .address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.server.address = format!("{host}:{port}");
        config.validate()?;
    }

    let directory = match ClientDirectory::load(&args.clients) {
        Ok(directory) => Arc::new(directory),
        Err(e) => {
            tracing::error!(error = %e, path = %args.clients, "Failed to load client directory");
            return Err(e.into());
        }
    };
    tracing::info!(clients = directory.len(), "Client directory loaded");
    if directory.is_empty() {
        tracing::warn!("Client directory is empty - every connection will be rejected");
    }

    let sink: Arc<dyn EventSink> = match &args.log {
        Some(path) => Arc::new(FileSink::open(path)?),
        None => Arc::new(TracingSink),
    };

    tracing::info!(address = %config.server.address, "vecsum server starting");

    tcp::start_server(config, directory, sink).await?;

    Ok(())
}
