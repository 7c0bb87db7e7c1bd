//! Notion site proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request            ┌──────────────────────────────────────────────┐
//!     ──────────────────────────┼─▶ http server ──▶ routing ──▶ preflight      │
//!       (or gateway event)      │                     │         / redirect     │
//!                               │                     ▼                        │
//!                               │               forwarder ──▶ upstream ───────┼──▶ Notion
//!                               │                     │                        │
//!     Client Response           │                     ▼                        │
//!     ◀─────────────────────────┼── header sanitizer ◀── body rewriters        │
//!                               │                                              │
//!                               │   config · observability · lifecycle         │
//!                               └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use notion_proxy::config::{load_or_default, ProxyConfig};
use notion_proxy::gateway::{handle_event, GatewayEvent};
use notion_proxy::lifecycle::{wait_for_signal, Shutdown};
use notion_proxy::observability::{init_logging, init_metrics};
use notion_proxy::proxy::{HttpUpstream, Proxy};
use notion_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "notion-proxy")]
#[command(about = "Serve a published Notion site under its own domain", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when absent.
    #[arg(short, long, env = "NOTION_PROXY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for HTTP traffic (default)
    Serve,
    /// Handle one gateway event from a JSON file and print the response
    Invoke {
        #[arg(short, long)]
        event: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    init_logging(&config.observability);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Invoke { event } => invoke(config, event).await,
    }
}

async fn serve(config: ProxyConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        public_domain = %config.site.public_domain,
        upstream = %config.site.upstream_base(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        init_metrics(config.observability.metrics_address.parse()?);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(wait_for_signal(shutdown));

    HttpServer::new(config)?.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn invoke(config: ProxyConfig, event: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let event: GatewayEvent = serde_json::from_str(&tokio::fs::read_to_string(&event).await?)?;
    let upstream = Arc::new(HttpUpstream::new(&config.timeouts)?);
    let proxy = Proxy::new(&config.site, upstream)?;

    let response = handle_event(&proxy, event).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
