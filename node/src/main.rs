use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use storium_registry::Registry;
use storium_rpc::{start_server, AppState};
use storium_types::storium_time_init;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;

use config::NodeConfig;

/// STORIUM file registry node.
#[derive(Debug, Parser)]
#[command(name = "storium-node", version, about = "STORIUM file registry node")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the RPC bind host.
    #[arg(long)]
    rpc_host: Option<IpAddr>,

    /// Override the RPC bind port.
    #[arg(long)]
    rpc_port: Option<u16>,

    /// Override the node identifier reported by /health.
    #[arg(long)]
    node_id: Option<String>,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = NodeConfig::load(args.config.as_deref())?;
    if let Some(host) = args.rpc_host {
        config.rpc_host = host;
    }
    if let Some(port) = args.rpc_port {
        config.rpc_port = port;
    }
    if let Some(node_id) = args.node_id {
        config.node_id = node_id;
    }

    init_tracing(&config.log_level);
    storium_time_init();

    info!(
        node_id = %config.node_id,
        version = env!("CARGO_PKG_VERSION"),
        "starting registry node"
    );

    let registry = Arc::new(Registry::new());
    let state = Arc::new(AppState::new(registry, config.node_id.clone()));

    start_server(config.rpc_addr(), state).await
}
