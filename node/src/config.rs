//! Node configuration.

use anyhow::{Context, Result};
use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Runtime configuration for the registry node.
///
/// Layered lowest-to-highest: built-in defaults, an optional TOML file,
/// `STORIUM_*` environment variables, then CLI flags applied by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Host the RPC server binds to.
    pub rpc_host: IpAddr,

    /// Port the RPC server binds to.
    pub rpc_port: u16,

    /// Operator-facing node name, reported by `/health`.
    pub node_id: String,

    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_host: IpAddr::from([0, 0, 0, 0]),
            rpc_port: 8080,
            node_id: "storium-node".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl NodeConfig {
    /// Load configuration, layering defaults, the optional file at `path`,
    /// and `STORIUM_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("rpc_host", "0.0.0.0")?
            .set_default("rpc_port", 8080i64)?
            .set_default("node_id", "storium-node")?
            .set_default("log_level", "info")?;

        if let Some(path) = path {
            builder = builder.add_source(ConfigFile::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(Environment::with_prefix("STORIUM"));

        let config = builder.build().context("failed to load configuration")?;
        config
            .try_deserialize()
            .context("invalid configuration values")
    }

    /// The socket address the RPC server binds to.
    pub fn rpc_addr(&self) -> SocketAddr {
        SocketAddr::new(self.rpc_host, self.rpc_port)
    }
}
