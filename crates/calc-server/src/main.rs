//! Calculator server — entry point.
//!
//! Wires together configuration, logging, signal handling, and the accept
//! loop, then serves clients until Ctrl-C.
//!
//! # Usage
//!
//! ```text
//! calc-server [OPTIONS]
//!
//! Options:
//!   --port      <PORT>   TCP listener port          [default: 4242]
//!   --bind      <ADDR>   IP address to bind to      [default: 0.0.0.0]
//!   --config    <PATH>   Optional TOML config file
//!   --log-level <LEVEL>  Default tracing level      [default: info]
//! ```
//!
//! # Configuration precedence
//!
//! CLI flags (and their environment-variable forms, which clap treats the
//! same way) override config-file values, which override built-in
//! defaults.  `RUST_LOG`, when set, overrides the configured log level
//! entirely.
//!
//! | Variable      | Description                 |
//! |---------------|-----------------------------|
//! | `CALC_PORT`   | TCP listener port           |
//! | `CALC_BIND`   | IP address to bind to       |
//! | `CALC_CONFIG` | Path to a TOML config file  |
//! | `CALC_LOG`    | Default tracing level       |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use calc_server::domain::config::ServerConfig;
use calc_server::infrastructure::acceptor::run_server;
use calc_server::infrastructure::config_file::{load_file_config, FileConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Line-oriented TCP calculator server.
///
/// Accepts client connections and evaluates one arithmetic expression per
/// input line, left to right, until the client sends `bye`.
#[derive(Debug, Parser)]
#[command(
    name = "calc-server",
    about = "Concurrent line-oriented TCP calculator server",
    version
)]
struct Cli {
    /// TCP port to listen on.
    #[arg(long, env = "CALC_PORT")]
    port: Option<u16>,

    /// IP address to bind to.
    ///
    /// Use `0.0.0.0` to accept connections from any interface, or
    /// `127.0.0.1` for local connections only.
    #[arg(long, env = "CALC_BIND")]
    bind: Option<String>,

    /// Path to a TOML configuration file.
    ///
    /// A missing file is treated as an empty one; CLI flags override any
    /// value it provides.
    #[arg(long, env = "CALC_CONFIG")]
    config: Option<PathBuf>,

    /// Default log level when `RUST_LOG` is not set.
    #[arg(long, env = "CALC_LOG")]
    log_level: Option<String>,
}

impl Cli {
    /// Resolves CLI arguments against the optional config file into the
    /// final [`ServerConfig`] plus the default log level.
    ///
    /// # Errors
    ///
    /// Returns an error when the config file exists but cannot be read or
    /// parsed, or when the resolved bind address is invalid.
    fn resolve(self) -> anyhow::Result<(ServerConfig, String)> {
        let file = match &self.config {
            Some(path) => load_file_config(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?,
            None => FileConfig::default(),
        };

        let port = self.port.unwrap_or(file.network.port);
        let bind = self.bind.unwrap_or(file.network.bind_address);
        let log_level = self.log_level.unwrap_or(file.server.log_level);

        let bind_addr: SocketAddr = format!("{bind}:{port}")
            .parse()
            .with_context(|| format!("invalid bind address: '{bind}:{port}'"))?;

        Ok((ServerConfig { bind_addr }, log_level))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, log_level) = cli.resolve()?;

    // Structured logging; RUST_LOG overrides the configured default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    info!("calculator server starting on {}", config.bind_addr);

    // Shutdown flag shared with the accept loop; flipped by Ctrl-C.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl-C — initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl-C signal: {e}");
            }
        }
    });

    run_server(config, running).await?;

    info!("calculator server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
