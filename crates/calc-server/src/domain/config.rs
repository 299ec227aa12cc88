//! Server configuration types.
//!
//! [`ServerConfig`] is the single source of truth for the runtime settings
//! of the accept loop.  It is a plain struct with no global state and no
//! environment-variable reads, so tests can construct it directly; the
//! infrastructure layer is responsible for populating it from CLI
//! arguments or a TOML config file.

use std::net::SocketAddr;

/// Runtime configuration for the calculator server.
///
/// Build this once at startup and wrap it in an `Arc` if it ever needs to
/// be shared across tasks.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address and port the TCP listener binds to.
    ///
    /// `0.0.0.0` accepts connections from any interface.  Binding port `0`
    /// asks the OS for an ephemeral port, which the integration tests use
    /// to avoid collisions.
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    /// Defaults suitable for local development: all interfaces, port 4242.
    fn default() -> Self {
        Self {
            // Compile-time-known valid socket address string.
            bind_addr: "0.0.0.0:4242".parse().unwrap(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
