//! Connection acceptor: TCP bind and the accept loop.
//!
//! [`Acceptor::bind`] claims the listening socket; binding is the only
//! fatal failure in the server's lifetime.  [`Acceptor::run`] then accepts
//! connections until the shared `running` flag is cleared, handing each
//! accepted stream to its own Tokio task.  Per-accept failures (e.g. too
//! many open file descriptors) are logged and the loop continues — one
//! refused connection never takes the server down.
//!
//! Sessions share no mutable state, so serving them concurrently changes
//! nothing any single client observes; it only removes the head-of-line
//! blocking a serial accept loop would impose on the second client.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::{error, info};

use crate::domain::config::ServerConfig;
use crate::infrastructure::session::handle_session;

/// A bound TCP listener together with its resolved local address.
pub struct Acceptor {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Acceptor {
    /// Binds the listening socket described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when the address cannot be bound (port in use,
    /// insufficient privilege, invalid address).  This is fatal: there is
    /// no server without a listener.
    pub async fn bind(config: &ServerConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("failed to bind listener on {}", config.bind_addr))?;

        // Resolve the actual address; relevant when binding port 0.
        let local_addr = listener
            .local_addr()
            .context("could not resolve bound listener address")?;

        info!("calculator server listening on {local_addr}");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// The address the listener is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Runs the accept loop until `running` is set to `false`.
    ///
    /// Each accepted connection is handed to a dedicated Tokio task, so the
    /// loop returns to `accept()` immediately and a slow client never
    /// blocks the next one.  A short timeout on `accept()` lets the loop
    /// poll the shutdown flag even when no clients are connecting.
    pub async fn run(self, running: Arc<AtomicBool>) -> anyhow::Result<()> {
        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping accept loop");
                break;
            }

            let accepted = timeout(Duration::from_millis(200), self.listener.accept()).await;

            match accepted {
                Ok(Ok((stream, peer_addr))) => {
                    info!("new client connection from {peer_addr}");
                    tokio::spawn(async move {
                        handle_session(stream, peer_addr).await;
                    });
                }
                Ok(Err(e)) => {
                    // Transient accept failure; keep listening.
                    error!("accept error: {e}");
                }
                Err(_) => {
                    // Timeout — no connection in the last 200 ms.
                }
            }
        }

        Ok(())
    }
}

/// Binds and runs the server in one call.
///
/// # Errors
///
/// Returns an error only when the listener cannot be bound.
pub async fn run_server(config: ServerConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    Acceptor::bind(&config).await?.run(running).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_config() -> ServerConfig {
        ServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_bind_on_port_zero_resolves_an_ephemeral_port() {
        // Arrange / Act
        let acceptor = Acceptor::bind(&loopback_config()).await.expect("bind");

        // Assert
        assert_ne!(acceptor.local_addr().port(), 0);
        assert_eq!(acceptor.local_addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_bind_on_occupied_port_fails() {
        // Arrange: claim an ephemeral port.
        let first = Acceptor::bind(&loopback_config()).await.expect("bind");
        let occupied = ServerConfig {
            bind_addr: first.local_addr(),
        };

        // Act
        let second = Acceptor::bind(&occupied).await;

        // Assert
        assert!(second.is_err(), "binding an occupied port must fail");
    }

    #[tokio::test]
    async fn test_run_stops_when_flag_is_cleared() {
        // Arrange
        let acceptor = Acceptor::bind(&loopback_config()).await.expect("bind");
        let running = Arc::new(AtomicBool::new(false));

        // Act: with the flag already cleared the loop must return promptly.
        let result = timeout(Duration::from_secs(2), acceptor.run(running)).await;

        // Assert
        assert!(result.is_ok(), "accept loop must observe the cleared flag");
        assert!(result.unwrap().is_ok());
    }
}
