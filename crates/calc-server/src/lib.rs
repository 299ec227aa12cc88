//! # calc-server
//!
//! Concurrent line-oriented TCP calculator server.
//!
//! Clients connect over plain TCP, receive a greeting and a prompt, and
//! then exchange newline-terminated text lines: each input line is an
//! arithmetic expression, each response is either a result line or a
//! diagnostic, always followed by the prompt again.  A case-insensitive
//! `bye` ends the session.
//!
//! The crate is split the usual way:
//!
//! - **`domain`** – plain configuration types with no I/O.
//! - **`infrastructure`** – the TCP acceptor, the per-session handler, and
//!   the TOML config-file loader.
//!
//! Expression evaluation itself lives in the `calc-core` crate; this crate
//! only moves lines between sockets and the evaluator.

pub mod domain;
pub mod infrastructure;

pub use domain::config::ServerConfig;
pub use infrastructure::acceptor::{run_server, Acceptor};
