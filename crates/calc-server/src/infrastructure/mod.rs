//! Infrastructure layer: TCP acceptor, session handling, config-file I/O.

pub mod acceptor;
pub mod config_file;
pub mod session;
