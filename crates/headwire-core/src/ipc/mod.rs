//! Unix socket IPC between the CLI and the daemon.

mod client;
mod protocol;
mod server;

pub use client::{is_daemon_running, DaemonClient};
pub use protocol::*;
pub use server::DaemonServer;
