//! Logger module
//!
//! Thin helpers over `tracing` so call sites stay one-liners:
//! - Subscriber setup from the logging config
//! - Server lifecycle logging
//! - Access logging with multiple formats

mod format;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber
///
/// `RUST_LOG` wins over the configured level when set. Only the first call installs a subscriber.
pub fn init(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber already installed (e.g. by another test) stays in place
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .ok();
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("widget server {} started", env!("CARGO_PKG_VERSION"));
    tracing::info!("listening for connections at http://{addr}");
    tracing::info!("log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        tracing::info!("worker threads: {workers}");
    }
    if let Some(max) = config.performance.max_connections {
        tracing::info!("max connections: {max}");
    }
    tracing::info!("max body size: {} bytes", config.http.max_body_size);
}

pub fn log_server_stop(active: usize, widgets: usize) {
    tracing::info!("shutdown requested, {active} connection(s) still open, {widgets} widget(s) discarded");
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        tracing::info!("all connections closed, exiting");
    } else {
        tracing::warn!("grace period over, abandoning {remaining} open connection(s)");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("accepted connection from {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}
