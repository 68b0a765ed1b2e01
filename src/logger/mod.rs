//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Startup and asset loading logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup. Messages logged earlier go
/// straight to stdout/stderr.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, asset_count: usize) {
    write_info("======================================");
    write_info("SPA server started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Assets loaded: {asset_count}"));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    write_info(&format!(
        "Timeouts: read {}s, write {}s, idle {}s",
        config.timeouts.read, config.timeouts.write, config.timeouts.idle
    ));
    if config.content.csp_header == crate::http::csp::DISABLED_TEMPLATE {
        write_info("Content-Security-Policy: disabled");
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_asset_loaded(path: &str, size: usize, mime_type: &str) {
    write_info(&format!("[Assets] Loaded {path} ({size} bytes, {mime_type})"));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}

pub fn log_shutdown_requested(active_connections: usize) {
    write_info(&format!(
        "\n[Shutdown] Stopped accepting connections, {active_connections} still active"
    ));
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        write_info("[Shutdown] All connections closed");
    } else {
        log_warning(&format!(
            "[Shutdown] Giving up on {remaining} connection(s) still open"
        ));
    }
}
