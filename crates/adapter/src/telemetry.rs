//! Logging setup.
//!
//! Logs always go to stderr: in stdio mode stdout carries the MCP protocol.

use crate::error::{AdapterError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// # Errors
///
/// Returns an error if `filter` is not a valid `EnvFilter` directive or a subscriber is already
/// installed.
pub fn init(filter: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|e| AdapterError::Config(format!("invalid log filter '{filter}': {e}")))?;

    let installed = if json {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .try_init()
    };
    installed.map_err(|e| AdapterError::Startup(format!("install tracing subscriber: {e}")))
}
