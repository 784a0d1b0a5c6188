//! Error types for the MCP adapter.

use petstore_http_tools::HttpToolsError;
use thiserror::Error;

/// Main error type for the adapter.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Configuration errors (bad flags, unreadable catalog, invalid base URL)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Startup errors (listener bind, MCP handshake)
    #[error("Startup error: {0}")]
    Startup(String),

    /// Catalog / dispatcher errors surfaced at startup
    #[error(transparent)]
    Tools(#[from] HttpToolsError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;
