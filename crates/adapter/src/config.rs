//! Command-line / environment configuration.
//!
//! Every flag has an environment fallback so the adapter can be configured the same way from an
//! MCP client's `env` block or from a shell.

use crate::error::{AdapterError, Result};
use clap::{Parser, ValueEnum};
use petstore_http_tools::config::DEFAULT_BASE_URL;
use petstore_http_tools::{Catalog, ClientConfig, MissingPathParam};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// How the adapter is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// MCP over stdin/stdout.
    Stdio,
    /// MCP over streamable HTTP at `/mcp`.
    Http,
    /// Browser test console.
    Console,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "petstore-mcp-adapter",
    version,
    about = "Swagger pet-store API exposed as MCP tools"
)]
pub struct AdapterArgs {
    /// Base URL of the pet-store API (no trailing slash needed).
    #[arg(long, env = "API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Bearer token sent as `Authorization: Bearer <key>`.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds (0 disables it).
    #[arg(long, env = "API_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Reject calls that omit a path parameter instead of substituting an empty segment.
    #[arg(long, env = "PETSTORE_STRICT_PATH_PARAMS")]
    pub strict_path_params: bool,

    /// Load the operation catalog from a YAML file instead of the built-in pet-store table.
    #[arg(long, env = "PETSTORE_CATALOG")]
    pub catalog: Option<PathBuf>,

    #[arg(long, value_enum, env = "PETSTORE_MCP_MODE", default_value_t = Mode::Stdio)]
    pub mode: Mode,

    /// Listen address for `--mode http`.
    #[arg(long, env = "PETSTORE_MCP_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Listen address for `--mode console`.
    #[arg(long, env = "TEST_UI_BIND", default_value = "127.0.0.1:3001")]
    pub console_bind: SocketAddr,

    /// Port override for the console listener (keeps the `--console-bind` host).
    #[arg(long, env = "TEST_UI_PORT")]
    pub console_port: Option<u16>,

    /// Log filter directive (e.g. `info`, `petstore_http_tools=debug`).
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, env = "PETSTORE_LOG_JSON")]
    pub log_json: bool,
}

impl AdapterArgs {
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            auth_token: self.api_key.clone(),
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
            missing_path_params: if self.strict_path_params {
                MissingPathParam::Reject
            } else {
                MissingPathParam::Empty
            },
        }
    }

    /// Console listen address with `--console-port` applied.
    #[must_use]
    pub fn console_addr(&self) -> SocketAddr {
        let mut addr = self.console_bind;
        if let Some(port) = self.console_port {
            addr.set_port(port);
        }
        addr
    }

    /// Build the operation catalog: the YAML file when given, the built-in table otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be read or fails validation.
    pub fn load_catalog(&self) -> Result<Catalog> {
        let catalog = match &self.catalog {
            Some(path) => Catalog::from_file(path),
            None => Catalog::petstore(),
        }?;
        if catalog.is_empty() {
            return Err(AdapterError::Config(
                "operation catalog is empty".to_string(),
            ));
        }
        Ok(catalog)
    }
}
