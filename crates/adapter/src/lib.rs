//! Swagger pet-store REST API exposed as MCP tools.
//!
//! The binary runs in one of three modes: MCP over stdio, MCP over streamable HTTP, or the
//! browser test console. All three share one [`Dispatcher`] built from the operation catalog.

pub mod config;
pub mod console;
pub mod error;
pub mod http;
pub mod server;
pub mod telemetry;

use crate::config::{AdapterArgs, Mode};
use crate::error::{AdapterError, Result};
use crate::server::PetstoreMcpServer;
use petstore_http_tools::Dispatcher;
use rmcp::ServiceExt;
use std::sync::Arc;
use tracing::info;

/// Build the dispatcher from `args` and serve until shutdown.
///
/// # Errors
///
/// Returns an error if the catalog or base URL is invalid, or the selected transport fails to
/// start.
pub async fn run(args: AdapterArgs) -> Result<()> {
    let catalog = Arc::new(args.load_catalog()?);
    let tools = catalog.len();
    let dispatcher = Dispatcher::new(catalog, args.client_config())?;

    info!(
        mode = ?args.mode,
        base_url = %dispatcher.base_url(),
        tools,
        authenticated = args.api_key.is_some(),
        "petstore-mcp-adapter starting"
    );

    match args.mode {
        Mode::Stdio => {
            let service = PetstoreMcpServer::new(dispatcher)
                .serve(rmcp::transport::io::stdio())
                .await
                .map_err(|e| AdapterError::Startup(format!("MCP stdio handshake: {e}")))?;
            service
                .waiting()
                .await
                .map_err(|e| AdapterError::Startup(format!("MCP stdio session: {e}")))?;
        }
        Mode::Http => http::serve(PetstoreMcpServer::new(dispatcher), args.bind).await?,
        Mode::Console => console::serve(dispatcher, args.console_addr()).await?,
    }

    info!("petstore-mcp-adapter stopped");
    Ok(())
}
