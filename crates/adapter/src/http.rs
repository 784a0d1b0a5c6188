//! Streamable HTTP transport: MCP at `/mcp`, liveness at `/health`.

use crate::error::{AdapterError, Result};
use crate::server::PetstoreMcpServer;
use axum::routing::get;
use axum::{Json, Router};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use serde_json::{Value, json};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

/// Router serving one MCP session per client over streamable HTTP.
pub fn router(server: PetstoreMcpServer) -> Router {
    let tool_count = server.dispatcher().catalog().len();
    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route(
            "/health",
            get(move || async move { Json(health_body(tool_count)) }),
        )
        .nest_service("/mcp", mcp)
}

fn health_body(tools: usize) -> Value {
    json!({ "status": "ok", "tools": tools })
}

/// Serve [`router`] on `addr` until Ctrl+C / SIGTERM.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(server: PetstoreMcpServer, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AdapterError::Startup(format!("bind {addr}: {e}")))?;
    info!(addr = %listener.local_addr()?, "MCP streamable HTTP listening on /mcp");

    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use petstore_http_tools::{Catalog, ClientConfig, Dispatcher};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn health_reports_tool_count() {
        let catalog = Arc::new(Catalog::petstore().expect("catalog"));
        let dispatcher = Dispatcher::new(catalog, ClientConfig::default()).expect("dispatcher");
        let app = router(PetstoreMcpServer::new(dispatcher));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body, health_body(20));
    }
}
