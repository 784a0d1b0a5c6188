//! Browser test console.
//!
//! `GET /` serves a single static page; `GET /api/tools` lists operations and
//! `POST /api/call` proxies one call through the [`Dispatcher`], honoring an optional
//! `x-api-key` header as a per-call bearer token.

use crate::error::{AdapterError, Result};
use crate::http::shutdown_signal;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use petstore_http_tools::{Dispatcher, OperationSummary};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

const CONSOLE_PAGE: &str = include_str!("../assets/console.html");

#[derive(Debug, Deserialize)]
pub struct CallRequest {
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

pub fn router(dispatcher: Dispatcher) -> Router {
    Router::new()
        .route("/", get(|| async { Html(CONSOLE_PAGE) }))
        .route("/api/tools", get(list_tools))
        .route("/api/call", post(call_tool))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(dispatcher)
}

async fn list_tools(State(dispatcher): State<Dispatcher>) -> Json<Vec<OperationSummary>> {
    Json(dispatcher.list_operations())
}

async fn call_tool(
    State(dispatcher): State<Dispatcher>,
    headers: HeaderMap,
    Json(request): Json<CallRequest>,
) -> Response {
    let api_key = headers.get("x-api-key").and_then(|v| v.to_str().ok());

    match dispatcher
        .invoke(&request.tool, &request.arguments, api_key)
        .await
    {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            let failure = e.to_failure();
            warn!(
                tool = %request.tool,
                status = failure.status,
                error = %failure.message,
                "console call failed"
            );
            let status =
                StatusCode::from_u16(failure.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let mut body = json!({ "error": failure.message });
            if let Some(details) = failure.details {
                body["details"] = details;
            }
            (status, Json(body)).into_response()
        }
    }
}

/// Serve the console on `addr` until Ctrl+C / SIGTERM.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(dispatcher: Dispatcher, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AdapterError::Startup(format!("bind {addr}: {e}")))?;
    info!(
        addr = %listener.local_addr()?,
        upstream = %dispatcher.base_url(),
        "test console listening"
    );

    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
