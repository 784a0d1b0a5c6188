//! MCP server handler backed by the pet-store [`Dispatcher`].
//!
//! Tools are not declared with `#[tool]` macros: the list is whatever the operation catalog
//! holds, and every call is routed through the same generic dispatcher.

use petstore_http_tools::{Dispatcher, HttpToolsError};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Implementation, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use serde_json::Value;
use std::future::Future;

pub const SERVER_NAME: &str = "swagger-petstore";

const INSTRUCTIONS: &str = "This is a sample server Petstore server. You can find out more about \
Swagger at http://swagger.io or on irc.freenode.net, #swagger. For this sample, you can use the \
api key `special-key` to test the authorization filters.";

#[derive(Clone)]
pub struct PetstoreMcpServer {
    dispatcher: Dispatcher,
}

impl PetstoreMcpServer {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

fn to_error_data(e: &HttpToolsError) -> ErrorData {
    if e.is_unknown_operation() {
        ErrorData::invalid_params(e.to_string(), None)
    } else {
        ErrorData::internal_error(e.to_string(), None)
    }
}

impl ServerHandler for PetstoreMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                title: Some("Swagger Petstore".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(
            self.dispatcher.list_tools(),
        )))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move {
            let arguments = request.arguments.map_or(Value::Null, Value::Object);
            self.dispatcher
                .call_tool(&request.name, arguments)
                .await
                .map_err(|e| {
                    tracing::debug!(tool = %request.name, error = %e, "rejecting tool call");
                    to_error_data(&e)
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petstore_http_tools::{Catalog, ClientConfig};
    use std::sync::Arc;

    fn server() -> PetstoreMcpServer {
        let catalog = Arc::new(Catalog::petstore().expect("catalog"));
        let dispatcher =
            Dispatcher::new(catalog, ClientConfig::default()).expect("dispatcher");
        PetstoreMcpServer::new(dispatcher)
    }

    #[test]
    fn info_advertises_tools_only() {
        let info = server().get_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
        assert!(
            info.instructions
                .as_deref()
                .is_some_and(|i| i.contains("Swagger"))
        );
    }

    #[test]
    fn unknown_tool_maps_to_invalid_params() {
        let err = HttpToolsError::UnknownOperation("nope".to_string());
        let data = to_error_data(&err);
        assert_eq!(data.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert_eq!(data.message, "Unknown tool: nope");
    }
}
