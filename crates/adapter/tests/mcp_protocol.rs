//! MCP round-trips against an in-process server over a duplex pipe.

use petstore_http_tools::{Catalog, ClientConfig, Dispatcher};
use petstore_mcp_adapter::server::{PetstoreMcpServer, SERVER_NAME};
use petstore_test_support::MockPetstore;
use rmcp::model::{CallToolRequestParams, CallToolResult, ClientInfo};
use rmcp::service::RunningService;
use rmcp::{ClientHandler, RoleClient, ServiceExt};
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct DummyClient;

impl ClientHandler for DummyClient {
    fn get_info(&self) -> ClientInfo {
        ClientInfo::default()
    }
}

type Client = RunningService<RoleClient, DummyClient>;

async fn connect(
    base_url: &str,
) -> anyhow::Result<(Client, tokio::task::JoinHandle<anyhow::Result<()>>)> {
    let (server_transport, client_transport) = tokio::io::duplex(4096);

    let catalog = Arc::new(Catalog::petstore()?);
    let dispatcher = Dispatcher::new(catalog, ClientConfig::with_base_url(base_url))?;
    let server = PetstoreMcpServer::new(dispatcher);
    let server_handle = tokio::spawn(async move {
        let service = server.serve(server_transport).await?;
        service.waiting().await?;
        anyhow::Ok(())
    });

    let client = DummyClient.serve(client_transport).await?;
    Ok((client, server_handle))
}

fn call(name: &str, arguments: Value) -> CallToolRequestParams {
    CallToolRequestParams {
        meta: None,
        name: name.to_string().into(),
        arguments: arguments.as_object().cloned(),
        task: None,
    }
}

fn text_of(result: &CallToolResult) -> anyhow::Result<String> {
    let v = serde_json::to_value(result)?;
    v["content"][0]["text"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("missing text content in {v}"))
}

#[tokio::test]
async fn initialize_and_list_all_tools() -> anyhow::Result<()> {
    let upstream = MockPetstore::spawn().await?;
    let (client, server_handle) = connect(upstream.base_url()).await?;

    let info = client
        .peer_info()
        .ok_or_else(|| anyhow::anyhow!("no server info after initialize"))?;
    assert_eq!(info.server_info.name, SERVER_NAME);

    let tools = client.list_tools(None).await?;
    let names: Vec<&str> = tools.tools.iter().map(|t| t.name.as_ref()).collect();
    assert_eq!(names.len(), 20, "{names:?}");
    assert_eq!(names.first(), Some(&"uploadFile"));
    assert_eq!(names.last(), Some(&"createUser"));

    let get_pet = tools
        .tools
        .iter()
        .find(|t| t.name == "getPetById")
        .ok_or_else(|| anyhow::anyhow!("getPetById missing"))?;
    let annotations = get_pet
        .annotations
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("getPetById has no annotations"))?;
    assert_eq!(annotations.read_only_hint, Some(true));
    assert_eq!(
        get_pet.input_schema.get("required"),
        Some(&json!(["petId"]))
    );

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}

#[tokio::test]
async fn call_tool_round_trips_through_upstream() -> anyhow::Result<()> {
    let upstream = MockPetstore::spawn().await?;
    let (client, server_handle) = connect(upstream.base_url()).await?;

    let result = client
        .call_tool(call("findPetsByStatus", json!({ "status": "sold" })))
        .await?;
    assert_eq!(result.is_error, Some(false));
    let body: Value = serde_json::from_str(&text_of(&result)?)?;
    assert_eq!(body["method"], "GET");
    assert_eq!(body["path"], "/v2/pet/findByStatus");
    assert_eq!(body["query"], "status=sold");

    let result = client
        .call_tool(call(
            "placeOrder",
            json!({ "body": { "petId": 1, "quantity": 2, "status": "placed" } }),
        ))
        .await?;
    assert_eq!(result.is_error, Some(false));
    let body: Value = serde_json::from_str(&text_of(&result)?)?;
    assert_eq!(body["method"], "POST");
    assert_eq!(body["path"], "/v2/store/order");
    assert_eq!(body["body"]["quantity"], 2);

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}

#[tokio::test]
async fn failures_are_tool_errors_and_unknown_tools_are_protocol_errors() -> anyhow::Result<()> {
    let upstream = MockPetstore::spawn().await?;
    let (client, server_handle) = connect(upstream.base_url()).await?;

    let invalid = client
        .call_tool(call("placeOrder", json!({ "body": { "status": "shipped" } })))
        .await?;
    assert_eq!(invalid.is_error, Some(true));
    assert!(text_of(&invalid)?.starts_with("Error: Invalid arguments for placeOrder"));
    assert!(upstream.requests().is_empty(), "validation must precede I/O");

    let not_found = client
        .call_tool(call("getOrderById", json!({ "orderId": "missing" })))
        .await?;
    assert_eq!(not_found.is_error, Some(true));
    let structured = not_found
        .structured_content
        .clone()
        .ok_or_else(|| anyhow::anyhow!("missing structured failure"))?;
    assert_eq!(structured["status"], 404);
    assert_eq!(structured["details"]["message"], "not found");

    let unknown = client.call_tool(call("adoptPet", json!({}))).await;
    assert!(unknown.is_err(), "unknown tool should be a JSON-RPC error");

    // The session keeps working after failures.
    let ok = client.call_tool(call("getInventory", json!({}))).await?;
    assert_eq!(ok.is_error, Some(false));

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}
