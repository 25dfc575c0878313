//! MCP Server implementation
//!
//! JSON-RPC session handling shared by the stdio and HTTP transports.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::types::*;

/// MCP Server info
pub const SERVER_NAME: &str = "todo-widget";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for the todo list
#[derive(Debug)]
pub struct McpServer {
    /// Tool and resource dispatcher
    dispatcher: Dispatcher,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run the server on stdio
    pub async fn run_stdio(self: Arc<Self>) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        info!("serving MCP over stdio");

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_message(&line).await {
                let mut output = serde_json::to_string(&response)?;
                output.push('\n');
                stdout.write_all(output.as_bytes()).await?;
                stdout.flush().await?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle a raw JSON-RPC message
    ///
    /// Returns `None` for notifications.
    pub async fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<Value>(message) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => Some(JsonRpcResponse::error(
                None,
                JsonRpcError::parse_error(format!("Parse error: {}", e)),
            )),
        }
    }

    /// Handle an already-decoded JSON-RPC message
    pub async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(req) => req,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request(format!(
                    "Unsupported JSON-RPC version: {}",
                    request.jsonrpc
                )),
            ));
        }

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        Some(self.handle_request(request).await)
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            methods::INITIALIZED => info!("client initialized"),
            other => debug!(method = other, "ignoring notification"),
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!(method = %request.method, "handling request");

        let result = match request.method.as_str() {
            methods::INITIALIZE => to_result(&self.initialize_result()),
            methods::PING => Ok(json!({})),
            methods::LIST_TOOLS => to_result(&ListToolsResult {
                tools: self.dispatcher.catalog().list_tools(),
            }),
            methods::CALL_TOOL => self.handle_call_tool(request.params).await,
            methods::LIST_RESOURCES => to_result(&ListResourcesResult {
                resources: self.dispatcher.catalog().list_resources(),
            }),
            methods::READ_RESOURCE => self.handle_read_resource(request.params),
            _ => Err(JsonRpcError::method_not_found(&request.method)),
        };

        match result {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(error) => JsonRpcResponse::error(request.id, error),
        }
    }

    fn initialize_result(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {}),
                resources: Some(ResourcesCapability::default()),
            },
        }
    }

    /// Tool failures come back as `isError` results, not JSON-RPC errors
    async fn handle_call_tool(&self, params: Option<Value>) -> std::result::Result<Value, JsonRpcError> {
        let params: CallToolParams = decode_params(params)?;
        let result = self.dispatcher.call_tool(&params.name, params.arguments).await;
        to_result(&result)
    }

    fn handle_read_resource(&self, params: Option<Value>) -> std::result::Result<Value, JsonRpcError> {
        let params: ReadResourceParams = decode_params(params)?;
        let result = self.dispatcher.read_resource(&params.uri);

        if result.is_error {
            let message = result
                .error
                .clone()
                .unwrap_or_else(|| format!("Unknown resource: {}", params.uri));
            warn!(uri = %params.uri, "resource read failed");
            return Err(JsonRpcError::resource_not_found(
                message,
                json!({ "uri": params.uri, "contents": result.contents }),
            ));
        }

        to_result(&result)
    }
}

fn decode_params<T: for<'de> serde::Deserialize<'de>>(
    params: Option<Value>,
) -> std::result::Result<T, JsonRpcError> {
    let params = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn to_result<T: Serialize>(value: &T) -> std::result::Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}
