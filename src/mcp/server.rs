use anyhow::Result;
use tracing::{debug, info, warn};

use super::transport::StdioTransport;
use super::types::*;
use crate::tools::read_pdf_tool::{ReadPdfTool, READ_PDF_TOOL_DEFINITION};

/// MCP stdio server exposing the read-pdf tool to the research agent.
pub struct McpServer {
    transport: StdioTransport,
    initialized: bool,
}

impl McpServer {
    pub fn new() -> Self {
        Self {
            transport: StdioTransport::new(),
            initialized: false,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        info!("MCP tool server started and listening on stdio");

        loop {
            match self.transport.read_message().await? {
                Some(McpMessage::Request(request)) => {
                    let response = self.handle_request(request).await;
                    self.transport.write_response(response).await?;
                }
                Some(McpMessage::Notification(notification)) => {
                    self.handle_notification(notification);
                }
                None => {
                    info!("Client disconnected");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_request(&mut self, request: McpRequest) -> McpResponse {
        let id = Self::ensure_valid_id(request.id.clone());

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "ping" => McpResponse::success(id, serde_json::json!({})),
            other => {
                warn!("Unknown request method: {}", other);
                McpResponse::failure(id, METHOD_NOT_FOUND, "Method not found")
            }
        }
    }

    fn handle_notification(&mut self, notification: McpNotification) {
        debug!("Received notification: {}", notification.method);

        match notification.method.as_str() {
            "notifications/initialized" => {
                info!("Client initialization completed");
                self.initialized = true;
            }
            "notifications/cancelled" => {
                debug!("Request cancelled notification received");
            }
            other => {
                warn!("Unknown notification method: {}", other);
            }
        }
    }

    // JSON-RPC ids must round-trip; null or absent ids are normalized.
    fn ensure_valid_id(id: Option<serde_json::Value>) -> serde_json::Value {
        match id {
            Some(serde_json::Value::Null) | None => serde_json::Value::String("0".to_string()),
            Some(value) => value,
        }
    }

    fn handle_initialize(
        &mut self,
        id: serde_json::Value,
        params: Option<serde_json::Value>,
    ) -> McpResponse {
        let Some(params) = params else {
            return McpResponse::failure(id, INVALID_PARAMS, "Missing params");
        };

        if let Err(e) = serde_json::from_value::<InitializeParams>(params) {
            return McpResponse::failure(id, INVALID_PARAMS, format!("Invalid params: {}", e));
        }

        let result = InitializeResult {
            protocol_version: "2024-11-05".to_string(),
            server_info: ServerInfo {
                name: "Research Relay PDF Tools".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "PDF reading tools for the research agent".to_string(),
                ),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(true),
                }),
            },
        };

        match serde_json::to_value(result) {
            Ok(value) => McpResponse::success(id, value),
            Err(e) => McpResponse::failure(id, INVALID_PARAMS, format!("Serialization error: {}", e)),
        }
    }

    fn handle_list_tools(&self, id: serde_json::Value) -> McpResponse {
        let result = ListToolsResult {
            tools: vec![READ_PDF_TOOL_DEFINITION.clone()],
        };

        match serde_json::to_value(result) {
            Ok(value) => McpResponse::success(id, value),
            Err(e) => McpResponse::failure(id, INVALID_PARAMS, format!("Serialization error: {}", e)),
        }
    }

    async fn handle_call_tool(
        &self,
        id: serde_json::Value,
        params: Option<serde_json::Value>,
    ) -> McpResponse {
        let Some(params) = params else {
            return McpResponse::failure(id, INVALID_PARAMS, "Missing params");
        };

        let call_params = match serde_json::from_value::<CallToolParams>(params) {
            Ok(p) => p,
            Err(e) => {
                return McpResponse::failure(id, INVALID_PARAMS, format!("Invalid params: {}", e))
            }
        };

        let result = match call_params.name.as_str() {
            "read-pdf" => {
                let tool = ReadPdfTool::new();
                tool.execute(call_params.arguments).await
            }
            other => CallToolResult::error(format!("Tool not found: {}", other)),
        };

        match serde_json::to_value(result) {
            Ok(value) => McpResponse::success(id, value),
            Err(e) => McpResponse::failure(id, INVALID_PARAMS, format!("Serialization error: {}", e)),
        }
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_missing_ids_are_normalized() {
        assert_eq!(
            McpServer::ensure_valid_id(None),
            serde_json::Value::String("0".to_string())
        );
        assert_eq!(
            McpServer::ensure_valid_id(Some(serde_json::Value::Null)),
            serde_json::Value::String("0".to_string())
        );
        assert_eq!(
            McpServer::ensure_valid_id(Some(serde_json::json!(7))),
            serde_json::json!(7)
        );
    }

    #[tokio::test]
    async fn lists_the_read_pdf_tool() {
        let server = McpServer::new();
        let response = server.handle_list_tools(serde_json::json!(1));
        let result = response.result.expect("result expected");
        let tools = result["tools"].as_array().expect("tools array");
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "read-pdf");
    }

    #[tokio::test]
    async fn unknown_tool_call_is_a_tool_error() {
        let server = McpServer::new();
        let response = server
            .handle_call_tool(
                serde_json::json!(2),
                Some(serde_json::json!({"name": "no-such-tool"})),
            )
            .await;
        let result = response.result.expect("tool errors ride in result");
        assert_eq!(result["isError"], true);
    }
}
