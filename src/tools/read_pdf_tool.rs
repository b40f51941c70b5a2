use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::mcp::types::{CallToolResult, ToolAnnotations, ToolDefinition};
use crate::utils::fetch::fetch_pdf_text;

pub static READ_PDF_TOOL_DEFINITION: Lazy<ToolDefinition> = Lazy::new(|| ToolDefinition {
    name: "read-pdf".to_string(),
    description: "Read and extract text from a PDF file given its URL".to_string(),
    input_schema: json!({
        "type": "object",
        "properties": {
            "url": {
                "type": "string",
                "description": "The URL of the PDF file to read"
            }
        },
        "required": ["url"]
    }),
    annotations: Some(ToolAnnotations {
        title: Some("Read PDF".to_string()),
        read_only_hint: Some(true),
        open_world_hint: Some(true),
    }),
});

#[derive(Debug, Deserialize)]
struct ReadPdfParams {
    url: String,
}

pub struct ReadPdfTool;

impl ReadPdfTool {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, arguments: Option<serde_json::Value>) -> CallToolResult {
        let params = match arguments {
            Some(args) => match serde_json::from_value::<ReadPdfParams>(args) {
                Ok(params) => params,
                Err(e) => {
                    error!("Invalid read-pdf parameters: {}", e);
                    return CallToolResult::error(format!("Invalid parameters: {}", e));
                }
            },
            None => {
                return CallToolResult::error("Missing required parameters");
            }
        };

        let parsed_url = match url::Url::parse(&params.url) {
            Ok(u) => u,
            Err(e) => {
                return CallToolResult::error(format!("Invalid URL: {}", e));
            }
        };

        info!("Reading PDF from URL: {}", params.url);

        match fetch_pdf_text(&parsed_url).await {
            Ok(text) => CallToolResult::success(text),
            // fetch_pdf_text already logged the failure; pass it through.
            Err(e) => CallToolResult::error(format!("Error reading PDF: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_arguments_is_an_error() {
        let tool = ReadPdfTool::new();
        let result = tool.execute(None).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.content[0].text, "Missing required parameters");
    }

    #[tokio::test]
    async fn rejects_wrong_parameter_shape() {
        let tool = ReadPdfTool::new();
        let result = tool.execute(Some(json!({"link": "x"}))).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result.content[0].text.starts_with("Invalid parameters:"));
    }

    #[tokio::test]
    async fn rejects_unparseable_url() {
        let tool = ReadPdfTool::new();
        let result = tool.execute(Some(json!({"url": "not a url"}))).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result.content[0].text.starts_with("Invalid URL:"));
    }
}
