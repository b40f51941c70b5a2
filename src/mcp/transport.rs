use anyhow::{anyhow, Result};
use futures::{SinkExt, StreamExt};
use tokio::io::BufReader;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, error};

use super::types::{McpMessage, McpNotification, McpRequest, McpResponse};

/// Line-delimited JSON-RPC over stdio. Stdout carries responses only;
/// all logging goes to stderr.
pub struct StdioTransport {
    reader: FramedRead<BufReader<tokio::io::Stdin>, LinesCodec>,
    writer: FramedWrite<tokio::io::Stdout, LinesCodec>,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self {
            reader: FramedRead::new(BufReader::new(tokio::io::stdin()), LinesCodec::new()),
            writer: FramedWrite::new(tokio::io::stdout(), LinesCodec::new()),
        }
    }

    pub async fn read_message(&mut self) -> Result<Option<McpMessage>> {
        match self.reader.next().await {
            Some(Ok(line)) => {
                debug!("Received: {}", line);
                Self::classify_line(&line).map(Some)
            }
            Some(Err(e)) => {
                error!("Error reading from stdin: {}", e);
                Err(anyhow!("Transport error: {}", e))
            }
            None => {
                debug!("EOF reached");
                Ok(None)
            }
        }
    }

    /// A message with an `id` field is a request; without one it is a
    /// notification.
    fn classify_line(line: &str) -> Result<McpMessage> {
        let value: serde_json::Value =
            serde_json::from_str(line).map_err(|e| anyhow!("Invalid JSON: {}", e))?;

        let Some(obj) = value.as_object() else {
            return Err(anyhow!("Invalid JSON-RPC message structure"));
        };

        if obj.contains_key("id") {
            serde_json::from_value::<McpRequest>(value)
                .map(McpMessage::Request)
                .map_err(|e| anyhow!("Invalid JSON-RPC request: {}", e))
        } else {
            serde_json::from_value::<McpNotification>(value)
                .map(McpMessage::Notification)
                .map_err(|e| anyhow!("Invalid JSON-RPC notification: {}", e))
        }
    }

    pub async fn write_response(&mut self, response: McpResponse) -> Result<()> {
        let json = serde_json::to_string(&response)?;
        debug!("Sending: {}", json);
        self.writer.send(json).await?;
        Ok(())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_with_id_is_a_request() {
        let line = r#"{"jsonrpc":"2.0","id":1,"method":"ping","params":null}"#;
        match StdioTransport::classify_line(line).expect("valid message") {
            McpMessage::Request(req) => assert_eq!(req.method, "ping"),
            McpMessage::Notification(_) => panic!("expected request"),
        }
    }

    #[test]
    fn line_without_id_is_a_notification() {
        let line = r#"{"jsonrpc":"2.0","method":"notifications/initialized","params":null}"#;
        match StdioTransport::classify_line(line).expect("valid message") {
            McpMessage::Notification(n) => assert_eq!(n.method, "notifications/initialized"),
            McpMessage::Request(_) => panic!("expected notification"),
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(StdioTransport::classify_line("not json").is_err());
        assert!(StdioTransport::classify_line("[1,2,3]").is_err());
    }
}
