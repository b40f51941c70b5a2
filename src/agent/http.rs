use anyhow::{anyhow, Context, Result};
use async_stream::try_stream;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::Client;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;
use tracing::{debug, info, warn};

use super::types::{AgentState, ChatPayload};
use super::Agent;

/// Client for the agent invocation boundary: the agent service accepts a
/// message list and answers with newline-delimited JSON, one intermediate
/// state per line.
pub struct HttpAgent {
    client: Client,
    endpoint: String,
}

impl HttpAgent {
    /// The agent call blocks the relay for as long as the agent thinks, so
    /// the client is built without a request timeout.
    pub fn new(endpoint: String) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to create HTTP client for agent endpoint")?;
        Ok(Self { client, endpoint })
    }

    fn parse_state(line: &str) -> Result<AgentState> {
        serde_json::from_str::<AgentState>(line)
            .map_err(|e| anyhow!("invalid agent state line: {}", e))
    }

    fn check_status(status: reqwest::StatusCode) -> Result<()> {
        if status.is_success() {
            return Ok(());
        }
        warn!("Agent endpoint returned HTTP {}", status.as_u16());
        Err(anyhow!(
            "agent endpoint returned HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown")
        ))
    }
}

impl Agent for HttpAgent {
    fn stream(&self, payload: ChatPayload) -> BoxStream<'_, Result<AgentState>> {
        let stream = try_stream! {
            info!("Invoking agent at {}", self.endpoint);

            let response = self
                .client
                .post(&self.endpoint)
                .json(&payload)
                .send()
                .await
                .context("agent request failed")?;

            Self::check_status(response.status())?;

            let body = response
                .bytes_stream()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
            let mut lines = FramedRead::new(StreamReader::new(body), LinesCodec::new());

            while let Some(line) = lines.next().await {
                let line = line.context("error reading agent stream")?;
                if line.trim().is_empty() {
                    continue;
                }
                debug!("Agent state line: {} bytes", line.len());
                yield Self::parse_state(&line)?;
            }

            info!("Agent stream exhausted");
        };

        stream.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::MessageContent;

    #[test]
    fn parses_state_line() {
        let line = r#"{"messages":[{"role":"assistant","content":"Working on it"}]}"#;
        let state = HttpAgent::parse_state(line).expect("state expected");
        let latest = state.latest().expect("one message");
        match &latest.content {
            MessageContent::Text(text) => assert_eq!(text, "Working on it"),
            MessageContent::Parts(_) => panic!("expected string content"),
        }
        assert!(latest.tool_calls.is_empty());
    }

    #[test]
    fn parses_structured_content_and_tool_calls() {
        let line = r#"{"messages":[{"role":"assistant","content":[{"type":"text","text":"hi"},{"type":"image"}],"tool_calls":[{"name":"read-pdf"}]}]}"#;
        let state = HttpAgent::parse_state(line).expect("state expected");
        let latest = state.latest().expect("one message");
        assert_eq!(latest.tool_calls.len(), 1);
        assert_eq!(latest.tool_calls[0].name, "read-pdf");
        match &latest.content {
            MessageContent::Parts(parts) => assert_eq!(parts.len(), 2),
            MessageContent::Text(_) => panic!("expected parts content"),
        }
    }

    #[test]
    fn rejects_malformed_line() {
        assert!(HttpAgent::parse_state("not json").is_err());
    }
}
