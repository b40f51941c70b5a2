pub mod render;

use std::path::PathBuf;

use anyhow::Result;
use futures::StreamExt;
use tracing::{debug, info};

use crate::agent::normalize::parse_agent_message;
use crate::agent::types::{ChatPayload, Role, Turn};
use crate::agent::Agent;
use self::render::Renderer;

/// System prompt prepended to every agent invocation.
pub const INITIAL_PROMPT: &str = "You are a research assistant. Given a topic or an arXiv link, \
use the read-pdf tool to retrieve papers, summarize their content, and when asked, generate a \
PDF report. When a report has been written to disk, state its full path in your reply.";

/// Per-session mutable store: the transcript plus the most recently
/// announced PDF path. Owned by the single session processing the user's
/// interaction; nothing here is shared across sessions.
#[derive(Debug, Default)]
pub struct SessionState {
    pub transcript: Vec<Turn>,
    pub pdf_path: Option<PathBuf>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored path persists until overwritten by a later detection;
    /// there is no clear operation, so a stale path from an earlier turn
    /// surfaces again as long as the file still exists.
    pub fn record_pdf_path(&mut self, path: impl Into<PathBuf>) {
        self.pdf_path = Some(path.into());
    }
}

/// Drives one user turn through the agent and renders incremental output.
///
/// States are consumed strictly in emission order; each state is fully
/// handled, render included, before the next one is polled. An error from
/// the stream propagates out unhandled.
pub async fn run_turn<A: Agent, R: Renderer>(
    agent: &A,
    session: &mut SessionState,
    renderer: &mut R,
    input: &str,
) -> Result<()> {
    info!("User input: {}", input);
    session.transcript.push(Turn::user(input));
    renderer.render_user(input);

    let mut messages = Vec::with_capacity(session.transcript.len() + 1);
    messages.push(Turn::system(INITIAL_PROMPT));
    messages.extend(session.transcript.iter().cloned());
    let payload = ChatPayload { messages };

    info!("Starting agent stream");
    let mut stream = agent.stream(payload);
    let mut buffer = String::new();

    while let Some(state) = stream.next().await {
        let state = state?;
        let Some(message) = state.latest() else {
            continue;
        };

        for tool_call in &message.tool_calls {
            info!("Tool called: {}", tool_call.name);
        }

        if message.role != Role::Assistant || message.content.is_empty() {
            continue;
        }

        let response = parse_agent_message(message);
        if let Some(status) = response.status {
            debug!("Response status: {:?}", status);
        }

        if !response.text.is_empty() {
            buffer.push_str(&response.text);
            buffer.push_str("\n\n");
            renderer.render_assistant(&buffer);
        }

        if let Some(path) = response.pdf_path {
            info!("PDF path detected: {}", path);
            session.record_pdf_path(path);
        }
    }

    let final_text = buffer.trim();
    if !final_text.is_empty() {
        session.transcript.push(Turn::assistant(final_text));
    } else {
        // An agent call that produced no text is a no-op response, not an
        // error; the user turn stands alone in the transcript.
        debug!("Agent stream produced no displayable text");
    }

    Ok(())
}
