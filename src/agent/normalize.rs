use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{AgentMessage, MessageContent};

/// Drive-letter-prefixed Windows path ending in `.pdf`. The report writer
/// runs on Windows hosts, so generated files are always announced this way.
static PDF_PATH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z]:\\.*?\.pdf").expect("valid pdf path regex"));

/// Coarse lifecycle hint derived from the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// The agent announced it is re-rendering or regenerating the report.
    RerenderingPdf,
    /// The message carries a path to a freshly generated PDF.
    PdfGenerated,
}

/// Uniform view of one heterogeneous agent message. Derived fresh per
/// message and never persisted; only `text` and `pdf_path` feed back into
/// session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResponse {
    pub text: String,
    pub status: Option<ResponseStatus>,
    pub pdf_path: Option<String>,
}

/// Normalizes one agent message into an [`AgentResponse`].
///
/// Structured content concatenates the `text` field of every `"text"`-typed
/// part in order, silently ignoring the rest; string content is used as-is.
/// The combined text is trimmed before path and status detection. Pure
/// function of the message content; malformed shapes degrade to empty text
/// rather than failing.
pub fn parse_agent_message(message: &AgentMessage) -> AgentResponse {
    let text = match &message.content {
        MessageContent::Parts(parts) => parts
            .iter()
            .filter(|part| part.part_type == "text")
            .map(|part| part.text.as_str())
            .collect::<String>(),
        MessageContent::Text(s) => s.clone(),
    };
    let text = text.trim().to_string();

    let pdf_path = PDF_PATH_REGEX
        .find(&text)
        .map(|m| m.as_str().to_string());

    // Re-render announcements win over a path present in the same message.
    let lowered = text.to_lowercase();
    let status = if lowered.contains("re-render") || lowered.contains("regenerate") {
        Some(ResponseStatus::RerenderingPdf)
    } else if pdf_path.is_some() {
        Some(ResponseStatus::PdfGenerated)
    } else {
        None
    };

    AgentResponse {
        text,
        status,
        pdf_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::{ContentPart, Role, ToolCallInfo};

    fn message(content: MessageContent) -> AgentMessage {
        AgentMessage {
            role: Role::Assistant,
            content,
            tool_calls: Vec::new(),
        }
    }

    fn text_part(text: &str) -> ContentPart {
        ContentPart {
            part_type: "text".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn string_content_is_trimmed_verbatim() {
        let msg = message(MessageContent::Text("  Here is the summary.  ".into()));
        let response = parse_agent_message(&msg);
        assert_eq!(response.text, "Here is the summary.");
        assert_eq!(response.status, None);
        assert_eq!(response.pdf_path, None);
    }

    #[test]
    fn parts_content_concatenates_text_parts_in_order() {
        let msg = message(MessageContent::Parts(vec![
            text_part("First. "),
            ContentPart {
                part_type: "image".to_string(),
                text: "ignored".to_string(),
            },
            text_part("Second."),
        ]));
        let response = parse_agent_message(&msg);
        assert_eq!(response.text, "First. Second.");
    }

    #[test]
    fn detects_windows_pdf_path() {
        let msg = message(MessageContent::Text(
            "Saved the report to C:\\Users\\x\\out.pdf for you.".into(),
        ));
        let response = parse_agent_message(&msg);
        assert_eq!(response.pdf_path.as_deref(), Some("C:\\Users\\x\\out.pdf"));
        assert_eq!(response.status, Some(ResponseStatus::PdfGenerated));
    }

    #[test]
    fn ignores_unix_paths() {
        let msg = message(MessageContent::Text("Saved to /home/x/out.pdf".into()));
        let response = parse_agent_message(&msg);
        assert_eq!(response.pdf_path, None);
        assert_eq!(response.status, None);
    }

    #[test]
    fn rerender_wins_over_generated_path() {
        let msg = message(MessageContent::Text(
            "I will regenerate C:\\out\\report.pdf with the fixes.".into(),
        ));
        let response = parse_agent_message(&msg);
        assert_eq!(response.status, Some(ResponseStatus::RerenderingPdf));
        // The path is still reported; only the status defers to the re-render.
        assert_eq!(response.pdf_path.as_deref(), Some("C:\\out\\report.pdf"));
    }

    #[test]
    fn rerender_detection_is_case_insensitive() {
        let msg = message(MessageContent::Text("Re-Rendering the PDF now".into()));
        let response = parse_agent_message(&msg);
        assert_eq!(response.status, Some(ResponseStatus::RerenderingPdf));
    }

    #[test]
    fn whitespace_only_content_degrades_to_empty() {
        let msg = message(MessageContent::Text("   \n\t  ".into()));
        let response = parse_agent_message(&msg);
        assert_eq!(response.text, "");
        assert_eq!(response.status, None);
        assert_eq!(response.pdf_path, None);
    }

    #[test]
    fn empty_parts_list_degrades_to_empty() {
        let msg = message(MessageContent::Parts(Vec::new()));
        let response = parse_agent_message(&msg);
        assert_eq!(response.text, "");
        assert_eq!(response.status, None);
        assert_eq!(response.pdf_path, None);
    }

    #[test]
    fn normalization_is_idempotent() {
        let msg = AgentMessage {
            role: Role::Assistant,
            content: MessageContent::Text("Report at C:\\out\\summary.pdf".into()),
            tool_calls: vec![ToolCallInfo {
                name: "read-pdf".to_string(),
                arguments: None,
            }],
        };
        let first = parse_agent_message(&msg);
        let second = parse_agent_message(&msg);
        assert_eq!(first, second);
    }
}
