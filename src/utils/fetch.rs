use once_cell::sync::Lazy;
use reqwest::Client;
use thiserror::Error;
use tracing::{error, info, warn};

use super::pdf::{extract_text_from_mem, looks_like_pdf};

#[derive(Error, Debug)]
pub enum PdfFetchError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("PDF parse error: {0}")]
    Parse(String),
}

// Shared client. No request timeout: the tool blocks its caller until the
// transfer completes, and large papers can take a while.
static HTTP_CLIENT: Lazy<Client> =
    Lazy::new(|| Client::builder().build().expect("Failed to create HTTP client"));

/// Downloads the PDF at `url` and returns the trimmed concatenation of
/// every page's extracted text.
///
/// Every invocation re-fetches and re-parses from scratch: no retry, no
/// partial-result fallback, no caching. Any failure is logged with its
/// message and propagated unchanged; the calling agent owns recovery.
pub async fn fetch_pdf_text(url: &url::Url) -> Result<String, PdfFetchError> {
    info!(target: "read_pdf", url = %url, "Starting PDF fetch");

    let result = fetch_and_extract(url).await;
    if let Err(ref e) = result {
        error!(target: "read_pdf", url = %url, "An error occurred while reading the PDF: {}", e);
    }
    result
}

async fn fetch_and_extract(url: &url::Url) -> Result<String, PdfFetchError> {
    let response = HTTP_CLIENT.get(url.as_str()).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(PdfFetchError::Http {
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        });
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|ct| ct.to_str().ok())
        .map(|s| s.to_string());

    let body = response.bytes().await?;
    info!(target: "read_pdf", url = %url, size = body.len(), ct = ?content_type, "PDF fetch completed");

    let head_len = std::cmp::min(512, body.len());
    if !looks_like_pdf(content_type.as_deref(), &body[..head_len]) {
        // The parser is the authority on validity; this is a heads-up only.
        warn!(target: "read_pdf", url = %url, "Response does not look like a PDF; attempting to parse anyway");
    }

    let started = std::time::Instant::now();
    let text = extract_text_from_mem(&body).map_err(|e| PdfFetchError::Parse(e.to_string()))?;
    let text = text.trim().to_string();
    info!(
        target: "read_pdf",
        url = %url,
        elapsed_ms = started.elapsed().as_millis() as u64,
        chars = text.len(),
        "Successfully extracted text from PDF"
    );

    Ok(text)
}
