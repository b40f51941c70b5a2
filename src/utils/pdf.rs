// Minimal PDF helpers backing the read-pdf tool.

/// Extracts the visible text of every page, in document order, from a PDF
/// held fully in memory. Page iteration and per-page text extraction are
/// the parser's; pages come back joined with newlines.
pub fn extract_text_from_mem(bytes: &[u8]) -> Result<String, pdf_extract::OutputError> {
    pdf_extract::extract_text_from_mem(bytes)
}

/// Returns true if the content-type or leading bytes look like a PDF.
/// - Content-Type: application/pdf (case-insensitive, substring match)
/// - Magic bytes: %PDF-
pub fn looks_like_pdf(content_type: Option<&str>, head: &[u8]) -> bool {
    let ct = content_type.unwrap_or("").to_ascii_lowercase();
    ct.contains("application/pdf") || head.starts_with(b"%PDF-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_identify_pdf() {
        assert!(looks_like_pdf(None, b"%PDF-1.7 rest"));
        assert!(!looks_like_pdf(None, b"<html>"));
    }

    #[test]
    fn content_type_identifies_pdf() {
        assert!(looks_like_pdf(Some("application/pdf"), b""));
        assert!(looks_like_pdf(Some("Application/PDF; charset=binary"), b""));
        assert!(!looks_like_pdf(Some("text/html"), b"<html>"));
    }

    #[test]
    fn non_pdf_bytes_fail_extraction() {
        assert!(extract_text_from_mem(b"this is not a pdf").is_err());
    }
}
