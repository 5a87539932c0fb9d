//! Turning uploaded files into plain text.

use wf_domain::error::Result;

/// Converts an uploaded artifact into plain text.
///
/// Implementations return an empty string when they cannot read the
/// declared type; an error is reserved for a failure of the extractor itself.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], declared_type: &str) -> Result<String>;
}

/// Extractor for text-like uploads (`text/*`, `application/json`).
///
/// Binary formats such as PDF need an external extraction service; for
/// those this extractor yields an empty string.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn supports(declared_type: &str) -> bool {
        let mime = declared_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        mime.starts_with("text/") || mime == "application/json"
    }
}

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8], declared_type: &str) -> Result<String> {
        if !Self::supports(declared_type) {
            tracing::debug!(declared_type, "no text extraction for declared type");
            return Ok(String::new());
        }
        let text = String::from_utf8_lossy(bytes).replace("\r\n", "\n");
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }
}

/// Guess a MIME type from a file name's extension.
pub fn mime_from_path(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" | "text" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_utf8_text_and_normalizes_crlf() {
        let text = PlainTextExtractor
            .extract(b"Skills:\r\n- Python\r\n", "text/plain; charset=utf-8")
            .unwrap();
        assert_eq!(text, "Skills:\n- Python\n");
    }

    #[test]
    fn strips_byte_order_mark() {
        let text = PlainTextExtractor
            .extract("\u{feff}Resume".as_bytes(), "text/markdown")
            .unwrap();
        assert_eq!(text, "Resume");
    }

    #[test]
    fn unsupported_type_yields_empty_text() {
        let text = PlainTextExtractor
            .extract(b"%PDF-1.7 ...", "application/pdf")
            .unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn mime_guess_by_extension() {
        assert_eq!(mime_from_path("cv.TXT"), "text/plain");
        assert_eq!(mime_from_path("notes.md"), "text/markdown");
        assert_eq!(mime_from_path("resume.pdf"), "application/pdf");
        assert_eq!(mime_from_path("noext"), "application/octet-stream");
    }
}
