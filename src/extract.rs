//! Document text extraction seam.
//!
//! The protocol only ever sees extracted text; turning an uploaded file into
//! that text is a collaborator concern behind `DocumentExtractor`. A PDF
//! backend plugs in here without the rest of the crate noticing.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::ExtractError;

/// Turns an uploaded document into plain text.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extract text from the raw document bytes. Never panics; every failure
    /// is a distinct `ExtractError` the orchestrator can surface.
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Extractor for documents that are already plain UTF-8 text.
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let text = std::str::from_utf8(bytes).map_err(|e| ExtractError::Unreadable {
            format: "UTF-8 text".to_string(),
            reason: e.to_string(),
        })?;
        let normalized = normalize_extracted_text(text);
        if normalized.is_empty() {
            return Err(ExtractError::Empty);
        }
        Ok(normalized)
    }
}

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Normalize extractor output: unify line endings, collapse runs of blank
/// lines, trim the edges. Extracted PDF text tends to arrive ragged.
pub fn normalize_extracted_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    BLANK_RUNS
        .replace_all(&unified, "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_text_roundtrip() {
        let text = PlainTextExtractor
            .extract_text("Jane Doe\nStaff Engineer".as_bytes())
            .await
            .unwrap();
        assert_eq!(text, "Jane Doe\nStaff Engineer");
    }

    #[tokio::test]
    async fn invalid_utf8_is_unreadable() {
        let result = PlainTextExtractor.extract_text(&[0xff, 0xfe, 0x00]).await;
        assert!(matches!(result, Err(ExtractError::Unreadable { .. })));
    }

    #[tokio::test]
    async fn whitespace_only_is_empty() {
        let result = PlainTextExtractor.extract_text("  \n\n\t ".as_bytes()).await;
        assert!(matches!(result, Err(ExtractError::Empty)));
    }

    #[test]
    fn normalize_collapses_blank_runs() {
        let ragged = "Summary\r\n\r\n\r\n\r\nExperience\r\nAcme Corp\n\n\n\nEducation\n";
        assert_eq!(
            normalize_extracted_text(ragged),
            "Summary\n\nExperience\nAcme Corp\n\nEducation"
        );
    }
}
