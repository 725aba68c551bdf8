//! Document text extraction for uploaded résumés.
//!
//! PDF parsing is CPU-bound and can panic on hostile input, so it always runs
//! inside `tokio::task::spawn_blocking`; a panic surfaces as `DocumentError::Unreadable`.

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("the uploaded file is empty")]
    Empty,

    #[error("could not read PDF: {0}")]
    Unreadable(String),
}

/// Extracts plain text from a PDF payload, pages concatenated in order.
pub async fn extract_pdf_text(payload: Bytes) -> Result<String, DocumentError> {
    if payload.is_empty() {
        return Err(DocumentError::Empty);
    }

    let size = payload.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&payload))
        .await
        .map_err(|e| DocumentError::Unreadable(format!("PDF parser aborted: {e}")))?
        .map_err(|e| DocumentError::Unreadable(e.to_string()))?;

    debug!(bytes = size, chars = text.chars().count(), "extracted PDF text");
    Ok(text)
}

/// True when extraction produced nothing worth parsing.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_payload_is_rejected() {
        let err = extract_pdf_text(Bytes::new()).await.unwrap_err();
        assert!(matches!(err, DocumentError::Empty));
    }

    #[tokio::test]
    async fn test_non_pdf_payload_is_unreadable() {
        let err = extract_pdf_text(Bytes::from_static(b"definitely not a pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Unreadable(_)));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(" \n\t "));
        assert!(!is_blank(" Name: Jane "));
    }
}
