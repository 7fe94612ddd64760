//! Text extraction — turns an uploaded PDF into plain text for scoring.
//!
//! Each resume is written to its own temporary file, extracted on the blocking
//! pool, and the file is removed when the `NamedTempFile` drops, whatever the
//! extraction result.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::models::resume::ResumeFile;

/// Extraction failure. The message is what users see next to the resume.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error reading PDF: {0}")]
pub struct ExtractionError(pub String);

/// Implement this to swap the PDF backend. Implementations are blocking.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// `pdf-extract` backed extractor. Pages are concatenated in document order;
/// pages without a text layer contribute nothing.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        pdf_extract::extract_text(path).map_err(|e| ExtractionError(e.to_string()))
    }
}

/// Materializes `file` to a scoped temp file and extracts its text.
///
/// Panics inside the PDF library are reported as extraction errors rather
/// than tearing down the batch.
pub async fn extract_resume(
    extractor: Arc<dyn TextExtractor>,
    file: &ResumeFile,
    temp_dir: Option<PathBuf>,
) -> Result<String, ExtractionError> {
    let bytes = file.bytes.clone();
    let file_name = file.file_name.clone();

    let joined = tokio::task::spawn_blocking(move || {
        let mut builder = tempfile::Builder::new();
        builder.prefix("resume-").suffix(".pdf");
        let mut tmp = match &temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| ExtractionError(format!("could not create temp file: {e}")))?;

        tmp.write_all(&bytes)
            .and_then(|_| tmp.flush())
            .map_err(|e| ExtractionError(format!("could not write temp file: {e}")))?;

        debug!("Extracting {} via {}", file_name, tmp.path().display());
        extractor.extract(tmp.path())
    })
    .await;

    match joined {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(ExtractionError(format!(
            "PDF parser panicked: {}",
            panic_message(e.into_panic())
        ))),
        Err(e) => Err(ExtractionError(format!("extraction task failed: {e}"))),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reads the temp file back as UTF-8, so tests can fake PDFs with plain text.
    struct EchoExtractor;

    impl TextExtractor for EchoExtractor {
        fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
            std::fs::read_to_string(path).map_err(|e| ExtractionError(e.to_string()))
        }
    }

    struct PanickingExtractor;

    impl TextExtractor for PanickingExtractor {
        fn extract(&self, _path: &Path) -> Result<String, ExtractionError> {
            panic!("unexpected object stream");
        }
    }

    fn temp_dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_extraction_error_message_format() {
        let err = ExtractionError("invalid file header".to_string());
        assert_eq!(err.to_string(), "Error reading PDF: invalid file header");
    }

    #[tokio::test]
    async fn test_extract_resume_reads_temp_file_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let file = ResumeFile::new("a.pdf", "Go microservices".as_bytes().to_vec());

        let text = extract_resume(Arc::new(EchoExtractor), &file, Some(dir.path().to_path_buf()))
            .await
            .unwrap();

        assert_eq!(text, "Go microservices");
        assert!(temp_dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_panicking_extractor_becomes_error_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let file = ResumeFile::new("b.pdf", b"%PDF-1.4".to_vec());

        let err = extract_resume(
            Arc::new(PanickingExtractor),
            &file,
            Some(dir.path().to_path_buf()),
        )
        .await
        .unwrap_err();

        assert!(err.0.contains("unexpected object stream"), "{err}");
        assert!(temp_dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_pdf_extractor_rejects_garbage() {
        let file = ResumeFile::new("corrupt.pdf", b"this is not a pdf".to_vec());
        let err = extract_resume(Arc::new(PdfTextExtractor), &file, None)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Error reading PDF: "));
    }

    #[tokio::test]
    async fn test_missing_temp_dir_is_reported() {
        let file = ResumeFile::new("c.pdf", b"text".to_vec());
        let err = extract_resume(
            Arc::new(EchoExtractor),
            &file,
            Some(PathBuf::from("/nonexistent/ats-scan-temp")),
        )
        .await
        .unwrap_err();
        assert!(err.0.contains("could not create temp file"));
    }
}
