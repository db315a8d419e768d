//! Collaborators upstream of the submission store.
//!
//! `Renderer` turns an uploaded document into the artifact text is read from;
//! `TextExtractor` reads the text. Both are carried in `AppState` as trait
//! objects and swapped at startup via `EXTRACTION_BACKEND`.
//! A failed extraction is reported once and never retried.

pub mod pdf_text;
pub mod prompts;
pub mod vision;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::llm_client::LlmError;

pub use pdf_text::PdfTextExtractor;
pub use vision::VisionTextExtractor;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF text layer could not be read: {0}")]
    Pdf(String),

    #[error("unsupported artifact type '{0}'")]
    UnsupportedMediaType(String),

    #[error("vision transcription failed: {0}")]
    Llm(#[from] LlmError),

    #[error("extraction task aborted: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Short backend label for logs and responses ("pdf_text" | "vision").
    fn backend(&self) -> &'static str;

    async fn extract(&self, artifact: &Path) -> Result<String, ExtractionError>;
}

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Produces the artifact that text is extracted from, for the student `roll_no`.
    async fn render(&self, source: &Path, roll_no: &str) -> Result<PathBuf, ExtractionError>;
}

/// Hands the uploaded document to the extractor unchanged.
/// Both extractors read PDFs directly, so no page stitching is needed.
pub struct PassthroughRenderer;

#[async_trait]
impl Renderer for PassthroughRenderer {
    async fn render(&self, source: &Path, _roll_no: &str) -> Result<PathBuf, ExtractionError> {
        Ok(source.to_path_buf())
    }
}

/// Lowercased file extension, or an empty string when there is none.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough_renderer_returns_source() {
        let source = Path::new("uploads/21CS001_essay.pdf");
        let rendered = PassthroughRenderer.render(source, "21CS001").await.unwrap();
        assert_eq!(rendered, source);
    }

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(extension_of(Path::new("scan.JPG")), "jpg");
        assert_eq!(extension_of(Path::new("README")), "");
    }
}
