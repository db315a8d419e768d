use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::{extension_of, ExtractionError, TextExtractor};

/// Reads the embedded text layer of typed PDFs. Scanned or handwritten
/// documents usually have none; use the vision backend for those.
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    fn backend(&self) -> &'static str {
        "pdf_text"
    }

    async fn extract(&self, artifact: &Path) -> Result<String, ExtractionError> {
        let extension = extension_of(artifact);
        if extension != "pdf" {
            return Err(ExtractionError::UnsupportedMediaType(extension));
        }

        let path = artifact.to_path_buf();
        let text = tokio::task::spawn_blocking(move || {
            let bytes = std::fs::read(&path).map_err(|source| ExtractionError::Io {
                path: path.clone(),
                source,
            })?;
            pdf_extract::extract_text_from_mem(&bytes)
                .map_err(|e| ExtractionError::Pdf(e.to_string()))
        })
        .await??;

        debug!(
            "Extracted {} characters from the text layer of {}",
            text.chars().count(),
            artifact.display()
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = PdfTextExtractor
            .extract(&dir.path().join("absent.pdf"))
            .await;
        assert!(matches!(result, Err(ExtractionError::Io { .. })));
    }

    #[tokio::test]
    async fn test_non_pdf_bytes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"plain text, not a PDF").unwrap();

        let result = PdfTextExtractor.extract(&path).await;
        assert!(matches!(result, Err(ExtractionError::Pdf(_))));
    }

    #[tokio::test]
    async fn test_images_are_unsupported() {
        let result = PdfTextExtractor.extract(Path::new("scan.png")).await;
        assert!(matches!(
            result,
            Err(ExtractionError::UnsupportedMediaType(ext)) if ext == "png"
        ));
    }
}
