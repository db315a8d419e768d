use std::path::Path;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::info;

use super::prompts::{TRANSCRIBE_INSTRUCTION, TRANSCRIBE_SYSTEM};
use super::{extension_of, ExtractionError, TextExtractor};
use crate::llm_client::{Base64Source, ContentPart, LlmClient};

/// Transcribes handwritten or scanned submissions through the LLM client.
pub struct VisionTextExtractor(pub LlmClient);

#[async_trait]
impl TextExtractor for VisionTextExtractor {
    fn backend(&self) -> &'static str {
        "vision"
    }

    async fn extract(&self, artifact: &Path) -> Result<String, ExtractionError> {
        let media = media_part_for(&extension_of(artifact))?;

        let bytes = tokio::fs::read(artifact)
            .await
            .map_err(|source| ExtractionError::Io {
                path: artifact.to_path_buf(),
                source,
            })?;
        let encoded = STANDARD.encode(&bytes);

        let content = [
            media(encoded),
            ContentPart::Text {
                text: TRANSCRIBE_INSTRUCTION.to_string(),
            },
        ];
        let text = self.0.call_text(&content, TRANSCRIBE_SYSTEM).await?;

        info!(
            "Transcribed {} characters from {}",
            text.chars().count(),
            artifact.display()
        );
        Ok(text)
    }
}

/// Maps a file extension to the content block that carries it.
fn media_part_for(extension: &str) -> Result<fn(String) -> ContentPart, ExtractionError> {
    let part: fn(String) -> ContentPart = match extension {
        "pdf" => |data| ContentPart::Document {
            source: Base64Source::new("application/pdf", data),
        },
        "png" => |data| ContentPart::Image {
            source: Base64Source::new("image/png", data),
        },
        "jpg" | "jpeg" => |data| ContentPart::Image {
            source: Base64Source::new("image/jpeg", data),
        },
        "webp" => |data| ContentPart::Image {
            source: Base64Source::new("image/webp", data),
        },
        "gif" => |data| ContentPart::Image {
            source: Base64Source::new("image/gif", data),
        },
        other => return Err(ExtractionError::UnsupportedMediaType(other.to_string())),
    };
    Ok(part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pdf_becomes_document_block() {
        let part = media_part_for("pdf").unwrap()("AAAA".to_string());
        assert_eq!(
            serde_json::to_value(part).unwrap()["source"]["media_type"],
            json!("application/pdf")
        );
    }

    #[test]
    fn test_jpeg_becomes_image_block() {
        let part = media_part_for("jpeg").unwrap()("AAAA".to_string());
        let value = serde_json::to_value(part).unwrap();
        assert_eq!(value["type"], json!("image"));
        assert_eq!(value["source"]["media_type"], json!("image/jpeg"));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        assert!(matches!(
            media_part_for("docx"),
            Err(ExtractionError::UnsupportedMediaType(ext)) if ext == "docx"
        ));
    }
}
