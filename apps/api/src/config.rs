use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::plagiarism::similarity::MatchMode;

/// Which `TextExtractor` the service is wired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionBackend {
    PdfText,
    Vision,
}

impl std::str::FromStr for ExtractionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf_text" => Ok(ExtractionBackend::PdfText),
            "vision" => Ok(ExtractionBackend::Vision),
            other => bail!("EXTRACTION_BACKEND must be 'pdf_text' or 'vision', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but invalid.
#[derive(Debug, Clone)]
pub struct Config {
    pub submissions_db_path: PathBuf,
    pub upload_dir: PathBuf,
    pub extraction_backend: ExtractionBackend,
    /// Required only for the vision backend.
    pub anthropic_api_key: Option<String>,
    pub default_threshold: u32,
    pub match_mode: MatchMode,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let extraction_backend: ExtractionBackend = lookup("EXTRACTION_BACKEND")
            .unwrap_or_else(|| "pdf_text".to_string())
            .parse()?;

        let anthropic_api_key = lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty());
        if extraction_backend == ExtractionBackend::Vision && anthropic_api_key.is_none() {
            bail!("Required environment variable 'ANTHROPIC_API_KEY' is not set (EXTRACTION_BACKEND=vision)");
        }

        let default_threshold = lookup("DEFAULT_THRESHOLD")
            .unwrap_or_else(|| "60".to_string())
            .parse::<u32>()
            .context("DEFAULT_THRESHOLD must be an integer percentage")?;
        if default_threshold > 100 {
            bail!("DEFAULT_THRESHOLD must be between 0 and 100, got {default_threshold}");
        }

        Ok(Config {
            submissions_db_path: lookup("SUBMISSIONS_DB_PATH")
                .unwrap_or_else(|| "vision_text_db.json".to_string())
                .into(),
            upload_dir: lookup("UPLOAD_DIR")
                .unwrap_or_else(|| "uploads".to_string())
                .into(),
            extraction_backend,
            anthropic_api_key,
            default_threshold,
            match_mode: lookup("MATCH_MODE")
                .unwrap_or_else(|| "best".to_string())
                .parse::<MatchMode>()
                .map_err(anyhow::Error::msg)?,
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
