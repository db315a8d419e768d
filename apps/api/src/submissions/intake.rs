use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::submission::Submission;
use crate::plagiarism::similarity::MIN_COMPARABLE_CHARS;
use crate::state::AppState;

/// Upper bound on same-named uploads kept side by side for one roll number.
const MAX_UPLOAD_VERSIONS: u32 = 1000;

/// A completed submission form.
#[derive(Debug)]
pub struct SubmissionForm {
    pub roll_no: String,
    pub name: String,
    pub file_name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct IntakeResponse {
    pub submission: Submission,
    pub extracted_chars: usize,
    /// False when the text is too short to be used in a plagiarism check.
    pub comparable: bool,
    pub extraction_backend: &'static str,
}

/// Saves the upload, runs it through the renderer and extractor, and appends
/// the result to the store. Nothing is appended if any step fails.
pub async fn submit(state: &AppState, form: SubmissionForm) -> Result<IntakeResponse, AppError> {
    let roll_no = form.roll_no.trim();
    let name = form.name.trim();
    validate_roll_no(roll_no)?;
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if form.contents.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }

    let file_name = client_file_name(&form.file_name)?;
    let source_path =
        save_upload(&state.config.upload_dir, roll_no, file_name, &form.contents).await?;
    info!("Saved upload for roll {roll_no} to {}", source_path.display());

    let submission = match record_upload(state, &source_path, roll_no, name).await {
        Ok(submission) => submission,
        Err(e) => {
            discard_upload(&source_path).await;
            return Err(e);
        }
    };
    let extracted_chars = submission.text_len();

    Ok(IntakeResponse {
        submission,
        extracted_chars,
        comparable: extracted_chars >= MIN_COMPARABLE_CHARS,
        extraction_backend: state.extractor.backend(),
    })
}

/// Renders and extracts the saved upload, then appends the submission.
async fn record_upload(
    state: &AppState,
    source_path: &Path,
    roll_no: &str,
    name: &str,
) -> Result<Submission, AppError> {
    let rendered_path = state.renderer.render(source_path, roll_no).await?;
    let extracted_text = state.extractor.extract(&rendered_path).await?;

    let submission = Submission {
        roll_no: roll_no.to_string(),
        name: name.to_string(),
        source_path: source_path.to_string_lossy().into_owned(),
        rendered_path: rendered_path.to_string_lossy().into_owned(),
        extracted_text,
    };
    state.store.append(submission.clone()).await?;
    Ok(submission)
}

/// Writes the upload to a file no earlier submission refers to:
/// `{roll_no}_{file_name}`, then `{roll_no}_{stem}_2.{ext}`, `_3`, ...
async fn save_upload(
    upload_dir: &Path,
    roll_no: &str,
    file_name: &str,
    contents: &[u8],
) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .with_context(|| format!("creating {}", upload_dir.display()))?;

    for version in 1..=MAX_UPLOAD_VERSIONS {
        let path = upload_path(upload_dir, roll_no, file_name, version);
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("creating {}", path.display()));
            }
        };

        let written = async {
            file.write_all(contents).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            discard_upload(&path).await;
            return Err(e).with_context(|| format!("saving upload to {}", path.display()));
        }
        return Ok(path);
    }

    bail!("more than {MAX_UPLOAD_VERSIONS} uploads named {roll_no}_{file_name}")
}

async fn discard_upload(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Could not remove unrecorded upload {}: {e}", path.display());
    }
}

/// Roll numbers become part of the upload file name, so path syntax is refused.
fn validate_roll_no(roll_no: &str) -> Result<(), AppError> {
    if roll_no.is_empty() {
        return Err(AppError::Validation("roll_no is required".to_string()));
    }
    if roll_no == "."
        || roll_no == ".."
        || roll_no
            .chars()
            .any(|c| matches!(c, '/' | '\\') || c.is_control())
    {
        return Err(AppError::Validation(format!(
            "roll_no '{roll_no}' contains path characters"
        )));
    }
    Ok(())
}

/// The final component of the client-supplied file name.
fn client_file_name(raw: &str) -> Result<&str, AppError> {
    let raw = raw.trim();
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    if last.is_empty() || last == "." || last == ".." {
        return Err(AppError::Validation(format!("invalid file name '{raw}'")));
    }
    Ok(last)
}

fn upload_path(upload_dir: &Path, roll_no: &str, file_name: &str, version: u32) -> PathBuf {
    if version == 1 {
        return upload_dir.join(format!("{roll_no}_{file_name}"));
    }
    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    match name.extension() {
        Some(ext) => upload_dir.join(format!(
            "{roll_no}_{stem}_{version}.{}",
            ext.to_string_lossy()
        )),
        None => upload_dir.join(format!("{roll_no}_{stem}_{version}")),
    }
}
