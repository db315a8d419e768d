use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{StoreError, SubmissionStore};
use crate::models::submission::Submission;

/// Stores the whole collection as one pretty-printed JSON array.
///
/// The blocking task that performs an append owns the `write_lock` guard, so the
/// lock stays held until the file is replaced even if the caller's future is
/// dropped mid-append. Every write
/// lands in a sibling temp file that is renamed over the target, so readers see
/// either the previous or the new collection, never a partial one.
/// Only one process should own a given file.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SubmissionStore for JsonFileStore {
    async fn append(&self, submission: Submission) -> Result<(), StoreError> {
        let guard = Arc::clone(&self.write_lock).lock_owned().await;

        let path = self.path.clone();
        let roll_no = submission.roll_no.clone();
        let total = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let mut submissions = read_collection(&path)?;
            submissions.push(submission);
            write_collection(&path, &submissions)?;
            Ok::<_, StoreError>(submissions.len())
        })
        .await??;

        info!(
            "Appended submission for roll {roll_no} to {} ({total} total)",
            self.path.display()
        );
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Submission>, StoreError> {
        let path = self.path.clone();
        let submissions = tokio::task::spawn_blocking(move || read_collection(&path)).await??;
        debug!(
            "Loaded {} submissions from {}",
            submissions.len(),
            self.path.display()
        );
        Ok(submissions)
    }
}

fn read_collection(path: &Path) -> Result<Vec<Submission>, StoreError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&contents).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn write_collection(path: &Path, submissions: &[Submission]) -> Result<(), StoreError> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    // serde_json writes non-ASCII verbatim, so extracted text round-trips unescaped.
    let encoded = serde_json::to_vec_pretty(submissions).map_err(StoreError::Encode)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let mut staged = NamedTempFile::new_in(&dir).map_err(write_err)?;
    staged.write_all(&encoded).map_err(write_err)?;
    staged.as_file().sync_all().map_err(write_err)?;
    staged.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn submission(roll_no: &str, text: &str) -> Submission {
        Submission {
            roll_no: roll_no.to_string(),
            name: format!("Student {roll_no}"),
            source_path: format!("uploads/{roll_no}_essay.pdf"),
            rendered_path: format!("uploads/{roll_no}_essay.pdf"),
            extracted_text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("db.json"));
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("db.json"));

        for roll in ["A1", "A2", "A1", "B7"] {
            store.append(submission(roll, "Some text.")).await.unwrap();
        }

        let loaded = store.load_all().await.unwrap();
        let rolls: Vec<&str> = loaded.iter().map(|s| s.roll_no.as_str()).collect();
        assert_eq!(rolls, vec!["A1", "A2", "A1", "B7"]);
    }

    #[tokio::test]
    async fn test_creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("db.json");
        let store = JsonFileStore::new(&path);

        store.append(submission("A1", "text")).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_unicode_written_verbatim_with_two_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("db.json"));
        store
            .append(submission("A1", "Ça va? 日本語のテキスト."))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("Ça va? 日本語のテキスト."));
        assert!(raw.contains("\n  {\n    \"roll_no\": \"A1\""));
    }

    #[tokio::test]
    async fn test_reads_existing_collection_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vision_text_db.json");
        std::fs::write(
            &path,
            r#"[
  {
    "roll_no": "21CS001",
    "name": "Ravi",
    "pdf_path": "uploads/21CS001_hw.pdf",
    "stitched_path": "stitched/21CS001_stitched.png",
    "extracted_text": "The mitochondria is the powerhouse of the cell."
  }
]"#,
        )
        .unwrap();

        let loaded = JsonFileStore::new(&path).load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].rendered_path, "stitched/21CS001_stitched.png");
    }

    #[tokio::test]
    async fn test_blank_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "  \n").unwrap();
        assert!(JsonFileStore::new(&path).load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.load_all().await,
            Err(StoreError::Malformed { .. })
        ));
        assert!(matches!(
            store.append(submission("A1", "text")).await,
            Err(StoreError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_append_still_completes_under_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let seed: Vec<Submission> = (0..2000)
            .map(|i| submission(&format!("S{i}"), "Seeded text for a larger store."))
            .collect();
        std::fs::write(&path, serde_json::to_vec_pretty(&seed).unwrap()).unwrap();
        let store = JsonFileStore::new(&path);

        // A zero timeout polls once: the first append takes the lock and hands the
        // write to a blocking task before its future is dropped.
        for i in 0..6 {
            let _ = tokio::time::timeout(
                std::time::Duration::ZERO,
                store.append(submission(&format!("C{i}"), "text")),
            )
            .await;
        }
        store.append(submission("FINAL", "text")).await.unwrap();

        let loaded = store.load_all().await.unwrap();
        let rolls: Vec<&str> = loaded.iter().map(|s| s.roll_no.as_str()).collect();
        assert!(rolls.contains(&"C0"), "cancelled append was lost");
        assert_eq!(rolls.last(), Some(&"FINAL"));
        let cancelled_kept = rolls.iter().filter(|r| r.starts_with('C')).count();
        assert_eq!(loaded.len(), 2000 + cancelled_kept + 1);
        assert_eq!(&rolls[..2], &["S0", "S1"]);
    }

    #[tokio::test]
    async fn test_concurrent_appends_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path().join("db.json")));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .append(submission(&format!("R{i}"), "text"))
                        .await
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.load_all().await.unwrap().len(), 16);
    }
}
