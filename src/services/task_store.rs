//! TaskStore — the persisted task list.
//!
//! One JSON document on disk, replaced wholesale on every save. Writes go to
//! a temp file in the same directory and land via rename, so readers only
//! ever see the previous complete list or the new one. Saves are serialized
//! behind a lock; the last writer wins at whole-list granularity.

use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
    sync::Mutex,
};
use tracing::debug;
use uuid::Uuid;

use crate::{models::task::Task, validation::validate_task};

/// File name of the task document inside the data directory.
pub const TASKS_FILE_NAME: &str = "tasks.json";

#[derive(Debug, Error)]
pub enum TaskStoreError {
    /// A submitted task broke a record rule. Positions are reported 1-based,
    /// matching how clients count them.
    #[error("Task {}: {}", .index + 1, .reasons.join(", "))]
    Invalid { index: usize, reasons: Vec<String> },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct TaskStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl TaskStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(TASKS_FILE_NAME),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current list. A store that has never been written is an
    /// empty list, not an error.
    pub async fn load(&self) -> Result<Vec<Task>, TaskStoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Validate and persist the full list, replacing whatever was stored.
    ///
    /// The first task that breaks a rule aborts the save with its position
    /// and reasons; the previous document stays untouched.
    pub async fn save(&self, tasks: &[Task]) -> Result<(), TaskStoreError> {
        for (index, task) in tasks.iter().enumerate() {
            let report = validate_task(task);
            if !report.is_valid() {
                return Err(TaskStoreError::Invalid {
                    index,
                    reasons: report.errors,
                });
            }
        }

        let json = serde_json::to_vec_pretty(&tasks)?;

        let _guard = self.write_lock.lock().await;
        let dir = self.path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir).await?;

        let tmp_path = dir.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;
        if let Err(err) = write_and_sync(&mut file, &json).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }
        drop(file);

        if let Err(err) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }

        debug!(count = tasks.len(), path = %self.path.display(), "saved task list");
        Ok(())
    }
}

async fn write_and_sync(file: &mut File, bytes: &[u8]) -> io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn titled(title: &str) -> Task {
        Task {
            title: Some(title.to_string()),
            description: None,
            priority: None,
            due_date: None,
            extra: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn unwritten_store_loads_as_empty_list() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_round_trips_including_unknown_fields() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path());

        let mut task = titled("order paper rolls");
        task.priority = Some("high".to_string());
        task.extra.insert("id".to_string(), json!(1723060000000u64));
        task.extra.insert("completed".to_string(), json!(false));

        store.save(std::slice::from_ref(&task)).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, vec![task]);

        // Document is pretty-printed and no temp file is left behind.
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\n  "));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn invalid_task_reports_its_position() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path());

        let tasks = vec![titled("fine"), titled("   ")];
        let err = store.save(&tasks).await.unwrap_err();

        assert_eq!(err.to_string(), "Task 2: Title is required");
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn rejected_save_keeps_the_previous_document() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path());

        let original = vec![titled("keep me")];
        store.save(&original).await.unwrap();

        let mut bad = titled("replace");
        bad.priority = Some("asap".to_string());
        assert!(store.save(&[bad]).await.is_err());

        assert_eq!(store.load().await.unwrap(), original);
    }

    #[tokio::test]
    async fn concurrent_saves_leave_one_complete_document() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path());

        let first = vec![titled("writer one")];
        let second = vec![titled("writer two"), titled("still writer two")];
        let (a, b) = tokio::join!(store.save(&first), store.save(&second));
        a.unwrap();
        b.unwrap();

        let loaded = store.load().await.unwrap();
        assert!(loaded == first || loaded == second);
    }
}
