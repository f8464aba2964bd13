//! StorageService — owner of the upload content root.
//!
//! Every byte that lands in or leaves the content root goes through this
//! service: callers never touch paths themselves. Uploads are written in two
//! phases, staged to a hidden temp file and then promoted under a freshly
//! assigned storage name, so a multi-file request can discard everything it
//! staged without a partially written file ever being visible under a final
//! name.

use bytes::Bytes;
use chrono::Utc;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

use crate::{models::upload::StoredFile, validation::sanitize_string};

/// URL prefix stored files are served under.
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

const MAX_STORAGE_NAME_LEN: usize = 255;
const MAX_SANITIZED_ORIGINAL_CHARS: usize = 120;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file `{0}` not found")]
    FileNotFound(String),
    #[error("invalid storage name `{0}`")]
    InvalidName(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// An upload in flight: bytes written to a temp file, no final name yet.
///
/// A staged file becomes visible only through [`StorageService::promote`];
/// until then (or after [`StorageService::discard`]) readers of the content
/// root cannot observe it under a servable name.
pub struct StagedFile {
    tmp_path: PathBuf,
    file: File,
    size_bytes: u64,
    original_name: String,
}

impl StagedFile {
    /// Append one chunk of the part body.
    pub async fn write_chunk(&mut self, chunk: Bytes) -> io::Result<()> {
        self.file.write_all(&chunk).await?;
        self.size_bytes += chunk.len() as u64;
        Ok(())
    }

    /// Bytes written so far. The pipeline polls this while streaming to
    /// enforce the per-file cap without buffering.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

/// Durable mapping between public storage names and on-disk bytes, within a
/// single configured root directory.
#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
    seq: Arc<AtomicU64>,
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Reject any externally supplied name that could resolve outside the
    /// content root or reach a staged temp file: separators, `..`, leading
    /// dots, control bytes. Generated storage names never trip this.
    fn ensure_name_safe(&self, name: &str) -> StorageResult<()> {
        let invalid = || StorageError::InvalidName(name.to_string());

        if name.is_empty() || name.len() > MAX_STORAGE_NAME_LEN {
            return Err(invalid());
        }
        if name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(invalid());
        }
        if name.starts_with('.') {
            return Err(invalid());
        }
        if name.chars().any(char::is_control) {
            return Err(invalid());
        }
        Ok(())
    }

    /// Assign the storage name for a newly accepted part.
    ///
    /// `{unix-millis}-{sequence}-{sanitized-original}`: the process-wide
    /// sequence keeps two parts accepted in the same millisecond distinct
    /// (same request or concurrent requests), the millisecond prefix keeps
    /// names from different runs apart, and the sanitized tail keeps the
    /// name traceable to what the client sent.
    fn next_storage_name(&self, original_name: &str) -> String {
        let millis = Utc::now().timestamp_millis();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{millis}-{seq}-{}", sanitize_original_name(original_name))
    }

    /// Open a temp file in the root for an incoming part.
    pub async fn begin_stage(&self, original_name: &str) -> StorageResult<StagedFile> {
        fs::create_dir_all(&self.root).await?;
        let tmp_path = self.root.join(format!(".tmp-{}", Uuid::new_v4()));
        let file = File::create(&tmp_path).await?;
        Ok(StagedFile {
            tmp_path,
            file,
            size_bytes: 0,
            original_name: original_name.to_string(),
        })
    }

    /// Make a fully staged part durable under its final storage name.
    ///
    /// Flushes and fsyncs before the rename; on any failure the temp file is
    /// removed and nothing becomes visible.
    pub async fn promote(&self, mut staged: StagedFile) -> StorageResult<StoredFile> {
        if let Err(err) = staged.file.flush().await {
            let _ = fs::remove_file(&staged.tmp_path).await;
            return Err(StorageError::Io(err));
        }
        if let Err(err) = staged.file.sync_all().await {
            let _ = fs::remove_file(&staged.tmp_path).await;
            return Err(StorageError::Io(err));
        }
        drop(staged.file);

        let storage_name = self.next_storage_name(&staged.original_name);
        let final_path = self.root.join(&storage_name);
        if let Err(err) = fs::rename(&staged.tmp_path, &final_path).await {
            let _ = fs::remove_file(&staged.tmp_path).await;
            return Err(StorageError::Io(err));
        }

        debug!(
            storage_name = %storage_name,
            size_bytes = staged.size_bytes,
            "stored uploaded file"
        );

        Ok(StoredFile {
            url: format!("{UPLOAD_URL_PREFIX}/{storage_name}"),
            path: final_path.display().to_string(),
            filename: storage_name,
            originalname: sanitize_string(&staged.original_name),
            size: staged.size_bytes,
        })
    }

    /// Drop a staged part without promoting it.
    pub async fn discard(&self, staged: StagedFile) {
        drop(staged.file);
        if let Err(err) = fs::remove_file(&staged.tmp_path).await {
            if err.kind() != ErrorKind::NotFound {
                debug!(
                    "failed to remove staged file {}: {}",
                    staged.tmp_path.display(),
                    err
                );
            }
        }
    }

    /// Remove a stored file. An absent file reports `FileNotFound` so a
    /// repeated delete stays a client-level miss, not an internal fault.
    pub async fn delete(&self, storage_name: &str) -> StorageResult<()> {
        self.ensure_name_safe(storage_name)?;
        let path = self.root.join(storage_name);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("removed stored file {}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StorageError::FileNotFound(storage_name.to_string()))
            }
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    /// Open a stored file for streaming out, with its length and the content
    /// type implied by its extension.
    pub async fn open(&self, storage_name: &str) -> StorageResult<(File, u64, &'static str)> {
        self.ensure_name_safe(storage_name)?;
        let path = self.root.join(storage_name);
        let file = File::open(&path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                StorageError::FileNotFound(storage_name.to_string())
            } else {
                StorageError::Io(err)
            }
        })?;
        let len = file.metadata().await?.len();
        Ok((file, len, mime_for_extension(storage_name)))
    }
}

/// Reduce a client filename to filesystem-safe characters.
///
/// Takes the final path component only, maps everything outside
/// alphanumerics, `.`, `-`, `_` to `_`, collapses dot runs (so generated
/// names can never contain `..`), and caps the length.
fn sanitize_original_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");

    let mut out = String::with_capacity(base.len());
    let mut prev_dot = false;
    for c in base.chars() {
        let mapped = if c.is_alphanumeric() || matches!(c, '-' | '_') {
            c
        } else if c == '.' {
            if prev_dot {
                continue;
            }
            '.'
        } else {
            '_'
        };
        prev_dot = mapped == '.';
        out.push(mapped);
    }

    if out.chars().count() > MAX_SANITIZED_ORIGINAL_CHARS {
        out = out.chars().take(MAX_SANITIZED_ORIGINAL_CHARS).collect();
    }
    if out.is_empty() {
        out.push_str("file");
    }
    out
}

/// Content type for serving, derived from the storage-name extension. Only
/// the accepted image types resolve to a specific type.
fn mime_for_extension(name: &str) -> &'static str {
    match Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn store_bytes(service: &StorageService, name: &str, data: &[u8]) -> StoredFile {
        let mut staged = service.begin_stage(name).await.unwrap();
        staged.write_chunk(Bytes::copy_from_slice(data)).await.unwrap();
        service.promote(staged).await.unwrap()
    }

    #[tokio::test]
    async fn promote_makes_bytes_durable_under_storage_name() {
        let dir = tempdir().unwrap();
        let service = StorageService::new(dir.path());

        let stored = store_bytes(&service, "receipt.png", b"not really a png").await;

        assert_eq!(stored.size, 16);
        assert!(stored.filename.ends_with("-receipt.png"));
        assert_eq!(stored.url, format!("/uploads/{}", stored.filename));
        assert_eq!(stored.originalname, "receipt.png");

        let on_disk = std::fs::read(dir.path().join(&stored.filename)).unwrap();
        assert_eq!(on_disk, b"not really a png");

        // No temp residue once promoted.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn identical_originals_get_distinct_names() {
        let dir = tempdir().unwrap();
        let service = StorageService::new(dir.path());

        let mut names = std::collections::HashSet::new();
        for _ in 0..20 {
            let stored = store_bytes(&service, "same.png", b"x").await;
            assert!(names.insert(stored.filename), "storage name collided");
        }
    }

    #[tokio::test]
    async fn discard_removes_the_temp_file() {
        let dir = tempdir().unwrap();
        let service = StorageService::new(dir.path());

        let mut staged = service.begin_stage("a.png").await.unwrap();
        staged.write_chunk(Bytes::from_static(b"abc")).await.unwrap();
        service.discard(staged).await;

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn delete_is_a_miss_for_absent_files() {
        let dir = tempdir().unwrap();
        let service = StorageService::new(dir.path());

        match service.delete("12345-0-gone.png").await {
            Err(StorageError::FileNotFound(name)) => assert_eq!(name, "12345-0-gone.png"),
            other => panic!("expected FileNotFound, got {other:?}"),
        }

        let stored = store_bytes(&service, "here.png", b"x").await;
        service.delete(&stored.filename).await.unwrap();
        assert!(matches!(
            service.delete(&stored.filename).await,
            Err(StorageError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn traversal_names_are_rejected_before_touching_disk() {
        let dir = tempdir().unwrap();
        let service = StorageService::new(dir.path());

        for name in ["../escape.png", "a/b.png", "a\\b.png", "..", ".tmp-abc", "", "evil\u{0}.png"] {
            assert!(
                matches!(service.delete(name).await, Err(StorageError::InvalidName(_))),
                "accepted unsafe name {name:?}"
            );
            assert!(matches!(
                service.open(name).await,
                Err(StorageError::InvalidName(_))
            ));
        }
    }

    #[tokio::test]
    async fn open_reports_length_and_extension_mime() {
        let dir = tempdir().unwrap();
        let service = StorageService::new(dir.path());

        let stored = store_bytes(&service, "photo.JPG", b"abcdef").await;
        let (_file, len, mime) = service.open(&stored.filename).await.unwrap();
        assert_eq!(len, 6);
        assert_eq!(mime, "image/jpeg");

        assert!(matches!(
            service.open("99999-9-missing.png").await,
            Err(StorageError::FileNotFound(_))
        ));
    }

    #[test]
    fn sanitizer_keeps_names_flat_and_traceable() {
        assert_eq!(sanitize_original_name("holiday pic.png"), "holiday_pic.png");
        assert_eq!(sanitize_original_name("../../evil.png"), "evil.png");
        assert_eq!(sanitize_original_name("dots..everywhere...png"), "dots.everywhere.png");
        assert_eq!(sanitize_original_name("<script>.gif"), "_script_.gif");
        assert_eq!(sanitize_original_name(""), "file");

        let long = format!("{}.png", "a".repeat(300));
        assert_eq!(
            sanitize_original_name(&long).chars().count(),
            MAX_SANITIZED_ORIGINAL_CHARS
        );
    }

    #[test]
    fn extension_mime_covers_the_allowed_set() {
        assert_eq!(mime_for_extension("1-0-a.jpeg"), "image/jpeg");
        assert_eq!(mime_for_extension("1-0-a.png"), "image/png");
        assert_eq!(mime_for_extension("1-0-a.gif"), "image/gif");
        assert_eq!(mime_for_extension("1-0-a.WEBP"), "image/webp");
        assert_eq!(mime_for_extension("1-0-noext"), "application/octet-stream");
    }
}
