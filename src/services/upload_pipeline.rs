//! UploadPipeline — turns a multipart request into durably stored files.
//!
//! The batch is all-or-nothing: every part is staged to a temp file first,
//! checked against upload policy, and only promoted to a servable name once
//! the whole request has been accepted. Any rejection or fault discards
//! everything staged (and rolls back anything already promoted), so a failed
//! request leaves no trace in the content root.

use axum::extract::{Multipart, multipart::MultipartError};
use thiserror::Error;
use tracing::debug;

use crate::{
    models::upload::StoredFile,
    services::storage_service::{StagedFile, StorageError, StorageService},
    validation::{MAX_FILE_SIZE_BYTES, validate_file},
};

/// Multipart field name file parts must arrive under.
pub const UPLOAD_FIELD_NAME: &str = "images";

/// Maximum file parts accepted in one request.
pub const MAX_FILES_PER_REQUEST: usize = 5;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No files uploaded")]
    NoFiles,
    #[error("Only image files are allowed")]
    NotAnImage { mime: String },
    #[error("{}", .reasons.join(", "))]
    PolicyRejected { reasons: Vec<String> },
    #[error("File too large (max 10MB)")]
    TooLarge,
    #[error("Too many files (max 5)")]
    TooManyFiles,
    #[error("Unexpected field `{field}`")]
    UnexpectedField { field: String },
    #[error("{0}")]
    Multipart(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Clone)]
pub struct UploadPipeline {
    storage: StorageService,
}

impl UploadPipeline {
    pub fn new(storage: StorageService) -> Self {
        Self { storage }
    }

    /// Consume the multipart stream and return the stored descriptors, in
    /// part order. On any error, no file from this request remains on disk.
    pub async fn process(&self, multipart: Multipart) -> Result<Vec<StoredFile>, UploadError> {
        let mut staged: Vec<(StagedFile, String)> = Vec::new();

        if let Err(err) = self.stage_parts(multipart, &mut staged).await {
            self.discard_all(staged).await;
            return Err(err);
        }

        if staged.is_empty() {
            return Err(UploadError::NoFiles);
        }

        // Policy check over the declared type and the bytes actually written.
        if let Some(reasons) = staged.iter().find_map(|(part, mime)| {
            let report = validate_file(part.size_bytes(), mime);
            (!report.is_valid()).then_some(report.errors)
        }) {
            self.discard_all(staged).await;
            return Err(UploadError::PolicyRejected { reasons });
        }

        let mut stored = Vec::with_capacity(staged.len());
        let mut parts = staged.into_iter();
        while let Some((part, _mime)) = parts.next() {
            match self.storage.promote(part).await {
                Ok(file) => stored.push(file),
                Err(err) => {
                    for promoted in &stored {
                        let _ = self.storage.delete(&promoted.filename).await;
                    }
                    self.discard_all(parts).await;
                    return Err(err.into());
                }
            }
        }
        Ok(stored)
    }

    /// Walk the multipart fields, staging each accepted file part.
    ///
    /// Text fields are drained and ignored. Aborts on the first gate failure;
    /// every temp file opened so far, including the part in flight, is left
    /// in `staged` so the caller's cleanup removes it.
    async fn stage_parts(
        &self,
        mut multipart: Multipart,
        staged: &mut Vec<(StagedFile, String)>,
    ) -> Result<(), UploadError> {
        while let Some(mut field) = multipart.next_field().await.map_err(as_multipart_error)? {
            let Some(original_name) = field.file_name().map(str::to_string) else {
                while field.chunk().await.map_err(as_multipart_error)?.is_some() {}
                continue;
            };

            let field_name = field.name().unwrap_or("").to_string();
            if field_name != UPLOAD_FIELD_NAME {
                return Err(UploadError::UnexpectedField { field: field_name });
            }
            if staged.len() >= MAX_FILES_PER_REQUEST {
                return Err(UploadError::TooManyFiles);
            }

            let mime = field.content_type().unwrap_or("").to_string();
            if !mime.to_ascii_lowercase().starts_with("image/") {
                return Err(UploadError::NotAnImage { mime });
            }

            let mut part = self.storage.begin_stage(&original_name).await?;
            loop {
                match field.chunk().await {
                    Ok(Some(chunk)) => {
                        if let Err(err) = part.write_chunk(chunk).await {
                            staged.push((part, mime));
                            return Err(UploadError::Storage(StorageError::Io(err)));
                        }
                        if part.size_bytes() > MAX_FILE_SIZE_BYTES {
                            staged.push((part, mime));
                            return Err(UploadError::TooLarge);
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        staged.push((part, mime));
                        return Err(as_multipart_error(err));
                    }
                }
            }

            debug!(
                original = %original_name,
                mime = %mime,
                size_bytes = part.size_bytes(),
                "staged upload part"
            );
            staged.push((part, mime));
        }
        Ok(())
    }

    async fn discard_all(&self, staged: impl IntoIterator<Item = (StagedFile, String)>) {
        for (part, _mime) in staged {
            self.storage.discard(part).await;
        }
    }
}

fn as_multipart_error(err: MultipartError) -> UploadError {
    UploadError::Multipart(err.body_text())
}
