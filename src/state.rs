//! Shared state handed to every handler.

use std::{path::Path, time::Instant};

use crate::services::{
    storage_service::StorageService, task_store::TaskStore, upload_pipeline::UploadPipeline,
};

/// Cheap to clone; handlers receive it through the router's `State`.
#[derive(Clone)]
pub struct AppState {
    pub storage: StorageService,
    pub pipeline: UploadPipeline,
    pub tasks: TaskStore,
    started_at: Instant,
}

impl AppState {
    pub fn new(upload_dir: impl AsRef<Path>, data_dir: impl AsRef<Path>) -> Self {
        let storage = StorageService::new(upload_dir.as_ref());
        Self {
            pipeline: UploadPipeline::new(storage.clone()),
            storage,
            tasks: TaskStore::new(data_dir),
            started_at: Instant::now(),
        }
    }

    /// Seconds since this state was built, i.e. since startup.
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
