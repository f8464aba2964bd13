//! Service layer: storage, the upload pipeline on top of it, and the
//! persisted task list.

pub mod storage_service;
pub mod task_store;
pub mod upload_pipeline;
