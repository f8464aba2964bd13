//! Defines routes for the upload, task, print, and health endpoints.
//!
//! ## Structure
//! - **Upload endpoints**
//!   - `POST   /api/upload` — store a multipart batch of images
//!   - `DELETE /api/upload/{filename}` — delete one stored file
//!   - `GET    /uploads/{filename}` — serve a stored file back
//!
//! - **Task endpoints**
//!   - `POST   /api/tasks` — replace the persisted task list
//!   - `GET    /api/tasks` — read the persisted task list
//!
//! - **Other**
//!   - `POST   /api/print` — send a job to the thermal printer
//!   - `GET    /health` — liveness info
//!
//! Storage names never contain `/`, so `{filename}` is a plain segment, not
//! a wildcard.

use crate::{
    handlers::{
        health_handlers::health_check,
        print_handlers::print_job,
        task_handlers::{list_tasks, save_tasks},
        upload_handlers::{delete_upload, serve_upload, upload_images},
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

/// Request body ceiling: a full batch of maximum-size files plus multipart
/// framing. The per-file and per-batch caps below this produce the
/// client-visible errors; the ceiling only stops runaway bodies.
pub const MAX_REQUEST_BODY_BYTES: usize = 52 * 1024 * 1024;

/// Build and return the router for all endpoints.
///
/// The router carries shared state ([`AppState`]) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoint (mounted at root)
        .route("/health", get(health_check))
        // upload routes
        .route("/api/upload", post(upload_images))
        .route("/api/upload/{filename}", delete(delete_upload))
        .route("/uploads/{filename}", get(serve_upload))
        // task routes
        .route("/api/tasks", get(list_tasks).post(save_tasks))
        // print route
        .route("/api/print", post(print_job))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
}
