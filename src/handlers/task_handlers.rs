//! Task list endpoints: replace-on-save persistence and a resilient read.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use serde_json::json;
use tracing::{info, warn};

use crate::{errors::ApiError, handlers::json_rejection_message, models::task::Task, state::AppState};

/// POST /api/tasks — validate and persist the submitted list wholesale.
pub async fn save_tasks(
    State(state): State<AppState>,
    payload: Result<Json<Vec<Task>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(tasks) =
        payload.map_err(|rej| ApiError::MalformedRequest(json_rejection_message(&rej)))?;

    state.tasks.save(&tasks).await?;
    info!(count = tasks.len(), "saved task list");

    Ok(Json(json!({
        "success": true,
        "message": "Tasks saved successfully",
    })))
}

/// GET /api/tasks — the stored list as a bare JSON array.
///
/// An unreadable or corrupt store logs a warning and answers with an empty
/// list; clients of this endpoint always get a 200 and an array.
pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    match state.tasks.load().await {
        Ok(tasks) => Json(tasks),
        Err(err) => {
            warn!(error = %err, "task list unreadable, serving empty list");
            Json(Vec::new())
        }
    }
}
