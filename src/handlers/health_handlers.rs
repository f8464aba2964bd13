//! Liveness endpoint.

use axum::{Json, extract::State};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /health — status, current time, and seconds since startup.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "uptime": state.uptime_secs(),
    }))
}
