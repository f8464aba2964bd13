//! Print endpoint. Validates the job and logs it; actual thermal printer
//! I/O is not wired up yet, so the log line stands in for the device.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    response::IntoResponse,
};
use serde_json::{Value, json};
use tracing::info;

use crate::{
    errors::ApiError, handlers::json_rejection_message, models::print::PrintRequest,
    validation::validate_print_data,
};

/// POST /api/print — accept a print job for the thermal printer.
pub async fn print_job(
    payload: Result<Json<PrintRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) =
        payload.map_err(|rej| ApiError::MalformedRequest(json_rejection_message(&rej)))?;

    let report = validate_print_data(&request);
    if !report.is_valid() {
        return Err(ApiError::Validation(report.errors.join(", ")));
    }

    let content = request.content.as_deref().unwrap_or_default();
    let printer = request
        .printer
        .as_ref()
        .and_then(Value::as_str)
        .unwrap_or("default");
    info!(printer = %printer, "print job received:\n{content}");

    Ok(Json(json!({
        "success": true,
        "message": "Print job sent to thermal printer",
    })))
}
