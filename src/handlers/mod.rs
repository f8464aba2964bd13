//! HTTP handlers, one module per resource.

pub mod health_handlers;
pub mod print_handlers;
pub mod task_handlers;
pub mod upload_handlers;

use axum::extract::rejection::JsonRejection;

/// Client-facing message for a JSON body axum could not parse. Syntax errors
/// get the short fixed message; everything else keeps axum's wording.
pub(crate) fn json_rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::JsonSyntaxError(_) => "Invalid JSON".to_string(),
        other => other.body_text(),
    }
}
