//! A print job request destined for the thermal printer.

use serde::Deserialize;
use serde_json::Value;

/// Body of `POST /api/print`. Not persisted; validated and acknowledged only.
///
/// `printer` is kept as a raw JSON value because "printer name must be a
/// string" is one of the validation rules: a numeric printer must produce a
/// collected error message, not a rejected body.
#[derive(Deserialize, Clone, Debug)]
pub struct PrintRequest {
    /// Text to print. Required, 1-5000 characters.
    #[serde(default)]
    pub content: Option<String>,

    /// Target printer name, optional.
    #[serde(default)]
    pub printer: Option<Value>,
}
