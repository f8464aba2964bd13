//! A task record as submitted and persisted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of the persisted task list.
///
/// The store is a transparent pass-through: nothing here is server-assigned,
/// and client-supplied fields outside the known set survive a save/load cycle
/// via `extra`. `title` is typed as optional even though valid tasks always
/// carry one — presence is a validation rule, so a missing title must reach
/// the validator instead of failing deserialization.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Task {
    /// Required, 1-200 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Optional, at most 1000 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional, one of "low", "medium", "high", "urgent".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    /// Optional, must parse as a calendar date or date-time.
    #[serde(
        rename = "dueDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<String>,

    /// Any other client-supplied fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
