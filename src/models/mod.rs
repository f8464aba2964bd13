//! Core data models for the taskprint service.
//!
//! These are the typed records sitting at the parse boundary: request bodies
//! deserialize into them, the validator inspects them, and the task store
//! persists them. Fields that carry policy rules (priority, dueDate, printer)
//! stay loosely typed here so a bad value becomes a collected validation
//! error rather than a deserialization failure.

pub mod print;
pub mod task;
pub mod upload;
