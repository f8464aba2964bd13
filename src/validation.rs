//! Pure validation of task records, print requests, and file metadata.
//!
//! Nothing here touches I/O or returns an `Err`: every rule violation is
//! collected into a [`ValidationReport`] so callers can show the full list of
//! problems at once instead of the first one found.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::{print::PrintRequest, task::Task};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;
pub const MAX_PRINT_CONTENT_CHARS: usize = 5000;
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];
pub const VALID_PRIORITIES: [&str; 4] = ["low", "medium", "high", "urgent"];

/// Outcome of validating one record: empty means valid.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }
}

/// Check a task against the record rules: title presence and length,
/// description length, priority membership, due-date parseability.
pub fn validate_task(task: &Task) -> ValidationReport {
    let mut report = ValidationReport::default();

    match &task.title {
        Some(title) if !title.trim().is_empty() => {
            if title.chars().count() > MAX_TITLE_CHARS {
                report.push(format!("Title cannot exceed {MAX_TITLE_CHARS} characters"));
            }
        }
        _ => report.push("Title is required"),
    }

    if let Some(description) = &task.description {
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            report.push(format!(
                "Description cannot exceed {MAX_DESCRIPTION_CHARS} characters"
            ));
        }
    }

    if let Some(priority) = &task.priority {
        if !VALID_PRIORITIES.contains(&priority.as_str()) {
            report.push("Invalid priority");
        }
    }

    if let Some(due_date) = &task.due_date {
        if !is_parseable_date(due_date) {
            report.push("Invalid due date");
        }
    }

    report
}

/// Check a print request: content presence and length, printer name type.
pub fn validate_print_data(request: &PrintRequest) -> ValidationReport {
    let mut report = ValidationReport::default();

    match &request.content {
        Some(content) if !content.trim().is_empty() => {
            if content.chars().count() > MAX_PRINT_CONTENT_CHARS {
                report.push(format!(
                    "Print content cannot exceed {MAX_PRINT_CONTENT_CHARS} characters"
                ));
            }
        }
        _ => report.push("Print content is required"),
    }

    if let Some(printer) = &request.printer {
        if !printer.is_string() {
            report.push("Printer name must be a string");
        }
    }

    report
}

/// Check an uploaded file's declared metadata against storage policy:
/// size cap and the image MIME allowlist.
pub fn validate_file(size_bytes: u64, mime_type: &str) -> ValidationReport {
    let mut report = ValidationReport::default();

    if size_bytes > MAX_FILE_SIZE_BYTES {
        report.push("File too large (max 10MB)");
    }

    if !ALLOWED_IMAGE_TYPES.contains(&normalize_mime_type(mime_type).as_str()) {
        report.push("File type not allowed (JPEG, PNG, GIF, WebP only)");
    }

    report
}

/// Trim surrounding whitespace and strip angle brackets.
///
/// A minimal XSS-character filter for values echoed back to clients, not a
/// complete sanitizer.
pub fn sanitize_string(input: &str) -> String {
    input.trim().chars().filter(|c| !matches!(c, '<' | '>')).collect()
}

/// Strip MIME parameters and lowercase, so `image/PNG; charset=x` compares
/// equal to `image/png`.
fn normalize_mime_type(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or(mime_type)
        .trim()
        .to_ascii_lowercase()
}

/// Accept RFC 3339/2822 date-times plus the common unzoned shapes clients
/// send from date pickers, down to a bare `YYYY-MM-DD`.
fn is_parseable_date(value: &str) -> bool {
    if DateTime::parse_from_rfc3339(value).is_ok() || DateTime::parse_from_rfc2822(value).is_ok() {
        return true;
    }

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    if DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
    {
        return true;
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(title: Option<&str>) -> Task {
        Task {
            title: title.map(str::to_string),
            description: None,
            priority: None,
            due_date: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn task_with_title_in_bounds_is_valid() {
        let report = validate_task(&task(Some("buy receipt paper")));
        assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);

        let mut full = task(Some("x"));
        full.description = Some("check the supply cupboard first".to_string());
        full.priority = Some("urgent".to_string());
        full.due_date = Some("2025-11-02T09:30:00Z".to_string());
        assert!(validate_task(&full).is_valid());
    }

    #[test]
    fn missing_or_blank_title_is_reported_by_name() {
        for bad in [task(None), task(Some("")), task(Some("   "))] {
            let report = validate_task(&bad);
            assert!(!report.is_valid());
            assert_eq!(report.errors, vec!["Title is required"]);
        }
    }

    #[test]
    fn title_length_boundary_is_exact() {
        assert!(validate_task(&task(Some(&"a".repeat(200)))).is_valid());

        let report = validate_task(&task(Some(&"a".repeat(201))));
        assert_eq!(report.errors, vec!["Title cannot exceed 200 characters"]);
    }

    #[test]
    fn all_violations_are_collected_together() {
        let mut bad = task(None);
        bad.description = Some("d".repeat(1001));
        bad.priority = Some("whenever".to_string());
        bad.due_date = Some("not a date".to_string());

        let report = validate_task(&bad);
        assert_eq!(report.errors.len(), 4);
        assert!(report.errors.iter().any(|e| e == "Title is required"));
        assert!(report.errors.iter().any(|e| e == "Invalid priority"));
        assert!(report.errors.iter().any(|e| e == "Invalid due date"));
    }

    #[test]
    fn every_listed_priority_is_accepted() {
        for priority in VALID_PRIORITIES {
            let mut t = task(Some("t"));
            t.priority = Some(priority.to_string());
            assert!(validate_task(&t).is_valid(), "rejected {priority}");
        }
    }

    #[test]
    fn due_date_accepts_common_shapes() {
        for value in [
            "2025-06-01",
            "2025-06-01 14:00",
            "2025-06-01T14:00:30",
            "2025-06-01T14:00:30+02:00",
        ] {
            let mut t = task(Some("t"));
            t.due_date = Some(value.to_string());
            assert!(validate_task(&t).is_valid(), "rejected {value}");
        }
    }

    #[test]
    fn print_data_requires_content() {
        let report = validate_print_data(&PrintRequest {
            content: Some(String::new()),
            printer: Some(json!("epson")),
        });
        assert_eq!(report.errors, vec!["Print content is required"]);
    }

    #[test]
    fn print_data_rejects_non_string_printer() {
        let report = validate_print_data(&PrintRequest {
            content: Some("ok".to_string()),
            printer: Some(json!(42)),
        });
        assert_eq!(report.errors, vec!["Printer name must be a string"]);
    }

    #[test]
    fn print_content_length_is_capped() {
        let report = validate_print_data(&PrintRequest {
            content: Some("x".repeat(5001)),
            printer: None,
        });
        assert_eq!(
            report.errors,
            vec!["Print content cannot exceed 5000 characters"]
        );
    }

    #[test]
    fn file_policy_checks_size_and_type() {
        assert!(validate_file(1024, "image/png").is_valid());
        assert!(validate_file(MAX_FILE_SIZE_BYTES, "image/webp").is_valid());

        let big = validate_file(MAX_FILE_SIZE_BYTES + 1, "image/png");
        assert_eq!(big.errors, vec!["File too large (max 10MB)"]);

        let svg = validate_file(10, "image/svg+xml");
        assert_eq!(
            svg.errors,
            vec!["File type not allowed (JPEG, PNG, GIF, WebP only)"]
        );

        let both = validate_file(MAX_FILE_SIZE_BYTES + 1, "text/plain");
        assert_eq!(both.errors.len(), 2);
    }

    #[test]
    fn mime_comparison_ignores_case_and_parameters() {
        assert!(validate_file(1, "image/PNG").is_valid());
        assert!(validate_file(1, "image/jpeg; charset=binary").is_valid());
    }

    #[test]
    fn sanitize_string_trims_and_strips_angle_brackets() {
        assert_eq!(sanitize_string("  <b>hello</b>  "), "bhello/b");
        assert_eq!(sanitize_string("plain.png"), "plain.png");
        assert_eq!(sanitize_string("<>"), "");
    }
}
