mod document;
mod export;
mod summary;
pub mod views;

pub use document::{render_document, Document};
pub use export::{ExportError, ExportKind, Sheet, Workbook};
pub use views::{AuditReport, FailedQuestionView, ReportHeader, SeverityCounts};

pub(crate) fn percent_label(value: f64) -> String {
    format!("{value:.1}%")
}

pub(crate) fn status_label(compliant: bool) -> &'static str {
    if compliant {
        "Compliant"
    } else {
        "Non-compliant"
    }
}

// Keeps user-entered names safe to use as a file name.
pub(crate) fn file_component(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "audit".to_string()
    } else {
        cleaned
    }
}
