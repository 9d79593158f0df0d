use chrono::{DateTime, Utc};

use super::file_component;
use super::views::AuditReport;
use crate::audits::narrative::NarrativeVariant;
use crate::config::ReportConfig;

const LABEL_WIDTH: usize = 30;
const PAGE_BREAK: char = '\u{000C}';

/// Plain-text rendition of a report, already split into pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub pages: Vec<Vec<String>>,
}

impl Document {
    /// Pages joined with a form feed.
    pub fn render(&self) -> String {
        let pages: Vec<String> = self.pages.iter().map(|page| page.join("\n")).collect();
        let mut out = pages.join(&format!("\n{PAGE_BREAK}\n"));
        out.push('\n');
        out
    }

    pub fn line_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }
}

pub fn render_document(
    report: &AuditReport,
    layout: &ReportConfig,
    generated_on: DateTime<Utc>,
) -> Document {
    let width = layout.line_width.max(LABEL_WIDTH + 10);
    let mut lines = Vec::new();

    let title = match report.variant {
        NarrativeVariant::Executive => "EXECUTIVE REPORT",
        NarrativeVariant::Detailed => "DETAILED REPORT",
    };
    lines.push(centered(title, width));
    lines.push(centered("COMPLIANCE AUDIT", width));
    lines.push(String::new());

    lines.push("AUDIT INFORMATION".to_string());
    lines.push(field("Date:", &report.header.date_label));
    lines.push(field(
        "Date and time:",
        &report.header.date.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    ));
    lines.push(field("Area:", &report.header.area_name));
    lines.push(field("Code:", &report.header.code));
    lines.push(String::new());

    lines.push("RESULTS".to_string());
    lines.push(field("Compliance percentage:", &report.percentage_label));
    lines.push(field("Questions evaluated:", &report.total.to_string()));
    lines.push(field("Passed questions:", &report.passed.to_string()));
    lines.push(field("Failed questions:", &report.failed.to_string()));
    lines.push(String::new());

    lines.push("OVERALL EVALUATION".to_string());
    lines.push(centered(&report.tier_label.to_uppercase(), width));
    lines.push(field("Risk level:", report.risk_label));
    lines.push(String::new());

    lines.push("RESULTS ANALYSIS".to_string());
    for paragraph in report.narrative.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
        } else {
            lines.extend(wrap(paragraph, width));
        }
    }
    lines.push(String::new());
    lines.push(footer(generated_on, width));

    let per_page = layout.lines_per_page.max(1);
    let pages = lines.chunks(per_page).map(<[String]>::to_vec).collect();

    let prefix = match report.variant {
        NarrativeVariant::Executive => "executive_summary",
        NarrativeVariant::Detailed => "detailed_summary",
    };

    Document {
        file_name: format!("{prefix}_{}.txt", file_component(&report.header.code)),
        pages,
    }
}

fn field(label: &str, value: &str) -> String {
    format!("{label:<width$}{value}", width = LABEL_WIDTH)
}

fn centered(text: &str, width: usize) -> String {
    format!("{text:^width$}").trim_end().to_string()
}

fn footer(generated_on: DateTime<Utc>, width: usize) -> String {
    let left = format!(
        "generated on {}",
        generated_on.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let right = "Compliance Audit System";
    let gap = width.saturating_sub(left.len() + right.len()).max(1);
    format!("{left}{}{right}", " ".repeat(gap))
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
