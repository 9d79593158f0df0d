use serde::{Deserialize, Serialize};

use super::{file_component, percent_label, status_label};
use crate::audits::domain::{Audit, Question};
use crate::audits::grading::Tier;
use crate::audits::scoring::count_passed;

const RULE_WIDTH: usize = 80;

/// Spreadsheet flavors offered for a completed audit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    #[default]
    Answers,
    Detailed,
    Complete,
}

impl ExportKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Answers => "Answers",
            Self::Detailed => "Detailed",
            Self::Complete => "Complete",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv output: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv output was not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// One worksheet, written out as its own CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub file_name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn new(name: &str, file_name: String) -> Self {
        Self {
            name: name.to_string(),
            file_name,
            rows: Vec::new(),
        }
    }

    fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    fn blank(&mut self) {
        self.rows.push(Vec::new());
    }

    fn rule(&mut self) {
        self.row(["=".repeat(RULE_WIDTH)]);
    }

    /// Rows have varying widths, so the writer runs in flexible mode.
    pub fn to_csv(&self) -> Result<String, ExportError> {
        let mut bytes = Vec::new();
        for row in &self.rows {
            if row.is_empty() {
                // csv writes an empty record as `""`; a separator is a bare line.
                bytes.push(b'\n');
            } else {
                let mut writer = csv::WriterBuilder::new()
                    .flexible(true)
                    .from_writer(&mut bytes);
                writer.write_record(row)?;
                writer.flush()?;
            }
        }
        Ok(String::from_utf8(bytes)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workbook {
    pub kind: ExportKind,
    /// Download name for the whole workbook; single-sheet workbooks reuse the sheet's.
    pub file_name: String,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn build(audit: &Audit, kind: ExportKind) -> Self {
        let facts = AuditFacts::from(audit);
        let code = file_component(&audit.code);
        let sheets = match kind {
            ExportKind::Answers => vec![answers_sheet(audit, &facts)],
            ExportKind::Detailed => vec![detailed_sheet(
                audit,
                &facts,
                format!("detailed_{code}.csv"),
            )],
            ExportKind::Complete => {
                vec![
                    executive_sheet(audit, &facts, format!("complete_{code}_executive_summary.csv")),
                    detailed_sheet(audit, &facts, format!("complete_{code}_detailed_summary.csv")),
                    analysis_sheet(audit, &facts, format!("complete_{code}_complete_analysis.csv")),
                ]
            }
        };

        let file_name = match sheets.as_slice() {
            [single] => single.file_name.clone(),
            _ => format!("complete_{code}.csv"),
        };

        Self {
            kind,
            file_name,
            sheets,
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// All sheets concatenated, each preceded by a `# <sheet name>` marker row.
    pub fn to_csv(&self) -> Result<String, ExportError> {
        let mut out = String::new();
        for sheet in &self.sheets {
            if self.sheets.len() > 1 {
                out.push_str(&format!("# {}\n", sheet.name));
            }
            out.push_str(&sheet.to_csv()?);
        }
        Ok(out)
    }
}

struct AuditFacts {
    passed: usize,
    total: usize,
    percentage: String,
    tier: Tier,
}

impl From<&Audit> for AuditFacts {
    fn from(audit: &Audit) -> Self {
        Self {
            passed: count_passed(&audit.questions, &audit.answers),
            total: audit.total(),
            percentage: percent_label(audit.percentage),
            tier: Tier::from_percentage(audit.percentage),
        }
    }
}

impl AuditFacts {
    fn failed(&self) -> usize {
        self.total - self.passed
    }

    fn tier_upper(&self) -> String {
        self.tier.label().to_uppercase()
    }
}

fn answers_sheet(audit: &Audit, facts: &AuditFacts) -> Sheet {
    let mut sheet = Sheet::new(
        &audit.area_name,
        format!(
            "answers_{}_{}.csv",
            file_component(&audit.area_name),
            file_component(&audit.code)
        ),
    );
    sheet.row(["COMPLIANCE AUDIT ANSWERS"]);
    sheet.blank();
    audit_information(&mut sheet, audit, false);
    sheet.blank();
    sheet.row(["#", "Question", "Status", "Observation"]);
    for (idx, question) in audit.questions.iter().enumerate() {
        sheet.row([
            (idx + 1).to_string(),
            question.text.clone(),
            status_label(audit.is_compliant(question.id)).to_string(),
            audit.observation_for(question.id).to_string(),
        ]);
    }
    sheet.blank();
    sheet.rule();
    sheet.row(["COMPLIANCE SUMMARY"]);
    sheet.rule();
    sheet.blank();
    sheet.row(["Compliance percentage:".to_string(), facts.percentage.clone()]);
    sheet.row([
        "Passed questions:".to_string(),
        format!("{} of {}", facts.passed, facts.total),
    ]);
    sheet.row([
        "Failed questions:".to_string(),
        format!("{} of {}", facts.failed(), facts.total),
    ]);
    sheet.blank();
    sheet.row(["Overall evaluation:".to_string(), facts.tier_upper()]);
    sheet.rule();
    sheet
}

fn detailed_sheet(audit: &Audit, facts: &AuditFacts, file_name: String) -> Sheet {
    let mut sheet = Sheet::new("Detailed Summary", file_name);
    sheet.row(["DETAILED COMPLIANCE AUDIT REPORT"]);
    sheet.blank();
    sheet.row(["General information"]);
    audit_information(&mut sheet, audit, true);
    sheet.blank();
    sheet.row(["RESULTS BY QUESTION"]);
    sheet.row(["#", "Question", "Answer", "Status", "Observation"]);
    for (idx, question) in audit.questions.iter().enumerate() {
        let compliant = audit.is_compliant(question.id);
        sheet.row([
            (idx + 1).to_string(),
            question.text.clone(),
            if compliant { "YES" } else { "NO" }.to_string(),
            status_label(compliant).to_string(),
            observation_or_placeholder(audit, question),
        ]);
    }
    sheet.blank();
    sheet.rule();
    sheet.row(["FINAL SUMMARY"]);
    sheet.rule();
    sheet.blank();
    sheet.row([
        "Questions evaluated:".to_string(),
        facts.total.to_string(),
    ]);
    sheet.row(["Positive answers:".to_string(), facts.passed.to_string()]);
    sheet.row(["Negative answers:".to_string(), facts.failed().to_string()]);
    sheet.row(["Compliance percentage:".to_string(), facts.percentage.clone()]);
    sheet.row(["Overall evaluation:".to_string(), facts.tier_upper()]);
    sheet.rule();
    sheet
}

fn executive_sheet(audit: &Audit, facts: &AuditFacts, file_name: String) -> Sheet {
    let mut sheet = Sheet::new("Executive Summary", file_name);
    sheet.row(["EXECUTIVE SUMMARY - COMPLIANCE AUDIT"]);
    sheet.blank();
    sheet.row(["Audit information"]);
    sheet.row(["Date:".to_string(), audit.date.format("%Y-%m-%d").to_string()]);
    sheet.row(["Area:".to_string(), audit.area_name.clone()]);
    sheet.row(["Code:".to_string(), audit.code.clone()]);
    sheet.blank();
    sheet.row(["Results"]);
    sheet.row(["Compliance percentage:".to_string(), facts.percentage.clone()]);
    sheet.row(["Questions evaluated:".to_string(), facts.total.to_string()]);
    sheet.row(["Passed questions:".to_string(), facts.passed.to_string()]);
    sheet.row(["Failed questions:".to_string(), facts.failed().to_string()]);
    sheet.blank();
    sheet.row(["Overall evaluation:".to_string(), facts.tier_upper()]);
    sheet
}

fn analysis_sheet(audit: &Audit, facts: &AuditFacts, file_name: String) -> Sheet {
    let total_weight: u32 = audit.questions.iter().map(|q| q.severity.weight()).sum();

    let mut sheet = Sheet::new("Complete Analysis", file_name);
    sheet.row(["COMPLETE COMPLIANCE AUDIT"]);
    sheet.blank();
    sheet.rule();
    sheet.row(["GENERAL INFORMATION"]);
    audit_information(&mut sheet, audit, false);
    sheet.blank();
    sheet.rule();
    sheet.row(["COMPLETE ANALYSIS BY QUESTION"]);
    sheet.row([
        "#",
        "Question",
        "Severity",
        "Status",
        "Relative weight",
        "Observation",
    ]);
    for (idx, question) in audit.questions.iter().enumerate() {
        sheet.row([
            (idx + 1).to_string(),
            question.text.clone(),
            question.severity.to_string(),
            status_label(audit.is_compliant(question.id)).to_string(),
            relative_weight(question, total_weight),
            audit.observation_for(question.id).to_string(),
        ]);
    }
    sheet.blank();
    sheet.rule();
    sheet.row(["COMPLIANCE SUMMARY"]);
    sheet.rule();
    sheet.blank();
    sheet.row(["Compliance percentage:".to_string(), facts.percentage.clone()]);
    sheet.row([
        "Passed questions:".to_string(),
        format!("{} of {}", facts.passed, facts.total),
    ]);
    sheet.row([
        "Failed questions:".to_string(),
        format!("{} of {}", facts.failed(), facts.total),
    ]);
    sheet.row(["Overall evaluation:".to_string(), facts.tier_upper()]);
    sheet.rule();
    sheet
}

fn audit_information(sheet: &mut Sheet, audit: &Audit, with_percentage: bool) {
    sheet.row(["Date:".to_string(), audit.date.format("%Y-%m-%d").to_string()]);
    sheet.row([
        "Date and time:".to_string(),
        audit.date.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    ]);
    sheet.row(["Area:".to_string(), audit.area_name.clone()]);
    sheet.row(["Code:".to_string(), audit.code.clone()]);
    if with_percentage {
        sheet.row([
            "Compliance percentage:".to_string(),
            percent_label(audit.percentage),
        ]);
    }
}

fn observation_or_placeholder(audit: &Audit, question: &Question) -> String {
    let observation = audit.observation_for(question.id).trim();
    if !observation.is_empty() {
        return observation.to_string();
    }
    if audit.is_compliant(question.id) {
        "Meets requirement".to_string()
    } else {
        "Requires attention".to_string()
    }
}

fn relative_weight(question: &Question, total_weight: u32) -> String {
    if total_weight == 0 {
        return percent_label(0.0);
    }
    percent_label(f64::from(question.severity.weight()) / f64::from(total_weight) * 100.0)
}
