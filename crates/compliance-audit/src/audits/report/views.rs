use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::audits::domain::{AreaId, AuditId, QuestionId, SeverityTier};
use crate::audits::grading::{RiskLevel, Tier};
use crate::audits::narrative::NarrativeVariant;

#[derive(Debug, Clone, Serialize)]
pub struct ReportHeader {
    pub audit_id: AuditId,
    pub area_id: AreaId,
    pub area_name: String,
    pub code: String,
    pub date: DateTime<Utc>,
    pub date_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedQuestionView {
    pub question_id: QuestionId,
    pub text: String,
    pub code: String,
    pub severity: u8,
    pub tier: SeverityTier,
    pub tier_label: &'static str,
    pub observation: String,
}

/// Report bundle returned by the API and consumed by the exporters.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub header: ReportHeader,
    pub variant: NarrativeVariant,
    pub percentage: f64,
    pub percentage_label: String,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
    pub tier: Tier,
    pub tier_label: &'static str,
    pub risk: RiskLevel,
    pub risk_label: &'static str,
    pub severity_counts: SeverityCounts,
    pub impact_percentage: f64,
    pub narrative: String,
    /// Most severe first.
    pub failed_questions: Vec<FailedQuestionView>,
}
