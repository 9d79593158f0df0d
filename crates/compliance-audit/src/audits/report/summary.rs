use super::percent_label;
use super::views::{AuditReport, FailedQuestionView, ReportHeader, SeverityCounts};
use crate::audits::domain::Audit;
use crate::audits::failures::classify_failures;
use crate::audits::grading::grade;
use crate::audits::narrative::{self, NarrativeVariant};
use crate::audits::scoring::count_passed;

impl AuditReport {
    pub fn build(audit: &Audit, variant: NarrativeVariant) -> Self {
        let passed = count_passed(&audit.questions, &audit.answers);
        let total = audit.total();
        let grade = grade(audit.percentage);
        let failures = classify_failures(&audit.questions, &audit.answers);

        let failed_questions = failures
            .by_severity()
            .into_iter()
            .map(|failure| FailedQuestionView {
                question_id: failure.question.id,
                text: failure.question.text.clone(),
                code: failure.question.code.clone(),
                severity: failure.question.severity.value(),
                tier: failure.tier(),
                tier_label: failure.tier().label(),
                observation: failure.observation.clone(),
            })
            .collect();

        Self {
            header: ReportHeader {
                audit_id: audit.id,
                area_id: audit.area_id,
                area_name: audit.area_name.clone(),
                code: audit.code.clone(),
                date: audit.date,
                date_label: audit.date.format("%Y-%m-%d").to_string(),
            },
            variant,
            percentage: audit.percentage,
            percentage_label: percent_label(audit.percentage),
            passed,
            failed: total - passed,
            total,
            tier: grade.tier,
            tier_label: grade.tier.label(),
            risk: grade.risk,
            risk_label: grade.risk.label(),
            severity_counts: SeverityCounts {
                high: failures.high,
                medium: failures.medium,
                low: failures.low,
            },
            impact_percentage: failures.impact_percentage,
            narrative: narrative::generate(audit, passed, total, grade.tier, variant),
            failed_questions,
        }
    }
}
