//! Deterministic report prose.
//!
//! Both variants assemble the same ordered segments (intro, compliance framing,
//! quantitative summary, severity breakdown, risk, recommendation) and lowercase the
//! final text. The detailed variant adds elaboration to each segment and enumerates
//! the failed questions after the severity breakdown.

mod findings;
mod segments;

use serde::{Deserialize, Serialize};

use super::domain::Audit;
use super::failures::{classify_failures, FailureAnalysis};
use super::grading::{RiskLevel, Tier};

/// Which narrative a report carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeVariant {
    #[default]
    Executive,
    Detailed,
}

/// Opening framing of the compliance figure. Uses its own 90/70/50 cut points,
/// independent of the 80/60/40 grade bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceFraming {
    Exemplary,
    Mature,
    Improvable,
    Deficient,
}

impl ComplianceFraming {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            Self::Exemplary
        } else if percentage >= 70.0 {
            Self::Mature
        } else if percentage >= 50.0 {
            Self::Improvable
        } else {
            Self::Deficient
        }
    }
}

pub fn generate_narrative(audit: &Audit, passed: usize, total: usize, tier: Tier) -> String {
    generate(audit, passed, total, tier, NarrativeVariant::Executive)
}

pub fn generate_detailed_narrative(
    audit: &Audit,
    passed: usize,
    total: usize,
    tier: Tier,
) -> String {
    generate(audit, passed, total, tier, NarrativeVariant::Detailed)
}

pub(crate) struct NarrativeContext<'a> {
    pub audit: &'a Audit,
    pub passed: usize,
    pub total: usize,
    pub tier: Tier,
    pub risk: RiskLevel,
    pub failures: FailureAnalysis,
    pub detailed: bool,
}

pub fn generate(
    audit: &Audit,
    passed: usize,
    total: usize,
    tier: Tier,
    variant: NarrativeVariant,
) -> String {
    let ctx = NarrativeContext {
        audit,
        passed,
        total,
        tier,
        risk: RiskLevel::from_percentage(audit.percentage),
        failures: classify_failures(&audit.questions, &audit.answers),
        detailed: variant == NarrativeVariant::Detailed,
    };

    let mut text = String::new();
    segments::intro(&ctx, &mut text);
    segments::compliance_framing(&ctx, &mut text);
    segments::quantitative_summary(&ctx, &mut text);
    segments::severity_breakdown(&ctx, &mut text);
    if ctx.detailed {
        findings::enumerate_failures(&ctx.failures, &mut text);
    }
    segments::risk_statement(&ctx, &mut text);
    segments::recommendation(&ctx, &mut text);

    text.trim_end().to_lowercase()
}
