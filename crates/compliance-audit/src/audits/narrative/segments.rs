use super::{ComplianceFraming, NarrativeContext};
use crate::audits::domain::SeverityTier;
use crate::audits::grading::{RiskLevel, Tier};

pub(super) fn intro(ctx: &NarrativeContext<'_>, out: &mut String) {
    out.push_str(&format!(
        "The compliance audit performed on the {} area on {} presents a compliance level rated {}. ",
        ctx.audit.area_name,
        ctx.audit.date.format("%Y-%m-%d"),
        ctx.tier.label(),
    ));

    if ctx.detailed {
        out.push_str(&format!(
            "The audit evaluated {} control{} under code {}, each weighted by a severity between 1 and 10. ",
            ctx.total,
            plural(ctx.total),
            ctx.audit.code,
        ));
    }
}

pub(super) fn compliance_framing(ctx: &NarrativeContext<'_>, out: &mut String) {
    let pct = ctx.audit.percentage;
    let framing = ComplianceFraming::from_percentage(pct);

    let (headline, elaboration) = match framing {
        ComplianceFraming::Exemplary => (
            "this area demonstrates exemplary performance in its security controls",
            "The evaluated controls are consistently implemented and documented.",
        ),
        ComplianceFraming::Mature => (
            "the area shows a good level of maturity in its security controls",
            "Most controls are in place, although isolated gaps remain.",
        ),
        ComplianceFraming::Improvable => (
            "there are clear opportunities to improve the controls in place",
            "A meaningful share of the controls is missing or only partially effective.",
        ),
        ComplianceFraming::Deficient => (
            "significant deficiencies were identified that require immediate attention",
            "The control environment does not currently provide reasonable assurance.",
        ),
    };

    out.push_str(&format!("With {pct:.1}% compliance, {headline}. "));
    if ctx.detailed {
        out.push_str(&format!("{elaboration} "));
    }
}

pub(super) fn quantitative_summary(ctx: &NarrativeContext<'_>, out: &mut String) {
    let failed = ctx.total.saturating_sub(ctx.passed);
    let pass_rate = whole_percent(ctx.passed, ctx.total);
    let fail_rate = whole_percent(failed, ctx.total);

    out.push_str(&format!(
        "Of a total of {} controls evaluated, {} ({}%) {} implemented correctly, while {} ({}%) {} deficiencies. ",
        ctx.total,
        ctx.passed,
        pass_rate,
        if ctx.passed == 1 { "was" } else { "were" },
        failed,
        fail_rate,
        if failed == 1 { "shows" } else { "show" },
    ));

    if ctx.detailed {
        out.push_str(&format!(
            "Because each control is weighted by severity, the compliance figure of {:.1}% can differ from the simple pass rate of {}%. ",
            ctx.audit.percentage, pass_rate,
        ));
    }
}

pub(super) fn severity_breakdown(ctx: &NarrativeContext<'_>, out: &mut String) {
    let failures = &ctx.failures;
    if failures.is_empty() {
        if ctx.detailed {
            out.push_str("No control was found to be non-compliant. ");
        }
        return;
    }

    out.push_str("The analysis of the non-compliant controls reveals: ");

    for tier in SeverityTier::ordered() {
        let count = failures.count(tier);
        if count == 0 {
            continue;
        }
        let single = count == 1;
        let clause = match tier {
            SeverityTier::High => format!(
                "{count} high-criticality control{} (severity 8 or above), which {} a significant risk to the security of the area. ",
                plural(count),
                if single { "represents" } else { "represent" },
            ),
            SeverityTier::Medium => format!(
                "{count} medium-severity control{} (severity 5-7) that {} the robustness of the control environment. ",
                plural(count),
                if single { "weakens" } else { "weaken" },
            ),
            SeverityTier::Low => format!(
                "{count} lower-criticality control{} that, while less urgent, {} to the overall maturity level. ",
                plural(count),
                if single { "contributes" } else { "contribute" },
            ),
        };
        out.push_str(&clause);
    }

    out.push_str(&format!(
        "Considering the relative weight of the non-compliant controls, the actual impact on security is estimated at {:.1}% of the total security program. ",
        failures.impact_percentage,
    ));

    if ctx.detailed {
        out.push_str(
            "Each failed control is listed below, grouped by severity tier and ordered from the most to the least severe.",
        );
    }
}

pub(super) fn risk_statement(ctx: &NarrativeContext<'_>, out: &mut String) {
    out.push_str(&format!(
        "The overall risk level is classified as {}. ",
        ctx.risk.label()
    ));

    if ctx.detailed {
        let elaboration = match ctx.risk {
            RiskLevel::Low => "Residual risk is limited to the specific gaps noted in this report.",
            RiskLevel::Moderate => "The open gaps could be exploited if they are left unattended.",
            RiskLevel::High => "The open gaps expose the area to incidents with material impact.",
            RiskLevel::Critical => {
                "The area is exposed to incidents with severe operational and regulatory impact."
            }
        };
        out.push_str(&format!("{elaboration} "));
    }
}

pub(super) fn recommendation(ctx: &NarrativeContext<'_>, out: &mut String) {
    let pct = ctx.audit.percentage;

    if ctx.detailed && ctx.failures.high > 0 {
        out.push_str(&format!(
            "Remediation should start with the {} high-criticality control{} identified above. ",
            ctx.failures.high,
            plural(ctx.failures.high),
        ));
    }

    let paragraph = match Tier::from_percentage(pct) {
        Tier::Excellent => "It is recommended to maintain the current high standards, implement continuous improvements in the identified areas, and consider adopting additional best practices. Ongoing staff training and periodic control reviews will help sustain this level of excellence.",
        Tier::Good => "It is recommended to develop a structured action plan that prioritizes the deficiencies of highest severity. Assigning specific resources and defining owners will make it possible to close the identified gaps. Periodic reviews are essential to monitor the progress of the improvements implemented.",
        Tier::Regular => "It is URGENTLY recommended to develop and implement an immediate and comprehensive action plan. Priority resources must be assigned to address the critical and high-severity deficiencies. Area management must be actively involved to ensure that the deadlines of the remediation plan are met. The follow-up audit should take place within no more than 3 months.",
        Tier::NeedsImprovement => "IMMEDIATE INTERVENTION by executive and information security management is required. It is imperative to assign specialized resources and establish an aggressive remediation program with short, medium and long-term goals. All critical deficiencies must be addressed within a maximum of 30 days. A monthly follow-up audit is recommended until at least 60% compliance is reached. The current situation exposes the organization to significant operational and regulatory risks.",
    };
    out.push_str(paragraph);
}

fn whole_percent(part: usize, total: usize) -> i64 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as i64
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
