use crate::audits::domain::SeverityTier;
use crate::audits::failures::FailureAnalysis;

fn heading(tier: SeverityTier) -> &'static str {
    match tier {
        SeverityTier::High => "High-criticality findings",
        SeverityTier::Medium => "Medium-severity findings",
        SeverityTier::Low => "Lower-criticality findings",
    }
}

/// Numbered list of failed questions per non-empty tier, most severe first.
pub(super) fn enumerate_failures(failures: &FailureAnalysis, out: &mut String) {
    if failures.is_empty() {
        return;
    }

    out.push('\n');
    for tier in SeverityTier::ordered() {
        let entries = failures.in_tier(tier);
        if entries.is_empty() {
            continue;
        }

        out.push_str(&format!("\n{}:\n", heading(tier)));
        for (idx, failure) in entries.iter().enumerate() {
            let observation = failure.observation.trim();
            let observation = if observation.is_empty() {
                "none recorded"
            } else {
                observation
            };
            out.push_str(&format!(
                "{}. {} [code {}, severity {}] observation: {}\n",
                idx + 1,
                failure.question.text,
                failure.question.code,
                failure.question.severity,
                observation,
            ));
        }
    }
    out.push('\n');
}
