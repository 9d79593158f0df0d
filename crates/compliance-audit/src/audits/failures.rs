use serde::Serialize;

use super::domain::{AnswerSet, Question, SeverityTier};
use super::scoring::is_positive;

/// A non-compliant question together with the observation recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedQuestion {
    pub question: Question,
    pub observation: String,
}

impl FailedQuestion {
    pub fn tier(&self) -> SeverityTier {
        self.question.severity.tier()
    }
}

/// Severity breakdown of the failed subset of an audit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureAnalysis {
    /// Failed questions in audit order.
    pub failed: Vec<FailedQuestion>,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Severity-weighted share of the program left unmitigated, in `[0, 100]`.
    pub impact_percentage: f64,
}

impl FailureAnalysis {
    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn count(&self, tier: SeverityTier) -> usize {
        match tier {
            SeverityTier::High => self.high,
            SeverityTier::Medium => self.medium,
            SeverityTier::Low => self.low,
        }
    }

    /// Failures ordered for reporting: severity descending, audit order on ties.
    pub fn by_severity(&self) -> Vec<&FailedQuestion> {
        let mut ordered: Vec<&FailedQuestion> = self.failed.iter().collect();
        ordered.sort_by(|a, b| b.question.severity.cmp(&a.question.severity));
        ordered
    }

    pub fn in_tier(&self, tier: SeverityTier) -> Vec<&FailedQuestion> {
        self.by_severity()
            .into_iter()
            .filter(|failure| failure.tier() == tier)
            .collect()
    }
}

pub fn classify_failures(questions: &[Question], answers: &AnswerSet) -> FailureAnalysis {
    let failed: Vec<FailedQuestion> = questions
        .iter()
        .filter(|question| !is_positive(question, answers))
        .map(|question| FailedQuestion {
            question: question.clone(),
            observation: answers
                .get(&question.id)
                .map(|answer| answer.observation.clone())
                .unwrap_or_default(),
        })
        .collect();

    let (mut high, mut medium, mut low) = (0, 0, 0);
    for failure in &failed {
        match failure.tier() {
            SeverityTier::High => high += 1,
            SeverityTier::Medium => medium += 1,
            SeverityTier::Low => low += 1,
        }
    }

    let total_weight: u32 = questions.iter().map(|q| q.severity.weight()).sum();
    let failed_weight: u32 = failed
        .iter()
        .map(|failure| failure.question.severity.weight())
        .sum();
    let impact_percentage = if total_weight > 0 {
        f64::from(failed_weight) / f64::from(total_weight) * 100.0
    } else {
        0.0
    };

    FailureAnalysis {
        failed,
        high,
        medium,
        low,
        impact_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audits::domain::{Answer, QuestionId, Severity};

    fn fixture(severities: &[u8], values: &[Option<bool>]) -> (Vec<Question>, AnswerSet) {
        let questions = severities
            .iter()
            .enumerate()
            .map(|(idx, severity)| Question {
                id: QuestionId(idx as u32 + 1),
                text: format!("Control {}", idx + 1),
                severity: Severity::new(*severity).expect("valid severity"),
                code: "ISO".to_string(),
            })
            .collect();
        let answers = values
            .iter()
            .enumerate()
            .filter_map(|(idx, value)| {
                value.map(|value| {
                    (
                        QuestionId(idx as u32 + 1),
                        Answer::new(value, format!("note {}", idx + 1)),
                    )
                })
            })
            .collect();
        (questions, answers)
    }

    #[test]
    fn classifies_reference_audit() {
        let (questions, answers) = fixture(
            &[10, 8, 5, 3, 1],
            &[Some(true), Some(false), Some(true), Some(true), Some(false)],
        );
        let analysis = classify_failures(&questions, &answers);

        assert_eq!((analysis.high, analysis.medium, analysis.low), (1, 0, 1));
        assert_eq!(analysis.failed.len(), 2);
        assert_eq!(format!("{:.1}", analysis.impact_percentage), "33.3");
    }

    #[test]
    fn tier_counts_sum_to_failed_count() {
        let (questions, answers) = fixture(
            &[1, 4, 5, 7, 8, 10, 2, 6],
            &[None, Some(false), Some(false), Some(true), Some(false), None, Some(true), Some(false)],
        );
        let analysis = classify_failures(&questions, &answers);
        assert_eq!(
            analysis.high + analysis.medium + analysis.low,
            analysis.failed.len()
        );
        assert_eq!((analysis.high, analysis.medium, analysis.low), (2, 2, 2));
    }

    #[test]
    fn missing_answers_fail_with_empty_observation() {
        let (questions, answers) = fixture(&[6], &[None]);
        let analysis = classify_failures(&questions, &answers);
        assert_eq!(analysis.failed[0].observation, "");
        assert_eq!(analysis.impact_percentage, 100.0);
    }

    #[test]
    fn reporting_order_is_severity_descending_and_stable() {
        let (questions, answers) = fixture(&[3, 9, 3, 9, 6], &[Some(false); 5]);
        let analysis = classify_failures(&questions, &answers);
        let order: Vec<u32> = analysis
            .by_severity()
            .iter()
            .map(|failure| failure.question.id.0)
            .collect();
        assert_eq!(order, vec![2, 4, 5, 1, 3]);
        assert_eq!(analysis.in_tier(SeverityTier::Low).len(), 2);
    }

    #[test]
    fn empty_audit_has_no_impact() {
        let analysis = classify_failures(&[], &AnswerSet::new());
        assert!(analysis.is_empty());
        assert_eq!(analysis.impact_percentage, 0.0);
    }
}
