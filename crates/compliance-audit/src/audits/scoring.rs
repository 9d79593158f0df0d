use super::domain::{AnswerSet, Question};

/// Severity-weighted share of positively answered questions, in `[0, 100]`.
///
/// Unanswered questions count against compliance. An empty question set (or one
/// with no weight) scores 0 rather than dividing by zero.
pub fn compute_compliance(questions: &[Question], answers: &AnswerSet) -> f64 {
    let total_weight: u32 = questions.iter().map(|q| q.severity.weight()).sum();
    if total_weight == 0 {
        return 0.0;
    }

    let positive_weight: u32 = questions
        .iter()
        .filter(|q| is_positive(q, answers))
        .map(|q| q.severity.weight())
        .sum();

    f64::from(positive_weight) / f64::from(total_weight) * 100.0
}

/// Number of questions answered `true`.
pub fn count_passed(questions: &[Question], answers: &AnswerSet) -> usize {
    questions.iter().filter(|q| is_positive(q, answers)).count()
}

pub(crate) fn is_positive(question: &Question, answers: &AnswerSet) -> bool {
    answers
        .get(&question.id)
        .map(|answer| answer.value)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audits::domain::{Answer, QuestionId, Severity};

    fn questions(severities: &[u8]) -> Vec<Question> {
        severities
            .iter()
            .enumerate()
            .map(|(idx, severity)| Question {
                id: QuestionId(idx as u32 + 1),
                text: format!("Control {}", idx + 1),
                severity: Severity::new(*severity).expect("valid severity"),
                code: "ISO".to_string(),
            })
            .collect()
    }

    fn answers(values: &[bool]) -> AnswerSet {
        values
            .iter()
            .enumerate()
            .map(|(idx, value)| (QuestionId(idx as u32 + 1), Answer::new(*value, "")))
            .collect()
    }

    #[test]
    fn all_true_scores_exactly_one_hundred() {
        let qs = questions(&[3, 7, 10, 1]);
        assert_eq!(compute_compliance(&qs, &answers(&[true; 4])), 100.0);
    }

    #[test]
    fn all_false_scores_exactly_zero() {
        let qs = questions(&[3, 7, 10, 1]);
        assert_eq!(compute_compliance(&qs, &answers(&[false; 4])), 0.0);
    }

    #[test]
    fn empty_question_set_scores_zero() {
        assert_eq!(compute_compliance(&[], &AnswerSet::new()), 0.0);
    }

    #[test]
    fn weights_answers_by_severity() {
        let qs = questions(&[10, 8, 5, 3, 1]);
        let score = compute_compliance(&qs, &answers(&[true, false, true, true, false]));
        assert!((score - 18.0 / 27.0 * 100.0).abs() < 1e-9);
        assert_eq!(format!("{score:.1}"), "66.7");
    }

    #[test]
    fn unanswered_questions_count_as_non_compliant() {
        let qs = questions(&[5, 5]);
        let mut partial = AnswerSet::new();
        partial.insert(QuestionId(1), Answer::new(true, ""));
        assert_eq!(compute_compliance(&qs, &partial), 50.0);
        assert_eq!(count_passed(&qs, &partial), 1);
    }

    #[test]
    fn score_is_invariant_under_reordering() {
        let qs = questions(&[10, 8, 5, 3, 1]);
        let set = answers(&[true, false, true, true, false]);
        let mut reversed = qs.clone();
        reversed.reverse();

        let mut with_unrelated = set.clone();
        with_unrelated.insert(QuestionId(404), Answer::new(true, "not part of audit"));

        let baseline = compute_compliance(&qs, &set);
        assert_eq!(compute_compliance(&reversed, &set), baseline);
        assert_eq!(compute_compliance(&qs, &with_unrelated), baseline);
    }
}
