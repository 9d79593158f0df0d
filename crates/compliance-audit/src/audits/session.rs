use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Answer, Area, AreaId, Audit, AuditId, Question};
use super::scoring::compute_compliance;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no questions registered for code {code}")]
    NoQuestionsForCode { code: String },
}

/// An audit being answered one question at a time.
///
/// The question set is snapshotted at start, so later registry edits never leak
/// into an audit that is already underway.
#[derive(Debug, Clone)]
pub struct AuditSession {
    audit: Audit,
    cursor: usize,
}

/// Result of answering the current question.
#[derive(Debug, Clone)]
pub enum SessionStep {
    InProgress(AuditSession),
    Completed(Audit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

/// Serializable snapshot of an open session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub audit_id: AuditId,
    pub area_id: AreaId,
    pub area_name: String,
    pub code: String,
    pub date: DateTime<Utc>,
    pub progress: Progress,
    pub current_question: Option<Question>,
}

impl AuditSession {
    pub fn start(
        id: AuditId,
        area: &Area,
        code: &str,
        questions: Vec<Question>,
        date: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestionsForCode {
                code: code.to_string(),
            });
        }

        Ok(Self {
            audit: Audit {
                id,
                area_id: area.id,
                area_name: area.name.clone(),
                code: code.to_string(),
                questions,
                answers: Default::default(),
                date,
                percentage: 0.0,
            },
            cursor: 0,
        })
    }

    pub fn id(&self) -> AuditId {
        self.audit.id
    }

    pub fn audit(&self) -> &Audit {
        &self.audit
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.audit.questions.get(self.cursor)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            answered: self.cursor,
            total: self.audit.questions.len(),
        }
    }

    /// Record the answer for the current question and advance. Answering the last
    /// question scores the audit and hands it back for commit.
    pub fn answer(mut self, value: bool, observation: impl Into<String>) -> SessionStep {
        if let Some(question) = self.audit.questions.get(self.cursor) {
            self.audit
                .answers
                .insert(question.id, Answer::new(value, observation));
            self.cursor += 1;
        }

        if self.cursor < self.audit.questions.len() {
            return SessionStep::InProgress(self);
        }

        let mut audit = self.audit;
        audit.percentage = compute_compliance(&audit.questions, &audit.answers);
        SessionStep::Completed(audit)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            audit_id: self.audit.id,
            area_id: self.audit.area_id,
            area_name: self.audit.area_name.clone(),
            code: self.audit.code.clone(),
            date: self.audit.date,
            progress: self.progress(),
            current_question: self.current_question().cloned(),
        }
    }
}
