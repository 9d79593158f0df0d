use serde::{Deserialize, Serialize};

use super::domain::{Area, AreaId, DomainError, Question, QuestionId, Severity, DEFAULT_CODE};
use super::import::ImportedQuestion;

/// Input for a manually entered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub text: String,
    pub severity: Severity,
    pub code: String,
}

/// Partial edit; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionUpdate {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Distinct code with the number of questions carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSummary {
    pub code: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("question {0} not found")]
    QuestionNotFound(QuestionId),
    #[error("area {0} not found")]
    AreaNotFound(AreaId),
}

/// Areas and questions held by the registry. Mutations validate at this boundary so
/// scoring code can assume well-formed records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    areas: Vec<Area>,
    questions: Vec<Question>,
}

impl Registry {
    pub fn new(areas: Vec<Area>, questions: Vec<Question>) -> Self {
        Self { areas, questions }
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn into_parts(self) -> (Vec<Area>, Vec<Question>) {
        (self.areas, self.questions)
    }

    pub fn area(&self, id: AreaId) -> Result<&Area, RegistryError> {
        self.areas
            .iter()
            .find(|area| area.id == id)
            .ok_or(RegistryError::AreaNotFound(id))
    }

    pub fn add_area(&mut self, name: &str) -> Result<Area, RegistryError> {
        let name = non_empty(name, "area name")?;
        let id = AreaId(self.areas.iter().map(|area| area.id.0).max().unwrap_or(0) + 1);
        let area = Area { id, name };
        self.areas.push(area.clone());
        Ok(area)
    }

    pub fn add_question(&mut self, input: NewQuestion) -> Result<Question, RegistryError> {
        let text = non_empty(&input.text, "question text")?;
        let code = non_empty(&input.code, "question code")?;
        let question = Question {
            id: self.next_question_id(),
            text,
            severity: input.severity,
            code,
        };
        self.questions.push(question.clone());
        Ok(question)
    }

    pub fn update_question(
        &mut self,
        id: QuestionId,
        update: QuestionUpdate,
    ) -> Result<Question, RegistryError> {
        let text = update
            .text
            .as_deref()
            .map(|text| non_empty(text, "question text"))
            .transpose()?;
        let code = update
            .code
            .as_deref()
            .map(|code| non_empty(code, "question code"))
            .transpose()?;

        let question = self
            .questions
            .iter_mut()
            .find(|question| question.id == id)
            .ok_or(RegistryError::QuestionNotFound(id))?;

        if let Some(text) = text {
            question.text = text;
        }
        if let Some(severity) = update.severity {
            question.severity = severity;
        }
        if let Some(code) = code {
            question.code = code;
        }

        Ok(question.clone())
    }

    pub fn delete_question(&mut self, id: QuestionId) -> Result<Question, RegistryError> {
        let position = self
            .questions
            .iter()
            .position(|question| question.id == id)
            .ok_or(RegistryError::QuestionNotFound(id))?;
        Ok(self.questions.remove(position))
    }

    /// Append parsed import lines under `code` (or the default code), numbering them
    /// sequentially after the current highest id.
    pub fn import_questions(
        &mut self,
        imported: Vec<ImportedQuestion>,
        code: Option<&str>,
    ) -> Vec<Question> {
        let code = code
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .unwrap_or(DEFAULT_CODE)
            .to_string();

        let mut next = self.next_question_id().0;
        let added: Vec<Question> = imported
            .into_iter()
            .map(|item| {
                let question = Question {
                    id: QuestionId(next),
                    text: item.text,
                    severity: item.severity,
                    code: code.clone(),
                };
                next += 1;
                question
            })
            .collect();

        self.questions.extend(added.iter().cloned());
        added
    }

    /// Ordered snapshot of the questions carrying `code`.
    pub fn questions_for_code(&self, code: &str) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|question| question.code == code)
            .cloned()
            .collect()
    }

    /// Distinct codes other than the default, in first-seen order.
    pub fn code_summaries(&self) -> Vec<CodeSummary> {
        let mut summaries: Vec<CodeSummary> = Vec::new();
        for question in &self.questions {
            if question.code.is_empty() || question.code == DEFAULT_CODE {
                continue;
            }
            match summaries
                .iter_mut()
                .find(|summary| summary.code == question.code)
            {
                Some(summary) => summary.count += 1,
                None => summaries.push(CodeSummary {
                    code: question.code.clone(),
                    count: 1,
                }),
            }
        }
        summaries
    }

    fn next_question_id(&self) -> QuestionId {
        QuestionId(
            self.questions
                .iter()
                .map(|question| question.id.0)
                .max()
                .unwrap_or(0)
                + 1,
        )
    }
}

fn non_empty(value: &str, field: &'static str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DomainError::Empty { field })
    } else {
        Ok(trimmed.to_string())
    }
}
