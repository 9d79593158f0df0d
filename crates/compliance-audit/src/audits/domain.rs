use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Code assigned to imported questions when none is supplied.
pub const DEFAULT_CODE: &str = "DEFAULT";

pub const MIN_SEVERITY: u8 = 1;
pub const MAX_SEVERITY: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditId(pub u32);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Question weight, always within `[1, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub fn new(value: u8) -> Result<Self, DomainError> {
        if (MIN_SEVERITY..=MAX_SEVERITY).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::SeverityOutOfRange(i64::from(value)))
        }
    }

    /// Lenient constructor used by bulk import.
    pub fn clamped(value: i64) -> Self {
        let bounded = value.clamp(i64::from(MIN_SEVERITY), i64::from(MAX_SEVERITY));
        Self(bounded as u8)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn weight(self) -> u32 {
        self.0 as u32
    }

    pub const fn tier(self) -> SeverityTier {
        if self.0 >= 8 {
            SeverityTier::High
        } else if self.0 >= 5 {
            SeverityTier::Medium
        } else {
            SeverityTier::Low
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self(MIN_SEVERITY)
    }
}

impl TryFrom<u8> for Severity {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Severity> for u8 {
    fn from(value: Severity) -> Self {
        value.0
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed severity buckets used by failure analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    High,
    Medium,
    Low,
}

impl SeverityTier {
    pub const fn ordered() -> [Self; 3] {
        [Self::High, Self::Medium, Self::Low]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub severity: Severity,
    pub code: String,
}

/// Response to a single checklist question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Answer {
    pub value: bool,
    #[serde(default)]
    pub observation: String,
}

impl Answer {
    pub fn new(value: bool, observation: impl Into<String>) -> Self {
        Self {
            value,
            observation: observation.into(),
        }
    }
}

pub type AnswerSet = BTreeMap<QuestionId, Answer>;

/// Completed (or restored) audit. `questions` is a snapshot taken when the audit started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub id: AuditId,
    pub area_id: AreaId,
    pub area_name: String,
    pub code: String,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub answers: AnswerSet,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub percentage: f64,
}

impl Audit {
    pub fn answer_for(&self, id: QuestionId) -> Option<&Answer> {
        self.answers.get(&id)
    }

    /// Resolved answer value; unanswered questions count as non-compliant.
    pub fn is_compliant(&self, id: QuestionId) -> bool {
        self.answers.get(&id).map(|answer| answer.value).unwrap_or(false)
    }

    pub fn observation_for(&self, id: QuestionId) -> &str {
        self.answers
            .get(&id)
            .map(|answer| answer.observation.as_str())
            .unwrap_or("")
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("severity {0} is outside the allowed range 1-10")]
    SeverityOutOfRange(i64),
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}
