//! Compliance audits: question registry, answer sessions, severity-weighted scoring,
//! grading, and report synthesis.
//!
//! Scoring, failure classification, grading, and narrative generation are pure
//! functions over an [`Audit`]. The [`AuditService`] composes them with the registry
//! rules and an injected [`AuditRepository`], and [`audit_router`] exposes the service
//! over HTTP.

pub mod domain;
pub mod failures;
pub mod grading;
pub mod import;
pub mod narrative;
pub mod registry;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use domain::{
    Answer, AnswerSet, Area, AreaId, Audit, AuditId, DomainError, Question, QuestionId, Severity,
    SeverityTier, DEFAULT_CODE,
};
pub use failures::{classify_failures, FailedQuestion, FailureAnalysis};
pub use grading::{grade, Grade, RiskLevel, Tier};
pub use narrative::{generate_detailed_narrative, generate_narrative, NarrativeVariant};
pub use registry::{CodeSummary, NewQuestion, QuestionUpdate, Registry, RegistryError};
pub use report::{render_document, AuditReport, Document, ExportError, ExportKind, Workbook};
pub use repository::{AuditRepository, InMemoryAuditRepository, RepositoryError, StoreSnapshot};
pub use router::audit_router;
pub use scoring::{compute_compliance, count_passed};
pub use service::{AnswerOutcome, AuditService, ServiceError};
pub use session::{AuditSession, SessionError, SessionStep, SessionView};
