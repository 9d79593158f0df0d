use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::audits::domain::{Area, AreaId, Audit, AuditId, Question, QuestionId, Severity};
use crate::audits::repository::{
    AuditRepository, InMemoryAuditRepository, RepositoryError, StoreSnapshot,
};
use crate::audits::audit_router;
use crate::audits::service::{AnswerOutcome, AuditService};
use crate::config::ReportConfig;

pub(super) const ISO_SEVERITIES: [u8; 5] = [10, 8, 5, 3, 1];

pub(super) fn timestamp(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, day, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn snapshot() -> StoreSnapshot {
    let areas = vec![
        Area {
            id: AreaId(1),
            name: "Finance".to_string(),
        },
        Area {
            id: AreaId(2),
            name: "IT Operations".to_string(),
        },
    ];

    let mut questions: Vec<Question> = ISO_SEVERITIES
        .iter()
        .enumerate()
        .map(|(idx, severity)| Question {
            id: QuestionId(idx as u32 + 1),
            text: format!("ISO control {}", idx + 1),
            severity: Severity::new(*severity).expect("valid severity"),
            code: "ISO".to_string(),
        })
        .collect();
    questions.push(Question {
        id: QuestionId(6),
        text: "Segregation of duties enforced?".to_string(),
        severity: Severity::new(9).expect("valid severity"),
        code: "SOX".to_string(),
    });

    StoreSnapshot {
        areas,
        questions,
        audits: Vec::new(),
    }
}

pub(super) fn build_service() -> (
    Arc<AuditService<InMemoryAuditRepository>>,
    Arc<InMemoryAuditRepository>,
) {
    let repository = Arc::new(InMemoryAuditRepository::from_snapshot(snapshot()));
    let service = Arc::new(AuditService::new(
        repository.clone(),
        ReportConfig::default(),
    ));
    (service, repository)
}

pub(super) fn router_with_service(
    service: Arc<AuditService<InMemoryAuditRepository>>,
) -> axum::Router {
    audit_router(service)
}

/// Runs a full audit through the service, answering in question order.
pub(super) fn complete_audit(
    service: &AuditService<InMemoryAuditRepository>,
    area_id: u32,
    code: &str,
    day: u32,
    answers: &[bool],
) -> Audit {
    let view = service
        .start_audit(AreaId(area_id), code, timestamp(day))
        .expect("audit starts");

    let mut completed = None;
    for value in answers {
        match service
            .answer(view.audit_id, *value, "")
            .expect("answer accepted")
        {
            AnswerOutcome::InProgress(_) => {}
            AnswerOutcome::Completed(audit) => completed = Some(audit),
        }
    }
    completed.expect("audit completed")
}

pub(super) struct UnavailableRepository;

impl AuditRepository for UnavailableRepository {
    fn list_areas(&self) -> Result<Vec<Area>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_area(&self, _area: Area) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_questions(&self) -> Result<Vec<Question>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn replace_questions(&self, _questions: Vec<Question>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_audits(&self) -> Result<Vec<Audit>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_audit(&self, _id: AuditId) -> Result<Option<Audit>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn commit_audit(&self, _audit: Audit) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Reads from a seeded store but rejects audit commits.
pub(super) struct ReadOnlyRepository {
    inner: InMemoryAuditRepository,
}

impl ReadOnlyRepository {
    pub(super) fn seeded() -> Self {
        Self {
            inner: InMemoryAuditRepository::from_snapshot(snapshot()),
        }
    }
}

impl AuditRepository for ReadOnlyRepository {
    fn list_areas(&self) -> Result<Vec<Area>, RepositoryError> {
        self.inner.list_areas()
    }

    fn insert_area(&self, area: Area) -> Result<(), RepositoryError> {
        self.inner.insert_area(area)
    }

    fn list_questions(&self) -> Result<Vec<Question>, RepositoryError> {
        self.inner.list_questions()
    }

    fn replace_questions(&self, questions: Vec<Question>) -> Result<(), RepositoryError> {
        self.inner.replace_questions(questions)
    }

    fn list_audits(&self) -> Result<Vec<Audit>, RepositoryError> {
        self.inner.list_audits()
    }

    fn fetch_audit(&self, id: AuditId) -> Result<Option<Audit>, RepositoryError> {
        self.inner.fetch_audit(id)
    }

    fn commit_audit(&self, _audit: Audit) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
