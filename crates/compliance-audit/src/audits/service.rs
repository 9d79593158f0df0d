use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{Area, AreaId, Audit, AuditId, Question, QuestionId};
use super::import::parse_question_lines;
use super::narrative::NarrativeVariant;
use super::registry::{CodeSummary, NewQuestion, QuestionUpdate, Registry, RegistryError};
use super::report::{render_document, AuditReport, Document, ExportKind, Workbook};
use super::repository::{AuditRepository, RepositoryError};
use super::session::{AuditSession, SessionError, SessionStep, SessionView};
use crate::config::ReportConfig;

/// Where an audit stands after an answer, or when looked up by id.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnswerOutcome {
    InProgress(SessionView),
    Completed(Audit),
}

/// Service composing the registry rules, open sessions, and report builders over
/// an injected repository.
pub struct AuditService<R> {
    repository: Arc<R>,
    sessions: Mutex<HashMap<AuditId, AuditSession>>,
    writer: Mutex<()>,
    layout: ReportConfig,
}

impl<R> AuditService<R>
where
    R: AuditRepository + 'static,
{
    pub fn new(repository: Arc<R>, layout: ReportConfig) -> Self {
        Self {
            repository,
            sessions: Mutex::new(HashMap::new()),
            writer: Mutex::new(()),
            layout,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn list_areas(&self) -> Result<Vec<Area>, ServiceError> {
        Ok(self.repository.list_areas()?)
    }

    pub fn add_area(&self, name: &str) -> Result<Area, ServiceError> {
        let _writer = self.write_lock()?;
        let mut registry = self.registry()?;
        let area = registry.add_area(name)?;
        self.repository.insert_area(area.clone())?;
        info!(area_id = %area.id, name = %area.name, "area registered");
        Ok(area)
    }

    /// Registered questions, optionally restricted to one code.
    pub fn list_questions(&self, code: Option<&str>) -> Result<Vec<Question>, ServiceError> {
        let questions = self.repository.list_questions()?;
        Ok(match code {
            Some(code) => questions
                .into_iter()
                .filter(|question| question.code == code)
                .collect(),
            None => questions,
        })
    }

    pub fn add_question(&self, input: NewQuestion) -> Result<Question, ServiceError> {
        self.mutate_registry(|registry| registry.add_question(input))
    }

    pub fn update_question(
        &self,
        id: QuestionId,
        update: QuestionUpdate,
    ) -> Result<Question, ServiceError> {
        self.mutate_registry(|registry| registry.update_question(id, update))
    }

    pub fn delete_question(&self, id: QuestionId) -> Result<Question, ServiceError> {
        self.mutate_registry(|registry| registry.delete_question(id))
    }

    /// Bulk import of `text|severity` lines under `code` (or the default code).
    pub fn import_questions(
        &self,
        source: &str,
        code: Option<&str>,
    ) -> Result<Vec<Question>, ServiceError> {
        let parsed = parse_question_lines(source.as_bytes())?;
        let added = self.mutate_registry(|registry| {
            Ok::<_, RegistryError>(registry.import_questions(parsed, code))
        })?;
        info!(imported = added.len(), "questions imported");
        Ok(added)
    }

    pub fn code_summaries(&self) -> Result<Vec<CodeSummary>, ServiceError> {
        Ok(self.registry()?.code_summaries())
    }

    /// Open a session over the questions currently registered under `code`.
    pub fn start_audit(
        &self,
        area_id: AreaId,
        code: &str,
        date: DateTime<Utc>,
    ) -> Result<SessionView, ServiceError> {
        let _writer = self.write_lock()?;
        let registry = self.registry()?;
        let area = registry.area(area_id)?.clone();
        let code = code.trim();
        let questions = registry.questions_for_code(code);

        let mut sessions = self.sessions()?;
        let id = self.next_audit_id(&sessions)?;
        let session = AuditSession::start(id, &area, code, questions, date)?;
        let view = session.view();
        sessions.insert(id, session);

        info!(
            audit_id = %id,
            area = %area.name,
            code = %code,
            questions = view.progress.total,
            "audit started"
        );
        Ok(view)
    }

    /// Answer the current question of an open audit. The final answer scores and
    /// commits the audit; if the commit fails the session stays open.
    pub fn answer(
        &self,
        audit_id: AuditId,
        value: bool,
        observation: &str,
    ) -> Result<AnswerOutcome, ServiceError> {
        let _writer = self.write_lock()?;
        let mut sessions = self.sessions()?;

        let Some(session) = sessions.remove(&audit_id) else {
            return Err(self.missing_session(audit_id)?);
        };
        let previous = session.clone();

        match session.answer(value, observation) {
            SessionStep::InProgress(next) => {
                debug!(audit_id = %audit_id, answered = next.progress().answered, "answer recorded");
                let view = next.view();
                sessions.insert(audit_id, next);
                Ok(AnswerOutcome::InProgress(view))
            }
            SessionStep::Completed(audit) => {
                if let Err(error) = self.repository.commit_audit(audit.clone()) {
                    warn!(audit_id = %audit_id, error = %error, "audit commit failed");
                    sessions.insert(audit_id, previous);
                    return Err(error.into());
                }
                info!(
                    audit_id = %audit_id,
                    percentage = audit.percentage,
                    "audit completed"
                );
                Ok(AnswerOutcome::Completed(audit))
            }
        }
    }

    /// Drop an open session without committing it. Committed audits are kept.
    pub fn cancel_audit(&self, audit_id: AuditId) -> Result<SessionView, ServiceError> {
        let _writer = self.write_lock()?;
        let mut sessions = self.sessions()?;

        let Some(session) = sessions.remove(&audit_id) else {
            return Err(self.missing_session(audit_id)?);
        };
        info!(
            audit_id = %audit_id,
            answered = session.progress().answered,
            "audit cancelled"
        );
        Ok(session.view())
    }

    /// Committed audit or open session with this id.
    pub fn audit_state(&self, audit_id: AuditId) -> Result<AnswerOutcome, ServiceError> {
        if let Some(audit) = self.repository.fetch_audit(audit_id)? {
            return Ok(AnswerOutcome::Completed(audit));
        }
        self.sessions()?
            .get(&audit_id)
            .map(|session| AnswerOutcome::InProgress(session.view()))
            .ok_or(ServiceError::AuditNotFound(audit_id))
    }

    /// Committed audits, optionally for one area, newest first.
    pub fn list_audits(&self, area_id: Option<AreaId>) -> Result<Vec<Audit>, ServiceError> {
        let mut audits: Vec<Audit> = self
            .repository
            .list_audits()?
            .into_iter()
            .filter(|audit| area_id.map_or(true, |area_id| audit.area_id == area_id))
            .collect();
        audits.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(audits)
    }

    pub fn completed_audit(&self, audit_id: AuditId) -> Result<Audit, ServiceError> {
        match self.repository.fetch_audit(audit_id)? {
            Some(audit) => Ok(audit),
            None if self.sessions()?.contains_key(&audit_id) => {
                Err(ServiceError::AuditInProgress(audit_id))
            }
            None => Err(ServiceError::AuditNotFound(audit_id)),
        }
    }

    pub fn report(
        &self,
        audit_id: AuditId,
        variant: NarrativeVariant,
    ) -> Result<AuditReport, ServiceError> {
        let audit = self.completed_audit(audit_id)?;
        Ok(AuditReport::build(&audit, variant))
    }

    pub fn workbook(&self, audit_id: AuditId, kind: ExportKind) -> Result<Workbook, ServiceError> {
        let audit = self.completed_audit(audit_id)?;
        Ok(Workbook::build(&audit, kind))
    }

    pub fn document(
        &self,
        audit_id: AuditId,
        variant: NarrativeVariant,
        generated_on: DateTime<Utc>,
    ) -> Result<Document, ServiceError> {
        let report = self.report(audit_id, variant)?;
        Ok(render_document(&report, &self.layout, generated_on))
    }

    fn registry(&self) -> Result<Registry, ServiceError> {
        Ok(Registry::new(
            self.repository.list_areas()?,
            self.repository.list_questions()?,
        ))
    }

    fn mutate_registry<T, E>(
        &self,
        change: impl FnOnce(&mut Registry) -> Result<T, E>,
    ) -> Result<T, ServiceError>
    where
        ServiceError: From<E>,
    {
        let _writer = self.write_lock()?;
        let mut registry = self.registry()?;
        let outcome = change(&mut registry)?;
        let (_, questions) = registry.into_parts();
        self.repository.replace_questions(questions)?;
        Ok(outcome)
    }

    fn next_audit_id(
        &self,
        sessions: &HashMap<AuditId, AuditSession>,
    ) -> Result<AuditId, ServiceError> {
        let committed = self
            .repository
            .list_audits()?
            .iter()
            .map(|audit| audit.id.0)
            .max()
            .unwrap_or(0);
        let open = sessions.keys().map(|id| id.0).max().unwrap_or(0);
        Ok(AuditId(committed.max(open) + 1))
    }

    fn missing_session(&self, audit_id: AuditId) -> Result<ServiceError, ServiceError> {
        Ok(match self.repository.fetch_audit(audit_id)? {
            Some(_) => ServiceError::AuditCompleted(audit_id),
            None => ServiceError::AuditNotFound(audit_id),
        })
    }

    fn write_lock(&self) -> Result<MutexGuard<'_, ()>, ServiceError> {
        self.writer.lock().map_err(|_| poisoned("writer"))
    }

    fn sessions(&self) -> Result<MutexGuard<'_, HashMap<AuditId, AuditSession>>, ServiceError> {
        self.sessions.lock().map_err(|_| poisoned("session"))
    }
}

fn poisoned(name: &str) -> ServiceError {
    ServiceError::Repository(RepositoryError::Unavailable(format!(
        "{name} mutex poisoned"
    )))
}

/// Error raised by the audit service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("failed to read question import: {0}")]
    Import(#[from] std::io::Error),
    #[error("audit {0} not found")]
    AuditNotFound(AuditId),
    #[error("audit {0} is still in progress")]
    AuditInProgress(AuditId),
    #[error("audit {0} is already completed")]
    AuditCompleted(AuditId),
}
