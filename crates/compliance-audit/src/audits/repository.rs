use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::domain::{Area, Audit, AuditId, Question};

/// Storage abstraction so the service module can be exercised in isolation.
pub trait AuditRepository: Send + Sync {
    fn list_areas(&self) -> Result<Vec<Area>, RepositoryError>;
    fn insert_area(&self, area: Area) -> Result<(), RepositoryError>;
    fn list_questions(&self) -> Result<Vec<Question>, RepositoryError>;
    /// Replace the full question registry in one write.
    fn replace_questions(&self, questions: Vec<Question>) -> Result<(), RepositoryError>;
    fn list_audits(&self) -> Result<Vec<Audit>, RepositoryError>;
    fn fetch_audit(&self, id: AuditId) -> Result<Option<Audit>, RepositoryError>;
    /// Insert the audit, or replace the stored audit with the same id.
    fn commit_audit(&self, audit: Audit) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("area {0} already exists")]
    Conflict(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Persisted layout: three independent ordered collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub audits: Vec<Audit>,
}

impl StoreSnapshot {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    store: Mutex<StoreSnapshot>,
}

impl InMemoryAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            store: Mutex::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> Result<StoreSnapshot, RepositoryError> {
        self.read(|store| store.clone())
    }

    fn read<T>(&self, f: impl FnOnce(&StoreSnapshot) -> T) -> Result<T, RepositoryError> {
        let store = self
            .store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(f(&store))
    }

    fn write<T>(&self, f: impl FnOnce(&mut StoreSnapshot) -> T) -> Result<T, RepositoryError> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(f(&mut store))
    }
}

impl AuditRepository for InMemoryAuditRepository {
    fn list_areas(&self) -> Result<Vec<Area>, RepositoryError> {
        self.read(|store| store.areas.clone())
    }

    fn insert_area(&self, area: Area) -> Result<(), RepositoryError> {
        self.write(|store| {
            if store.areas.iter().any(|existing| existing.id == area.id) {
                return Err(RepositoryError::Conflict(area.id.to_string()));
            }
            store.areas.push(area);
            Ok(())
        })?
    }

    fn list_questions(&self) -> Result<Vec<Question>, RepositoryError> {
        self.read(|store| store.questions.clone())
    }

    fn replace_questions(&self, questions: Vec<Question>) -> Result<(), RepositoryError> {
        self.write(|store| store.questions = questions)
    }

    fn list_audits(&self) -> Result<Vec<Audit>, RepositoryError> {
        self.read(|store| store.audits.clone())
    }

    fn fetch_audit(&self, id: AuditId) -> Result<Option<Audit>, RepositoryError> {
        self.read(|store| store.audits.iter().find(|audit| audit.id == id).cloned())
    }

    fn commit_audit(&self, audit: Audit) -> Result<(), RepositoryError> {
        self.write(|store| {
            match store.audits.iter_mut().find(|existing| existing.id == audit.id) {
                Some(existing) => *existing = audit,
                None => store.audits.push(audit),
            }
        })
    }
}
