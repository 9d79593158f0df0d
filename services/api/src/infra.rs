use chrono::{DateTime, NaiveDate, Utc};
use compliance_audit::audits::{AuditService, InMemoryAuditRepository, StoreSnapshot};
use compliance_audit::config::AppConfig;
use compliance_audit::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type SharedService = Arc<AuditService<InMemoryAuditRepository>>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Service over an in-memory store, seeded from `snapshot` (or the configured path)
/// when one is given.
pub(crate) fn build_service(
    config: &AppConfig,
    snapshot: Option<&Path>,
) -> Result<SharedService, AppError> {
    let path = snapshot.or(config.storage.snapshot_path.as_deref());
    let repository = match path {
        Some(path) => InMemoryAuditRepository::from_snapshot(load_snapshot(path)?),
        None => InMemoryAuditRepository::new(),
    };

    Ok(Arc::new(AuditService::new(
        Arc::new(repository),
        config.reports,
    )))
}

/// Like [`build_service`], but a snapshot is mandatory.
pub(crate) fn build_service_from_snapshot(
    config: &AppConfig,
    snapshot: Option<PathBuf>,
) -> Result<SharedService, AppError> {
    let path = snapshot
        .or_else(|| config.storage.snapshot_path.clone())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "no snapshot given; pass --snapshot or set APP_SNAPSHOT_PATH",
            )
        })?;
    build_service(config, Some(&path))
}

pub(crate) fn load_snapshot(path: &Path) -> Result<StoreSnapshot, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let snapshot = StoreSnapshot::from_json(&raw)?;
    info!(
        path = %path.display(),
        areas = snapshot.areas.len(),
        questions = snapshot.questions.len(),
        audits = snapshot.audits.len(),
        "store snapshot loaded"
    );
    Ok(snapshot)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
