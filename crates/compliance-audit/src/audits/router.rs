use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{AreaId, AuditId, QuestionId};
use super::narrative::NarrativeVariant;
use super::registry::{NewQuestion, QuestionUpdate, RegistryError};
use super::report::ExportKind;
use super::repository::{AuditRepository, RepositoryError};
use super::service::{AuditService, ServiceError};

/// Router builder exposing the registry, audit flow, and report endpoints.
pub fn audit_router<R>(service: Arc<AuditService<R>>) -> Router
where
    R: AuditRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/areas",
            get(list_areas_handler::<R>).post(create_area_handler::<R>),
        )
        .route(
            "/api/v1/questions",
            get(list_questions_handler::<R>).post(create_question_handler::<R>),
        )
        .route(
            "/api/v1/questions/import",
            post(import_questions_handler::<R>),
        )
        .route(
            "/api/v1/questions/:question_id",
            put(update_question_handler::<R>).delete(delete_question_handler::<R>),
        )
        .route("/api/v1/codes", get(codes_handler::<R>))
        .route(
            "/api/v1/audits",
            get(list_audits_handler::<R>).post(start_audit_handler::<R>),
        )
        .route(
            "/api/v1/audits/:audit_id",
            get(audit_handler::<R>).delete(cancel_audit_handler::<R>),
        )
        .route(
            "/api/v1/audits/:audit_id/answers",
            post(answer_handler::<R>),
        )
        .route("/api/v1/audits/:audit_id/report", get(report_handler::<R>))
        .route("/api/v1/audits/:audit_id/export", get(export_handler::<R>))
        .route(
            "/api/v1/audits/:audit_id/document",
            get(document_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewArea {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CodeFilter {
    code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AreaFilter {
    area_id: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartAudit {
    area_id: u32,
    code: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct AnswerPayload {
    value: bool,
    #[serde(default)]
    observation: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportParams {
    #[serde(default)]
    variant: NarrativeVariant,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExportParams {
    #[serde(default)]
    kind: ExportKind,
}

pub(crate) async fn list_areas_handler<R>(State(service): State<Arc<AuditService<R>>>) -> Response
where
    R: AuditRepository + 'static,
{
    respond(StatusCode::OK, service.list_areas())
}

pub(crate) async fn create_area_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    axum::Json(payload): axum::Json<NewArea>,
) -> Response
where
    R: AuditRepository + 'static,
{
    respond(StatusCode::CREATED, service.add_area(&payload.name))
}

pub(crate) async fn list_questions_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Query(filter): Query<CodeFilter>,
) -> Response
where
    R: AuditRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.list_questions(filter.code.as_deref()),
    )
}

pub(crate) async fn create_question_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    axum::Json(payload): axum::Json<NewQuestion>,
) -> Response
where
    R: AuditRepository + 'static,
{
    respond(StatusCode::CREATED, service.add_question(payload))
}

pub(crate) async fn update_question_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Path(question_id): Path<u32>,
    axum::Json(payload): axum::Json<QuestionUpdate>,
) -> Response
where
    R: AuditRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.update_question(QuestionId(question_id), payload),
    )
}

pub(crate) async fn delete_question_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Path(question_id): Path<u32>,
) -> Response
where
    R: AuditRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.delete_question(QuestionId(question_id)),
    )
}

pub(crate) async fn import_questions_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Query(filter): Query<CodeFilter>,
    body: String,
) -> Response
where
    R: AuditRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.import_questions(&body, filter.code.as_deref()),
    )
}

pub(crate) async fn codes_handler<R>(State(service): State<Arc<AuditService<R>>>) -> Response
where
    R: AuditRepository + 'static,
{
    respond(StatusCode::OK, service.code_summaries())
}

pub(crate) async fn start_audit_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    axum::Json(payload): axum::Json<StartAudit>,
) -> Response
where
    R: AuditRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.start_audit(AreaId(payload.area_id), &payload.code, Utc::now()),
    )
}

pub(crate) async fn list_audits_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Query(filter): Query<AreaFilter>,
) -> Response
where
    R: AuditRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.list_audits(filter.area_id.map(AreaId)),
    )
}

pub(crate) async fn audit_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Path(audit_id): Path<u32>,
) -> Response
where
    R: AuditRepository + 'static,
{
    respond(StatusCode::OK, service.audit_state(AuditId(audit_id)))
}

pub(crate) async fn cancel_audit_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Path(audit_id): Path<u32>,
) -> Response
where
    R: AuditRepository + 'static,
{
    respond(StatusCode::OK, service.cancel_audit(AuditId(audit_id)))
}

pub(crate) async fn answer_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Path(audit_id): Path<u32>,
    axum::Json(payload): axum::Json<AnswerPayload>,
) -> Response
where
    R: AuditRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.answer(AuditId(audit_id), payload.value, &payload.observation),
    )
}

pub(crate) async fn report_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Path(audit_id): Path<u32>,
    Query(params): Query<ReportParams>,
) -> Response
where
    R: AuditRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.report(AuditId(audit_id), params.variant),
    )
}

pub(crate) async fn export_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Path(audit_id): Path<u32>,
    Query(params): Query<ExportParams>,
) -> Response
where
    R: AuditRepository + 'static,
{
    let workbook = match service.workbook(AuditId(audit_id), params.kind) {
        Ok(workbook) => workbook,
        Err(error) => return error_response(error),
    };

    match workbook.to_csv() {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, attachment(&workbook.file_name)),
            ],
            body,
        )
            .into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn document_handler<R>(
    State(service): State<Arc<AuditService<R>>>,
    Path(audit_id): Path<u32>,
    Query(params): Query<ReportParams>,
) -> Response
where
    R: AuditRepository + 'static,
{
    match service.document(AuditId(audit_id), params.variant, Utc::now()) {
        Ok(document) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, attachment(&document.file_name)),
            ],
            document.render(),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{file_name}\"")
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(value) => (status, axum::Json(value)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_status(error: &ServiceError) -> StatusCode {
    match error {
        ServiceError::Registry(RegistryError::Invalid(_))
        | ServiceError::Session(_)
        | ServiceError::Import(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Registry(RegistryError::QuestionNotFound(_))
        | ServiceError::Registry(RegistryError::AreaNotFound(_))
        | ServiceError::AuditNotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::AuditInProgress(_)
        | ServiceError::AuditCompleted(_)
        | ServiceError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
        ServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: ServiceError) -> Response {
    let status = error_status(&error);
    if status.is_server_error() {
        tracing::error!(error = %error, "audit request failed");
    }
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
