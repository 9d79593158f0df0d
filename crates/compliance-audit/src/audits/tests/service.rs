use std::sync::Arc;

use super::common::*;
use crate::audits::domain::{AreaId, AuditId, QuestionId, Severity, DEFAULT_CODE};
use crate::audits::grading::{RiskLevel, Tier};
use crate::audits::narrative::NarrativeVariant;
use crate::audits::registry::{NewQuestion, QuestionUpdate, RegistryError};
use crate::audits::report::ExportKind;
use crate::audits::repository::{AuditRepository, RepositoryError};
use crate::audits::service::{AnswerOutcome, AuditService, ServiceError};
use crate::audits::session::SessionError;
use crate::config::ReportConfig;

#[test]
fn reference_audit_scores_and_reports() {
    let (service, repository) = build_service();

    let audit = complete_audit(&service, 1, "ISO", 3, &[true, false, true, true, false]);
    assert_eq!(format!("{:.1}", audit.percentage), "66.7");

    let stored = repository
        .fetch_audit(audit.id)
        .expect("fetch succeeds")
        .expect("audit committed");
    assert_eq!(stored, audit);

    let report = service
        .report(audit.id, NarrativeVariant::Executive)
        .expect("report builds");
    assert_eq!(report.tier, Tier::Good);
    assert_eq!(report.risk, RiskLevel::Moderate);
    assert_eq!(report.severity_counts.high, 1);
    assert!(report.narrative.starts_with("the compliance audit performed on the finance area"));
}

#[test]
fn start_audit_rejects_unknown_area_and_empty_code() {
    let (service, _) = build_service();

    match service.start_audit(AreaId(42), "ISO", timestamp(1)) {
        Err(ServiceError::Registry(RegistryError::AreaNotFound(AreaId(42)))) => {}
        other => panic!("expected missing area, got {other:?}"),
    }

    match service.start_audit(AreaId(1), "NIST", timestamp(1)) {
        Err(ServiceError::Session(SessionError::NoQuestionsForCode { code })) => {
            assert_eq!(code, "NIST");
        }
        other => panic!("expected empty question set, got {other:?}"),
    }
}

#[test]
fn audits_snapshot_questions_at_start() {
    let (service, _) = build_service();
    let view = service
        .start_audit(AreaId(1), "SOX", timestamp(2))
        .expect("audit starts");

    service
        .add_question(NewQuestion {
            text: "Quarterly access review?".to_string(),
            severity: Severity::new(4).expect("valid severity"),
            code: "SOX".to_string(),
        })
        .expect("question added");
    service
        .update_question(
            QuestionId(6),
            QuestionUpdate {
                severity: Some(Severity::new(1).expect("valid severity")),
                ..QuestionUpdate::default()
            },
        )
        .expect("question updated");

    match service.answer(view.audit_id, false, "not evidenced").expect("answered") {
        AnswerOutcome::Completed(audit) => {
            assert_eq!(audit.questions.len(), 1);
            assert_eq!(audit.questions[0].severity.value(), 9);
            assert_eq!(audit.percentage, 0.0);
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[test]
fn audit_ids_account_for_open_sessions() {
    let (service, _) = build_service();
    let first = service
        .start_audit(AreaId(1), "ISO", timestamp(1))
        .expect("first starts");
    let second = service
        .start_audit(AreaId(2), "ISO", timestamp(1))
        .expect("second starts");
    assert_eq!(first.audit_id, AuditId(1));
    assert_eq!(second.audit_id, AuditId(2));

    let completed = complete_audit(&service, 1, "SOX", 2, &[true]);
    assert_eq!(completed.id, AuditId(3));
}

#[test]
fn cancelled_sessions_release_their_ids() {
    let (service, repository) = build_service();
    let kept = service
        .start_audit(AreaId(1), "ISO", timestamp(1))
        .expect("audit starts");
    let abandoned: Vec<AuditId> = (0..3)
        .map(|_| {
            service
                .start_audit(AreaId(2), "ISO", timestamp(1))
                .expect("audit starts")
                .audit_id
        })
        .collect();
    assert_eq!(abandoned, vec![AuditId(2), AuditId(3), AuditId(4)]);

    for audit_id in &abandoned {
        let view = service.cancel_audit(*audit_id).expect("session cancelled");
        assert_eq!(view.audit_id, *audit_id);
    }
    match service.audit_state(AuditId(3)) {
        Err(ServiceError::AuditNotFound(AuditId(3))) => {}
        other => panic!("expected cancelled audit to be gone, got {other:?}"),
    }
    match service.answer(AuditId(3), true, "") {
        Err(ServiceError::AuditNotFound(AuditId(3))) => {}
        other => panic!("expected cancelled audit to be gone, got {other:?}"),
    }

    let completed = complete_audit(&service, 1, "SOX", 2, &[true]);
    assert_eq!(completed.id, AuditId(2));
    assert_eq!(repository.list_audits().expect("list").len(), 1);
    match service.audit_state(kept.audit_id).expect("state") {
        AnswerOutcome::InProgress(state) => assert_eq!(state.audit_id, AuditId(1)),
        other => panic!("expected open session, got {other:?}"),
    }
}

#[test]
fn committed_audits_cannot_be_cancelled() {
    let (service, repository) = build_service();
    let audit = complete_audit(&service, 1, "SOX", 1, &[false]);

    match service.cancel_audit(audit.id) {
        Err(ServiceError::AuditCompleted(id)) => assert_eq!(id, audit.id),
        other => panic!("expected completed error, got {other:?}"),
    }
    match service.cancel_audit(AuditId(40)) {
        Err(ServiceError::AuditNotFound(AuditId(40))) => {}
        other => panic!("expected not found, got {other:?}"),
    }
    assert!(repository
        .fetch_audit(audit.id)
        .expect("fetch succeeds")
        .is_some());
}

#[test]
fn in_progress_audits_are_not_reportable() {
    let (service, _) = build_service();
    let view = service
        .start_audit(AreaId(1), "ISO", timestamp(1))
        .expect("audit starts");
    service.answer(view.audit_id, true, "").expect("answered");

    match service.report(view.audit_id, NarrativeVariant::Detailed) {
        Err(ServiceError::AuditInProgress(id)) => assert_eq!(id, view.audit_id),
        other => panic!("expected in-progress error, got {other:?}"),
    }
    match service.audit_state(view.audit_id).expect("state") {
        AnswerOutcome::InProgress(state) => assert_eq!(state.progress.answered, 1),
        other => panic!("expected open session, got {other:?}"),
    }
    match service.workbook(AuditId(99), ExportKind::Answers) {
        Err(ServiceError::AuditNotFound(AuditId(99))) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn completed_audits_reject_further_answers() {
    let (service, _) = build_service();
    let audit = complete_audit(&service, 1, "SOX", 1, &[true]);

    match service.answer(audit.id, false, "") {
        Err(ServiceError::AuditCompleted(id)) => assert_eq!(id, audit.id),
        other => panic!("expected completed error, got {other:?}"),
    }
}

#[test]
fn failed_commit_keeps_session_open() {
    let service = AuditService::new(Arc::new(ReadOnlyRepository::seeded()), ReportConfig::default());
    let view = service
        .start_audit(AreaId(1), "SOX", timestamp(1))
        .expect("audit starts");

    match service.answer(view.audit_id, true, "") {
        Err(ServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository failure, got {other:?}"),
    }
    match service.audit_state(view.audit_id).expect("state") {
        AnswerOutcome::InProgress(state) => assert_eq!(state.progress.answered, 0),
        other => panic!("expected session to survive, got {other:?}"),
    }
}

#[test]
fn list_audits_filters_by_area_newest_first() {
    let (service, _) = build_service();
    let older = complete_audit(&service, 1, "SOX", 1, &[true]);
    let other_area = complete_audit(&service, 2, "SOX", 5, &[false]);
    let newer = complete_audit(&service, 1, "SOX", 9, &[false]);

    let finance: Vec<AuditId> = service
        .list_audits(Some(AreaId(1)))
        .expect("list")
        .into_iter()
        .map(|audit| audit.id)
        .collect();
    assert_eq!(finance, vec![newer.id, older.id]);

    let all = service.list_audits(None).expect("list");
    assert_eq!(all.len(), 3);
    assert_eq!(all[1].id, other_area.id);
}

#[test]
fn import_appends_under_default_code_and_updates_summaries() {
    let (service, _) = build_service();
    let added = service
        .import_questions("Patch cadence documented?|7\n\nIncident drills run?\n", None)
        .expect("import succeeds");

    let ids: Vec<u32> = added.iter().map(|question| question.id.0).collect();
    assert_eq!(ids, vec![7, 8]);
    assert!(added.iter().all(|question| question.code == DEFAULT_CODE));

    let codes: Vec<(String, usize)> = service
        .code_summaries()
        .expect("codes")
        .into_iter()
        .map(|summary| (summary.code, summary.count))
        .collect();
    assert_eq!(codes, vec![("ISO".to_string(), 5), ("SOX".to_string(), 1)]);
    assert_eq!(
        service.list_questions(Some(DEFAULT_CODE)).expect("list").len(),
        2
    );
}

#[test]
fn delete_unknown_question_is_not_found() {
    let (service, _) = build_service();
    match service.delete_question(QuestionId(404)) {
        Err(ServiceError::Registry(RegistryError::QuestionNotFound(QuestionId(404)))) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn repository_failures_propagate() {
    let service = AuditService::new(Arc::new(UnavailableRepository), ReportConfig::default());

    match service.add_area("Legal") {
        Err(ServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository failure, got {other:?}"),
    }
    assert!(service.list_audits(None).is_err());
}

#[test]
fn document_uses_configured_layout() {
    let repository = Arc::new(crate::audits::InMemoryAuditRepository::from_snapshot(
        snapshot(),
    ));
    let service = AuditService::new(
        repository,
        ReportConfig {
            line_width: 50,
            lines_per_page: 12,
        },
    );
    let audit = complete_audit(&service, 2, "ISO", 4, &[false, false, true, true, true]);

    let document = service
        .document(audit.id, NarrativeVariant::Detailed, timestamp(5))
        .expect("document renders");
    assert!(document.pages.len() > 1);
    assert!(document.pages.iter().all(|page| page.len() <= 12));
    assert_eq!(document.file_name, "detailed_summary_ISO.txt");
}
