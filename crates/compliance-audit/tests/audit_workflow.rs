use std::sync::Arc;

use chrono::{TimeZone, Utc};
use compliance_audit::audits::{
    compute_compliance, grade, AnswerOutcome, AreaId, AuditService, InMemoryAuditRepository,
    NarrativeVariant, NewQuestion, RiskLevel, Severity, StoreSnapshot, Tier,
};
use compliance_audit::config::ReportConfig;

fn severity(value: u8) -> Severity {
    Severity::new(value).expect("valid severity")
}

#[test]
fn registry_to_report_round_trip() {
    let repository = Arc::new(InMemoryAuditRepository::new());
    let service = AuditService::new(repository.clone(), ReportConfig::default());

    let area = service.add_area("Finance").expect("area registered");
    for _ in 0..4 {
        service
            .add_question(NewQuestion {
                text: "Dual approval on payments?".to_string(),
                severity: severity(10),
                code: "ISO".to_string(),
            })
            .expect("question registered");
    }

    let date = Utc
        .with_ymd_and_hms(2025, 7, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    let session = service
        .start_audit(area.id, "ISO", date)
        .expect("audit starts");

    let mut outcome = None;
    for value in [true, true, true, false] {
        outcome = Some(
            service
                .answer(session.audit_id, value, "")
                .expect("answer accepted"),
        );
    }

    let audit = match outcome.expect("answers given") {
        AnswerOutcome::Completed(audit) => audit,
        AnswerOutcome::InProgress(view) => panic!("audit still open: {view:?}"),
    };
    assert_eq!(audit.percentage, 75.0);
    assert_eq!(compute_compliance(&audit.questions, &audit.answers), 75.0);

    let graded = grade(audit.percentage);
    assert_eq!(graded.tier, Tier::Good);
    assert_eq!(graded.risk, RiskLevel::Moderate);

    let report = service
        .report(audit.id, NarrativeVariant::Executive)
        .expect("report builds");
    assert_eq!(report.severity_counts.high, 1);
    assert_eq!(format!("{:.1}", report.impact_percentage), "25.0");
    assert!(report
        .narrative
        .contains("of a total of 4 controls evaluated, 3 (75%) were implemented correctly"));
}

#[test]
fn snapshot_restores_committed_audits() {
    let seed = r#"{
        "areas": [{ "id": 4, "name": "Treasury" }],
        "questions": [
            { "id": 1, "text": "Cash counts reconciled?", "severity": 6, "code": "SOX" },
            { "id": 2, "text": "Bank access reviewed?", "severity": 9, "code": "SOX" }
        ]
    }"#;
    let snapshot = StoreSnapshot::from_json(seed).expect("seed parses");
    let repository = Arc::new(InMemoryAuditRepository::from_snapshot(snapshot));
    let service = AuditService::new(repository.clone(), ReportConfig::default());

    let date = Utc
        .with_ymd_and_hms(2025, 8, 15, 16, 30, 0)
        .single()
        .expect("valid timestamp");
    let session = service
        .start_audit(AreaId(4), "SOX", date)
        .expect("audit starts");
    service
        .answer(session.audit_id, false, "no reconciliation evidence")
        .expect("first answer");
    service
        .answer(session.audit_id, true, "")
        .expect("second answer");

    let exported = repository
        .snapshot()
        .expect("snapshot")
        .to_json()
        .expect("serializes");
    let restored = InMemoryAuditRepository::from_snapshot(
        StoreSnapshot::from_json(&exported).expect("round trip"),
    );
    let restored_service = AuditService::new(Arc::new(restored), ReportConfig::default());

    let audits = restored_service.list_audits(Some(AreaId(4))).expect("list");
    assert_eq!(audits.len(), 1);
    assert_eq!(format!("{:.1}", audits[0].percentage), "60.0");
    assert_eq!(
        audits[0].observation_for(audits[0].questions[0].id),
        "no reconciliation evidence"
    );

    let report = restored_service
        .report(audits[0].id, NarrativeVariant::Detailed)
        .expect("report");
    assert_eq!(report.tier, Tier::Good);
    assert!(report
        .narrative
        .contains("there are clear opportunities to improve"));
}
