use crate::infra::start_of_day;
use crate::reporting::VariantArg;
use chrono::{NaiveDate, Utc};
use clap::Args;
use compliance_audit::audits::{
    AnswerOutcome, AuditReport, AuditService, ExportKind, InMemoryAuditRepository,
    NarrativeVariant, ServiceError,
};
use compliance_audit::config::AppConfig;
use compliance_audit::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_CODE: &str = "ISO27001";

const ISO_CHECKLIST: &str = "\
Information security policy approved by management?|9
Access rights reviewed every quarter?|8
Backups restored in a test at least yearly?|7
Antivirus signatures updated automatically?|5
Change requests documented before deployment?|6
Visitor log kept at the data center entrance?|2
Clean desk policy communicated to staff?|3
Incident response contacts published?|4
";

const SOX_CHECKLIST: &str = "\
Segregation of duties on payment approval?|10
Journal entries above threshold reviewed?|8
";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Audit date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Answers as y/n characters, one per question; repeats when shorter.
    #[arg(long, default_value = "yynyynyn")]
    pub(crate) answers: String,
    /// Narrative variant used for the printed report
    #[arg(long, value_enum, default_value_t = VariantArg::Executive)]
    pub(crate) variant: VariantArg,
    /// Print the paginated document after the summary
    #[arg(long)]
    pub(crate) document: bool,
    /// Write the resulting store snapshot to this path
    #[arg(long)]
    pub(crate) save_snapshot: Option<PathBuf>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let repository = Arc::new(InMemoryAuditRepository::new());
    let service = AuditService::new(repository.clone(), config.reports);

    println!("Compliance audit demo");
    let area = service.add_area("Information Technology")?;
    service.add_area("Finance")?;
    service.import_questions(ISO_CHECKLIST, Some(DEMO_CODE))?;
    service.import_questions(SOX_CHECKLIST, Some("SOX"))?;

    println!("\nRegistered codes");
    for summary in service.code_summaries()? {
        println!("  {:<10} {} question(s)", summary.code, summary.count);
    }

    let date = args
        .date
        .map(start_of_day)
        .unwrap_or_else(Utc::now);
    let pattern = parse_answers(&args.answers);
    let session = service.start_audit(area.id, DEMO_CODE, date)?;
    println!(
        "\nAudit {} started for {} ({} questions)",
        session.audit_id, session.area_name, session.progress.total
    );

    let mut index = 0;
    let audit = loop {
        let value = pattern[index % pattern.len()];
        let observation = if value { "" } else { "evidence not provided" };
        index += 1;
        match service.answer(session.audit_id, value, observation)? {
            AnswerOutcome::InProgress(view) => {
                if let Some(question) = view.current_question {
                    println!("  next: [{}] {}", question.severity, question.text);
                }
            }
            AnswerOutcome::Completed(audit) => break audit,
        }
    };

    let variant = NarrativeVariant::from(args.variant);
    let report = service.report(audit.id, variant)?;
    render_report(&report);

    println!("\nExports");
    for kind in [ExportKind::Answers, ExportKind::Detailed, ExportKind::Complete] {
        let workbook = service.workbook(audit.id, kind)?;
        println!(
            "  {:<9} {} ({} sheet(s))",
            kind.label(),
            workbook.file_name,
            workbook.sheets.len()
        );
    }

    if args.document {
        let document = service.document(audit.id, variant, Utc::now())?;
        println!("\n{}", document.render());
    }

    if let Some(path) = args.save_snapshot {
        let snapshot = repository.snapshot().map_err(ServiceError::from)?;
        std::fs::write(&path, snapshot.to_json()?)?;
        println!("\nSnapshot written to {}", path.display());
    }

    Ok(())
}

fn render_report(report: &AuditReport) {
    println!(
        "\nAudit report: {} / {} ({})",
        report.header.area_name, report.header.code, report.header.date_label
    );
    println!(
        "  Compliance: {} | Tier: {} | Risk: {}",
        report.percentage_label, report.tier_label, report.risk_label
    );
    println!(
        "  Passed {} of {} | Failed high/medium/low: {}/{}/{}",
        report.passed,
        report.total,
        report.severity_counts.high,
        report.severity_counts.medium,
        report.severity_counts.low
    );
    for failure in &report.failed_questions {
        println!(
            "  - [{} {}] {}",
            failure.tier_label, failure.severity, failure.text
        );
    }
    println!("\n{}", report.narrative);
}

fn parse_answers(raw: &str) -> Vec<bool> {
    let parsed: Vec<bool> = raw
        .chars()
        .filter_map(|ch| match ch.to_ascii_lowercase() {
            'y' | 't' | '1' => Some(true),
            'n' | 'f' | '0' => Some(false),
            _ => None,
        })
        .collect();
    if parsed.is_empty() {
        vec![true]
    } else {
        parsed
    }
}
