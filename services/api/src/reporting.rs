use crate::infra::build_service_from_snapshot;
use chrono::Utc;
use clap::{Args, ValueEnum};
use compliance_audit::audits::{AuditId, ExportKind, NarrativeVariant};
use compliance_audit::config::AppConfig;
use compliance_audit::error::AppError;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum VariantArg {
    #[default]
    Executive,
    Detailed,
}

impl From<VariantArg> for NarrativeVariant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Executive => NarrativeVariant::Executive,
            VariantArg::Detailed => NarrativeVariant::Detailed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum KindArg {
    #[default]
    Answers,
    Detailed,
    Complete,
}

impl From<KindArg> for ExportKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Answers => ExportKind::Answers,
            KindArg::Detailed => ExportKind::Detailed,
            KindArg::Complete => ExportKind::Complete,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReportFormat {
    #[default]
    Json,
    Text,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Store snapshot to read (defaults to APP_SNAPSHOT_PATH)
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
    /// Id of a completed audit
    #[arg(long)]
    pub(crate) audit_id: u32,
    /// Narrative variant
    #[arg(long, value_enum, default_value_t = VariantArg::Executive)]
    pub(crate) variant: VariantArg,
    /// JSON report bundle or paginated text document
    #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
    pub(crate) format: ReportFormat,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Store snapshot to read (defaults to APP_SNAPSHOT_PATH)
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
    /// Id of a completed audit
    #[arg(long)]
    pub(crate) audit_id: u32,
    /// Spreadsheet flavor
    #[arg(long, value_enum, default_value_t = KindArg::Answers)]
    pub(crate) kind: KindArg,
    /// Directory the CSV sheets are written to
    #[arg(long, default_value = ".")]
    pub(crate) out_dir: PathBuf,
    /// Also write the executive summary document
    #[arg(long)]
    pub(crate) with_document: bool,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service_from_snapshot(&config, args.snapshot)?;
    let audit_id = AuditId(args.audit_id);

    match args.format {
        ReportFormat::Json => {
            let report = service.report(audit_id, args.variant.into())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ReportFormat::Text => {
            let document = service.document(audit_id, args.variant.into(), Utc::now())?;
            print!("{}", document.render());
        }
    }

    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service_from_snapshot(&config, args.snapshot)?;
    let audit_id = AuditId(args.audit_id);

    std::fs::create_dir_all(&args.out_dir)?;

    let workbook = service.workbook(audit_id, args.kind.into())?;
    for sheet in &workbook.sheets {
        let path = args.out_dir.join(&sheet.file_name);
        std::fs::write(&path, sheet.to_csv()?)?;
        info!(sheet = %sheet.name, path = %path.display(), "sheet exported");
        println!("{}", path.display());
    }

    if args.with_document {
        let document = service.document(audit_id, NarrativeVariant::Executive, Utc::now())?;
        let path = args.out_dir.join(&document.file_name);
        std::fs::write(&path, document.render())?;
        println!("{}", path.display());
    }

    Ok(())
}
