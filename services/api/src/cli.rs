use crate::demo::{run_demo, DemoArgs};
use crate::reporting::{run_export, run_report, ExportArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use compliance_audit::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Compliance Audit",
    about = "Run compliance audits, score them by severity, and export graded reports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the report bundle or paginated document for a stored audit
    Report(ReportArgs),
    /// Write spreadsheet (CSV) and document exports for a stored audit
    Export(ExportArgs),
    /// Run an end-to-end audit against a seeded in-memory store
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Export(args) => run_export(args),
        Command::Demo(args) => run_demo(args),
    }
}
