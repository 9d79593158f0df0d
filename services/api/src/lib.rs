mod cli;
mod demo;
mod infra;
mod reporting;
mod routes;
mod server;

use compliance_audit::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
