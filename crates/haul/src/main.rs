use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use haul::{Pipeline, Report};
use haul_fetch::ReqwestClient;

use crate::cli::App;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let app = App::parse();
    if let Some(path) = &app.config
        && !path.is_file()
    {
        bail!("config file '{}' not found", path.display());
    }

    let raw = haul::config::load(app.config.as_deref(), &app.overrides())
        .context("failed to load configuration")?;
    haul::logging::init(&raw.log_config()).context("failed to initialise logging")?;

    let request = match raw.validate() {
        Ok(request) => request,
        Err(error) => {
            tracing::error!(%error, "rejected request");
            let src = raw.source.clone().unwrap_or_default();
            let dest = raw.destination.clone().unwrap_or_default();
            emit(&Report::new(src, dest).failed(&error))?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let client = ReqwestClient::with_config(&raw.client_config())?;
    let pipeline = Pipeline::new(client).staging_root(request.staging_root());

    match haul::execute(&pipeline, &request).await {
        Ok(report) => {
            emit(&report)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            tracing::error!(error = %failure.error, "download failed");
            emit(&failure.into_report())?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn emit(report: &Report) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", report.to_json()?)?;
    stdout.flush()?;
    Ok(())
}
