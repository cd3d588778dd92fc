mod cli;
mod settings;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pressmark_core::{ExportConfig, Settings};
use pressmark_engine::{
    build_records, read_export, write_run_report, FetchSettings, Materializer, MarkdownTranslator,
    ReqwestFetcher, RunSummary, TranslateOptions,
};
use pressmark_logging::{press_error, press_info, LogDestination};

use crate::cli::Cli;
use crate::settings::load_settings;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let destination = match &cli.log_file {
        Some(path) => LogDestination::TerminalAndFile(path.clone()),
        None => LogDestination::Terminal,
    };
    pressmark_logging::initialize(cli.log_level.into(), destination);

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            press_error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let config = cli.export_config();
    let settings = load_settings(cli.settings.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let summary = runtime.block_on(convert(config, settings))?;

    print_summary(&summary);
    if let Some(report) = &cli.report {
        write_run_report(&summary, report)
            .with_context(|| format!("Failed to write report {}", report.display()))?;
    }
    Ok(summary)
}

async fn convert(config: ExportConfig, settings: Settings) -> Result<RunSummary> {
    let doc = read_export(&config.input)
        .with_context(|| format!("Failed to load export {}", config.input.display()))?;
    let translator = MarkdownTranslator::new(TranslateOptions::from_config(&config));
    let records = build_records(&doc, &config, &settings, &translator)
        .context("Failed to extract records")?;

    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::from_settings(&settings)));
    let summary = Materializer::new(config, settings, fetcher)
        .write_all(&records)
        .await
        .context("Failed to prepare output directory")?;
    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    let output = absolute(&summary.output);
    press_info!(
        "Wrote {} of {} records ({} skipped) and {} assets ({} skipped), {} failed.",
        summary.markdown.succeeded,
        summary.records,
        summary.markdown.skipped,
        summary.assets.succeeded,
        summary.assets.skipped,
        summary.failed()
    );
    press_info!("All done! Output is in {}", output.display());
}

fn absolute(path: &Path) -> std::path::PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
