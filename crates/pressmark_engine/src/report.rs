use std::path::Path;

use serde_json::{json, Value};
use thiserror::Error;

use crate::persist::{write_atomic, PersistError};
use crate::{BatchReport, RunSummary};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize run report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub fn summary_json(summary: &RunSummary) -> Value {
    json!({
        "records": summary.records,
        "output": summary.output.display().to_string(),
        "markdown": batch_json(&summary.markdown),
        "assets": batch_json(&summary.assets),
        "failed": summary.failed(),
    })
}

fn batch_json(report: &BatchReport) -> Value {
    let failures: Vec<Value> = report
        .failures
        .iter()
        .map(|f| json!({ "name": f.name, "error": f.error }))
        .collect();
    json!({
        "succeeded": report.succeeded,
        "skipped": report.skipped,
        "failed": report.failed(),
        "failures": failures,
    })
}

pub fn write_run_report(summary: &RunSummary, path: &Path) -> Result<(), ReportError> {
    let mut body = serde_json::to_vec_pretty(&summary_json(summary))?;
    body.push(b'\n');
    write_atomic(path, &body)?;
    Ok(())
}
