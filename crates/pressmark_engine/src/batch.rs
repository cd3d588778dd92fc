//! Staggered batch execution: one task per payload, each sleeping for its
//! own delay before loading and writing.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use futures_util::future::join_all;
use pressmark_logging::{press_info, press_warn};
use thiserror::Error;

use crate::persist::{write_atomic, PersistError};
use crate::{BatchFailure, BatchReport, FetchError};

#[derive(Debug, Clone)]
pub struct Payload<T> {
    pub name: String,
    pub destination: PathBuf,
    pub delay: Duration,
    pub item: T,
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("task did not complete: {0}")]
    Join(String),
}

/// `index × step`, saturating.
pub fn staggered(step: Duration, index: usize) -> Duration {
    step.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
}

/// Runs every payload concurrently and waits for all of them. Failures are
/// collected, never propagated.
pub async fn process_payloads<T, F, Fut>(payloads: Vec<Payload<T>>, load: F) -> BatchReport
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<Bytes, PayloadError>> + Send + 'static,
{
    let (names, tasks): (Vec<_>, Vec<_>) = payloads
        .into_iter()
        .map(|payload| {
            let load = load.clone();
            let name = payload.name.clone();
            let task = tokio::spawn(async move {
                tokio::time::sleep(payload.delay).await;
                let result = run_payload(&payload.destination, load(payload.item)).await;
                match &result {
                    Ok(()) => press_info!("[OK] {}", payload.name),
                    Err(err) => press_warn!("[FAILED] {} ({})", payload.name, err),
                }
                result
            });
            (name, task)
        })
        .unzip();

    let mut report = BatchReport::default();
    for (name, joined) in names.into_iter().zip(join_all(tasks).await) {
        let outcome = joined.unwrap_or_else(|err| Err(PayloadError::Join(err.to_string())));
        match outcome {
            Ok(()) => report.succeeded += 1,
            Err(err) => report.failures.push(BatchFailure {
                name,
                error: err.to_string(),
            }),
        }
    }

    if report.failures.is_empty() {
        press_info!("Done, got them all!");
    } else {
        press_warn!("Done, but with {} failed payloads:", report.failed());
        for failure in &report.failures {
            press_warn!("[X] {}: {}", failure.name, failure.error);
        }
    }
    report
}

async fn run_payload<Fut>(destination: &std::path::Path, load: Fut) -> Result<(), PayloadError>
where
    Fut: Future<Output = Result<Bytes, PayloadError>>,
{
    let bytes = load.await?;
    let destination = destination.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic(&destination, &bytes))
        .await
        .map_err(|err| PayloadError::Join(err.to_string()))??;
    Ok(())
}
