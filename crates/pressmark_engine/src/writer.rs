//! Materializes records: markdown files first, then their assets.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use pressmark_core::{
    asset_filename, asset_path, build_markdown_document, record_path, ExportConfig, Record,
    Settings,
};
use pressmark_logging::{press_debug, press_info, press_warn};

use crate::batch::{process_payloads, staggered, Payload, PayloadError};
use crate::fetch::{encode_asset_url, Fetcher};
use crate::persist::{ensure_output_dir, PersistError};
use crate::{BatchReport, RunSummary};

pub struct Materializer {
    config: ExportConfig,
    settings: Settings,
    fetcher: Arc<dyn Fetcher>,
}

impl Materializer {
    pub fn new(config: ExportConfig, settings: Settings, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config,
            settings,
            fetcher,
        }
    }

    pub async fn write_all(&self, records: &[Record]) -> Result<RunSummary, PersistError> {
        ensure_output_dir(&self.config.output)?;
        let markdown = self.write_markdown_files(records).await;
        let assets = self.write_asset_files(records).await;
        Ok(RunSummary {
            records: records.len(),
            output: self.config.output.clone(),
            markdown,
            assets,
        })
    }

    /// Existing files are skipped; everything else is written in a staggered batch.
    pub async fn write_markdown_files(&self, records: &[Record]) -> BatchReport {
        let mut claimed: HashMap<PathBuf, String> = HashMap::new();
        let mut payloads = Vec::new();
        let mut skipped = 0;

        for record in records {
            let destination = record_path(record, &self.config);
            let name = record.display_name(self.config.include_other_types);
            if let Some(previous) = claimed.insert(destination.clone(), name.clone()) {
                press_warn!(
                    "{} and {} both resolve to {}; the later one wins",
                    previous,
                    name,
                    destination.display()
                );
            }
            if destination.exists() {
                skipped += 1;
                continue;
            }
            let document = build_markdown_document(&record.header, record.body.as_deref());
            payloads.push(Payload {
                name,
                destination,
                delay: staggered(self.settings.markdown_delay(), payloads.len()),
                item: document,
            });
        }

        if payloads.is_empty() && skipped == 0 {
            press_info!("No posts to save...");
            return BatchReport::default();
        }
        press_info!(
            "Saving {} posts ({} already exist)...",
            payloads.len(),
            skipped
        );

        let mut report = process_payloads(payloads, |document: String| async move {
            Ok::<_, PayloadError>(Bytes::from(document))
        })
        .await;
        report.skipped = skipped;
        report
    }

    /// Each destination is fetched at most once per run, even when several
    /// records share an asset.
    pub async fn write_asset_files(&self, records: &[Record]) -> BatchReport {
        let mut scheduled: HashSet<PathBuf> = HashSet::new();
        let mut payloads = Vec::new();
        let mut skipped = 0;

        for url in records.iter().flat_map(|r| r.asset_urls.iter()) {
            let destination = asset_path(url, &self.config);
            if !scheduled.insert(destination.clone()) {
                press_debug!("{} already scheduled, not fetching {}", destination.display(), url);
                continue;
            }
            if destination.exists() {
                skipped += 1;
                continue;
            }
            payloads.push(Payload {
                name: asset_filename(url),
                destination,
                delay: staggered(self.settings.image_delay(), payloads.len()),
                item: url.clone(),
            });
        }

        if payloads.is_empty() && skipped == 0 {
            press_info!("No images to download and save...");
            return BatchReport::default();
        }
        press_info!(
            "Downloading and saving {} images ({} already exist)...",
            payloads.len(),
            skipped
        );

        let fetcher = Arc::clone(&self.fetcher);
        let mut report = process_payloads(payloads, move |url: String| {
            let fetcher = Arc::clone(&fetcher);
            async move {
                let output = fetcher.fetch(&encode_asset_url(&url)).await?;
                let meta = &output.metadata;
                press_debug!(
                    "{} -> {} ({} redirects, {} bytes, {})",
                    meta.original_url,
                    meta.final_url,
                    meta.redirect_count,
                    meta.byte_len,
                    meta.content_type.as_deref().unwrap_or("unknown type")
                );
                Ok::<_, PayloadError>(output.bytes)
            }
        })
        .await;
        report.skipped = skipped;
        report
    }
}
