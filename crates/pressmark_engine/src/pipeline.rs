//! Read, decode and parse the export, then build linked records.

use std::io;
use std::path::{Path, PathBuf};

use pressmark_core::{link_assets, ExportConfig, Record, Settings};
use pressmark_logging::{press_debug, press_info};
use thiserror::Error;

use crate::convert::Converter;
use crate::decode::{decode_export, DecodeError};
use crate::document::{parse_document, DocumentError, ExportDocument};
use crate::extract::{collect_post_types, extract_records, ExtractError};
use crate::images::{collect_attached_images, collect_scraped_images};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

pub fn read_export(path: &Path) -> Result<ExportDocument, PipelineError> {
    press_info!("Parsing...");
    let bytes = std::fs::read(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = decode_export(&bytes)?;
    press_debug!("{} decoded as {}", path.display(), decoded.encoding_label);
    Ok(parse_document(&decoded.text)?)
}

/// Extracts records and attaches every discovered asset to them.
pub fn build_records(
    doc: &ExportDocument,
    config: &ExportConfig,
    settings: &Settings,
    converter: &dyn Converter,
) -> Result<Vec<Record>, PipelineError> {
    let post_types = collect_post_types(doc, config);
    let mut records = extract_records(doc, &post_types, config, settings, converter)?;

    let mut assets = Vec::new();
    if config.save_attached_images {
        assets.extend(collect_attached_images(doc)?);
    }
    if config.save_scraped_images {
        assets.extend(collect_scraped_images(doc, &post_types, config));
    }

    let stats = link_assets(&assets, &mut records, &config.assets);
    press_debug!(
        "linked {} asset references, {} cover images",
        stats.attached,
        stats.covers
    );
    Ok(records)
}
