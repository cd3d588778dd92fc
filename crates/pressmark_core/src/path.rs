use std::path::PathBuf;

use crate::{ExportConfig, Record, RecordKind, Status};

pub const MARKDOWN_EXTENSION: &str = "md";

const IMAGES_FOLDER: &str = "images";

/// Deterministic destination of a record's markdown file:
/// `<output>/[type/][drafts|trash/][yyyy/][MM/][dd/]<[date-]slug>[/index].md`
pub fn record_path(record: &Record, config: &ExportConfig) -> PathBuf {
    let mut path = config.output.clone();

    if config.include_other_types {
        path.push(record.kind.folder_name());
    }

    if record.kind == RecordKind::Post {
        match record.status {
            Status::Draft if config.include_draft_posts => path.push("drafts"),
            Status::Trash if config.include_trashed_posts => path.push("trash"),
            _ => {}
        }
    }

    if let Some(created) = record.created_at.filter(|_| record.kind != RecordKind::Page) {
        if config.year_folders {
            path.push(created.format("%Y").to_string());
        }
        if config.month_folders {
            path.push(created.format("%m").to_string());
        }
        if config.day_folders {
            path.push(created.format("%d").to_string());
        }
    }

    let slug_fragment = match record.created_at {
        Some(created) if config.prefix_date => {
            format!("{}-{}", created.format("%Y-%m-%d"), record.slug)
        }
        _ => record.slug.clone(),
    };

    if config.post_folders {
        path.push(slug_fragment);
        path.push(format!("index.{MARKDOWN_EXTENSION}"));
    } else {
        path.push(format!("{slug_fragment}.{MARKDOWN_EXTENSION}"));
    }
    path
}

/// Last path segment of `url`, without query or fragment.
pub fn asset_filename(url: &str) -> String {
    let end = url.find(&['?', '#'][..]).unwrap_or(url.len());
    let trimmed = &url[..end];
    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}

pub fn is_document_asset(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}

/// Images land in `<output>/<assets>/images/`, documents in `<output>/<assets>/`.
pub fn asset_path(url: &str, config: &ExportConfig) -> PathBuf {
    let filename = asset_filename(url);
    let mut path = config.output.join(&config.assets);
    if !is_document_asset(&filename) {
        path.push(IMAGES_FOLDER);
    }
    path.push(filename);
    path
}

/// Site-absolute path written into a record's `image` header field.
pub fn cover_image_path(url: &str, assets: &str) -> String {
    format!("/{assets}/{IMAGES_FOLDER}/{}", asset_filename(url))
}
