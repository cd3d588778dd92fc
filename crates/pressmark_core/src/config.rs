use std::path::PathBuf;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Finished run configuration. Produced by the command line front end and
/// never modified by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Name of the assets folder below `output`.
    pub assets: String,
    pub year_folders: bool,
    pub month_folders: bool,
    pub day_folders: bool,
    /// `slug/index.md` instead of `slug.md`.
    pub post_folders: bool,
    pub prefix_date: bool,
    pub save_attached_images: bool,
    pub save_scraped_images: bool,
    pub include_other_types: bool,
    pub include_draft_posts: bool,
    pub include_trashed_posts: bool,
    pub include_author_in_posts: bool,
    /// Only has an effect together with `include_other_types`.
    pub include_author_records: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("export.xml"),
            output: PathBuf::from("content"),
            assets: "assets".to_string(),
            year_folders: false,
            month_folders: false,
            day_folders: false,
            post_folders: true,
            prefix_date: false,
            save_attached_images: true,
            save_scraped_images: true,
            include_other_types: false,
            include_draft_posts: false,
            include_trashed_posts: false,
            include_author_in_posts: true,
            include_author_records: true,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid date format pattern {0:?}")]
    InvalidDatePattern(String),
}

/// How a record's creation instant is written into its header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum DateFormat {
    /// `2022-12-07`
    #[default]
    Date,
    /// `2022-12-07T10:12:16.000Z`
    Instant,
    /// chrono strftime pattern, validated on construction.
    Custom(String),
}

impl DateFormat {
    pub fn custom(pattern: impl Into<String>) -> Result<Self, SettingsError> {
        let pattern = pattern.into();
        if pattern.is_empty() || StrftimeItems::new(&pattern).any(|item| item == Item::Error) {
            return Err(SettingsError::InvalidDatePattern(pattern));
        }
        Ok(Self::Custom(pattern))
    }

    pub fn render(&self, instant: &DateTime<Utc>) -> String {
        match self {
            DateFormat::Date => instant.format("%Y-%m-%d").to_string(),
            DateFormat::Instant => instant.to_rfc3339_opts(SecondsFormat::Millis, true),
            DateFormat::Custom(pattern) => instant.format(pattern).to_string(),
        }
    }
}

impl TryFrom<String> for DateFormat {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "date" => Ok(Self::Date),
            "instant" => Ok(Self::Instant),
            _ => Self::custom(value),
        }
    }
}

/// Tunables read from the optional settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub date_format: DateFormat,
    /// Category slugs that never reach a record's header.
    pub filter_categories: Vec<String>,
    pub markdown_file_write_delay_ms: u64,
    pub image_file_request_delay_ms: u64,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_asset_bytes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            date_format: DateFormat::Date,
            filter_categories: vec!["uncategorized".to_string()],
            markdown_file_write_delay_ms: 25,
            image_file_request_delay_ms: 500,
            user_agent: "wordpress-export-to-markdown".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            max_asset_bytes: 50 * 1024 * 1024,
        }
    }
}

impl Settings {
    pub fn markdown_delay(&self) -> Duration {
        Duration::from_millis(self.markdown_file_write_delay_ms)
    }

    pub fn image_delay(&self) -> Duration {
        Duration::from_millis(self.image_file_request_delay_ms)
    }

    pub fn is_filtered_category(&self, category: &str) -> bool {
        self.filter_categories.iter().any(|c| c == category)
    }
}
