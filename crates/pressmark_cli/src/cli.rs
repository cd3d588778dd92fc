use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;
use pressmark_core::ExportConfig;

/// Convert a WordPress export file into a tree of markdown files and
/// download the images it references.
///
/// Boolean options take an explicit value (`--post-folders false`); `yes`,
/// `no`, `on`, `off`, `1` and `0` are accepted as well.
#[derive(Debug, Parser)]
#[command(name = "pressmark", version)]
pub struct Cli {
    /// Path to the WordPress export file.
    #[arg(long, default_value = "export.xml")]
    pub input: PathBuf,

    /// Directory the markdown tree is written to.
    #[arg(long, default_value = "content")]
    pub output: PathBuf,

    /// Name of the assets folder below the output directory.
    #[arg(long, default_value = "assets")]
    pub assets: String,

    /// Create year folders.
    #[arg(long, alias = "yearfolders", value_name = "BOOL", action = ArgAction::Set,
          value_parser = BoolishValueParser::new(), default_value_t = false)]
    pub year_folders: bool,

    /// Create month folders.
    #[arg(long, value_name = "BOOL", action = ArgAction::Set,
          value_parser = BoolishValueParser::new(), default_value_t = false)]
    pub month_folders: bool,

    /// Create day folders.
    #[arg(long, value_name = "BOOL", action = ArgAction::Set,
          value_parser = BoolishValueParser::new(), default_value_t = false)]
    pub day_folders: bool,

    /// Sets both year and month folders.
    #[arg(long, value_name = "BOOL", hide = true, value_parser = BoolishValueParser::new())]
    pub yearmonthfolders: Option<bool>,

    /// Sets year, month and day folders.
    #[arg(long, value_name = "BOOL", hide = true, value_parser = BoolishValueParser::new())]
    pub yearmonthdayfolders: Option<bool>,

    /// Write each post to `<slug>/index.md` instead of `<slug>.md`.
    #[arg(long, alias = "postfolders", value_name = "BOOL", action = ArgAction::Set,
          value_parser = BoolishValueParser::new(), default_value_t = true)]
    pub post_folders: bool,

    /// Prefix file or folder names with the post date.
    #[arg(long, alias = "prefixdate", value_name = "BOOL", action = ArgAction::Set,
          value_parser = BoolishValueParser::new(), default_value_t = false)]
    pub prefix_date: bool,

    /// Download images attached to posts.
    #[arg(long, alias = "saveimages", value_name = "BOOL", action = ArgAction::Set,
          value_parser = BoolishValueParser::new(), default_value_t = true)]
    pub save_attached_images: bool,

    /// Download images found in post bodies.
    #[arg(long, alias = "addcontentimages", value_name = "BOOL", action = ArgAction::Set,
          value_parser = BoolishValueParser::new(), default_value_t = true)]
    pub save_scraped_images: bool,

    /// Export pages and custom post types as well, each in its own folder.
    #[arg(long, value_name = "BOOL", action = ArgAction::Set,
          value_parser = BoolishValueParser::new(), default_value_t = false)]
    pub include_other_types: bool,

    /// Export draft posts into a `drafts` folder.
    #[arg(long, value_name = "BOOL", action = ArgAction::Set,
          value_parser = BoolishValueParser::new(), default_value_t = false)]
    pub include_draft_posts: bool,

    /// Export trashed posts into a `trash` folder.
    #[arg(long, value_name = "BOOL", action = ArgAction::Set,
          value_parser = BoolishValueParser::new(), default_value_t = false)]
    pub include_trashed_posts: bool,

    /// Add an `authors` list to each post header.
    #[arg(long, value_name = "BOOL", action = ArgAction::Set,
          value_parser = BoolishValueParser::new(), default_value_t = true)]
    pub include_author_in_posts: bool,

    /// Write an `authors` folder (only with --include-other-types).
    #[arg(long, value_name = "BOOL", action = ArgAction::Set,
          value_parser = BoolishValueParser::new(), default_value_t = true)]
    pub include_author_records: bool,

    /// TOML file with date format, category filter, delays and HTTP limits.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Also write log output to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Write a JSON run summary to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Cli {
    pub fn export_config(&self) -> ExportConfig {
        let mut config = ExportConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            assets: self.assets.clone(),
            year_folders: self.year_folders,
            month_folders: self.month_folders,
            day_folders: self.day_folders,
            post_folders: self.post_folders,
            prefix_date: self.prefix_date,
            save_attached_images: self.save_attached_images,
            save_scraped_images: self.save_scraped_images,
            include_other_types: self.include_other_types,
            include_draft_posts: self.include_draft_posts,
            include_trashed_posts: self.include_trashed_posts,
            include_author_in_posts: self.include_author_in_posts,
            include_author_records: self.include_author_records,
        };
        if let Some(on) = self.yearmonthfolders {
            config.year_folders = on;
            config.month_folders = on;
        }
        if let Some(on) = self.yearmonthdayfolders {
            config.year_folders = on;
            config.month_folders = on;
            config.day_folders = on;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_export_config() {
        let cli = Cli::try_parse_from(["pressmark"]).unwrap();
        assert_eq!(cli.export_config(), ExportConfig::default());
        assert_eq!(cli.log_level, LogLevel::Info);
    }

    #[test]
    fn boolean_options_take_values_and_legacy_names() {
        let cli = Cli::try_parse_from([
            "pressmark",
            "--postfolders",
            "false",
            "--prefix-date",
            "yes",
            "--addcontentimages=0",
            "--yearmonthfolders",
            "true",
        ])
        .unwrap();
        let config = cli.export_config();
        assert!(!config.post_folders);
        assert!(config.prefix_date);
        assert!(!config.save_scraped_images);
        assert!(config.year_folders && config.month_folders);
        assert!(!config.day_folders);
    }

    #[test]
    fn rejects_non_boolean_values() {
        assert!(Cli::try_parse_from(["pressmark", "--post-folders", "maybe"]).is_err());
    }
}
