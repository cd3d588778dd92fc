//! Pressmark core: record model, configuration and the pure transformation steps.
mod config;
mod frontmatter;
mod link;
mod normalize;
mod path;
mod record;

pub use config::{DateFormat, ExportConfig, Settings, SettingsError};
pub use frontmatter::build_markdown_document;
pub use link::{link_assets, LinkStats};
pub use normalize::{
    is_markup_title, normalize_author, percent_decode, split_creators, title_from_slug,
    NormalizeError,
};
pub use path::{
    asset_filename, asset_path, cover_image_path, is_document_asset, record_path,
    MARKDOWN_EXTENSION,
};
pub use record::{keys, Asset, Header, HeaderValue, Record, RecordKind, Status};
