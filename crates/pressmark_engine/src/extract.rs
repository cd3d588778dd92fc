//! Record extraction: typed records from the parsed export document.

use chrono::{DateTime, Utc};
use pressmark_core::{
    is_markup_title, keys, normalize_author, percent_decode, split_creators, title_from_slug,
    ExportConfig, Header, NormalizeError, Record, RecordKind, Settings, Status,
};
use pressmark_logging::press_info;

use crate::convert::Converter;
use crate::document::{ExportDocument, RawAuthor, RawItem};

/// Item types that never become records when other types are included.
pub const EXCLUDED_TYPES: &[&str] = &[
    "attachment",
    "revision",
    "nav_menu_item",
    "custom_css",
    "customize_changeset",
    "mc4wp-form",
    "wp_global_styles",
];

const THUMBNAIL_META_KEY: &str = "_thumbnail_id";
const CATEGORY_DOMAIN: &str = "category";
const TAG_DOMAIN: &str = "post_tag";
const UNSET_YEAR: &str = "-0001";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("item #{item} ({post_type}) is missing required field {field}")]
    MissingField {
        item: usize,
        post_type: String,
        field: &'static str,
    },
    #[error("item #{item} has an unparsable publish date {value:?}: {message}")]
    InvalidDate {
        item: usize,
        value: String,
        message: String,
    },
    #[error("{context}: {source}")]
    Normalize {
        context: String,
        #[source]
        source: NormalizeError,
    },
}

/// Type names to export, in first-seen order. The author pseudo type comes last.
pub fn collect_post_types(doc: &ExportDocument, config: &ExportConfig) -> Vec<String> {
    if !config.include_other_types {
        return vec![RecordKind::Post.type_name().to_string()];
    }

    let mut types: Vec<String> = Vec::new();
    for item in &doc.items {
        let name = item.post_type.as_str();
        if EXCLUDED_TYPES.contains(&name) || types.iter().any(|t| t == name) {
            continue;
        }
        types.push(name.to_string());
    }
    if config.include_author_records && !types.iter().any(|t| t == RecordKind::AUTHOR_TYPE) {
        types.push(RecordKind::AUTHOR_TYPE.to_string());
    }
    types
}

/// Status filter for items of an exported type.
pub fn qualifies(item: &RawItem, config: &ExportConfig) -> bool {
    match item.status.as_deref() {
        Some("trash") => config.include_trashed_posts,
        Some("draft") => config.include_draft_posts,
        _ => true,
    }
}

pub fn extract_records(
    doc: &ExportDocument,
    post_types: &[String],
    config: &ExportConfig,
    settings: &Settings,
    converter: &dyn Converter,
) -> Result<Vec<Record>, ExtractError> {
    let mut records = Vec::new();
    for post_type in post_types {
        let batch = if post_type == RecordKind::AUTHOR_TYPE {
            collect_authors(doc)?
        } else {
            doc.items_of_type(post_type)
                .filter(|item| qualifies(item, config))
                .map(|item| build_record(item, config, settings, converter))
                .collect::<Result<Vec<_>, _>>()?
        };

        if post_types.len() > 1 {
            let with = if post_type == RecordKind::AUTHOR_TYPE {
                " with"
            } else {
                ""
            };
            press_info!("{} \"{}\"{} posts found.", batch.len(), post_type, with);
        }
        records.extend(batch);
    }

    if post_types.len() == 1 {
        press_info!("{} posts found.", records.len());
    }
    Ok(records)
}

fn build_record(
    item: &RawItem,
    config: &ExportConfig,
    settings: &Settings,
    converter: &dyn Converter,
) -> Result<Record, ExtractError> {
    let id = required(item, item.post_id.as_deref(), "post_id")?;
    let raw_slug = required(item, item.post_name.as_deref(), "post_name")?;
    let status = required(item, item.status.as_deref(), "status")?;
    let raw_title = required(item, item.title.as_deref(), "title")?;
    let creator = required(item, item.creator.as_deref(), "creator")?;
    let pub_date = required(item, item.pub_date.as_deref(), "pubDate")?;
    let content = required(item, item.content.as_deref(), "content:encoded")?;
    required(item, item.link.as_deref(), "link")?;

    // Never-published drafts carry no post_name; their id keeps the path unique.
    let raw_slug = if raw_slug.trim().is_empty() { id } else { raw_slug };
    let slug = percent_decode(raw_slug).map_err(|source| ExtractError::Normalize {
        context: format!("item #{}", item.index),
        source,
    })?;
    let created_at = if status != "publish" && is_unset_date(pub_date) {
        None
    } else {
        Some(parse_pub_date(item.index, pub_date)?)
    };

    let title = if is_markup_title(raw_title) {
        title_from_slug(raw_slug)
    } else {
        raw_title.to_string()
    };

    let categories = term_labels(item, CATEGORY_DOMAIN)?
        .into_iter()
        .filter(|c| !settings.is_filtered_category(c))
        .collect();
    let tags = term_labels(item, TAG_DOMAIN)?;

    let mut header = Header::new();
    header.set_text(keys::TITLE, title);
    if let Some(created_at) = &created_at {
        header.set_text(keys::CREATED, settings.date_format.render(created_at));
    }
    header.set_list(keys::CATEGORIES, categories);
    header.set_list(keys::TAGS, tags);
    if config.include_author_in_posts {
        header.set_list(keys::AUTHORS, split_creators(creator));
    }

    Ok(Record {
        id: id.to_string(),
        slug,
        kind: RecordKind::from_type_name(&item.post_type),
        status: Status::parse(status),
        created_at,
        header,
        cover_asset_id: item.meta_value(THUMBNAIL_META_KEY).map(str::to_string),
        asset_urls: Vec::new(),
        body: Some(converter.to_markdown(content)),
    })
}

fn required<'a>(
    item: &RawItem,
    value: Option<&'a str>,
    field: &'static str,
) -> Result<&'a str, ExtractError> {
    value.ok_or_else(|| ExtractError::MissingField {
        item: item.index,
        post_type: item.post_type.clone(),
        field,
    })
}

fn parse_pub_date(item: usize, raw: &str) -> Result<DateTime<Utc>, ExtractError> {
    DateTime::parse_from_rfc2822(raw.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| ExtractError::InvalidDate {
            item,
            value: raw.to_string(),
            message: err.to_string(),
        })
}

/// WordPress writes `Mon, 30 Nov -0001 00:00:00 +0000` for posts that were
/// never published.
fn is_unset_date(raw: &str) -> bool {
    raw.split_whitespace().nth(3) == Some(UNSET_YEAR)
}

fn term_labels(item: &RawItem, domain: &str) -> Result<Vec<String>, ExtractError> {
    item.terms
        .iter()
        .filter(|term| term.domain == domain)
        .map(|term| {
            percent_decode(&term.nicename).map_err(|source| ExtractError::Normalize {
                context: format!("item #{} {domain}", item.index),
                source,
            })
        })
        .collect()
}

/// Channel authors credited with at least one published, non-attachment item.
pub fn collect_authors(doc: &ExportDocument) -> Result<Vec<Record>, ExtractError> {
    doc.authors
        .iter()
        .filter(|author| has_qualifying_item(doc, author))
        .map(author_record)
        .collect()
}

fn has_qualifying_item(doc: &ExportDocument, author: &RawAuthor) -> bool {
    doc.items.iter().any(|item| {
        !matches!(item.status.as_deref(), Some("trash") | Some("draft"))
            && item.post_type != "attachment"
            && item.creator.as_deref() == Some(author.login.as_str())
    })
}

fn author_record(author: &RawAuthor) -> Result<Record, ExtractError> {
    let id = normalize_author(&author.login);
    let slug = percent_decode(&id).map_err(|source| ExtractError::Normalize {
        context: format!("author {}", author.login),
        source,
    })?;

    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
    let name = match (non_empty(&author.first_name), non_empty(&author.last_name)) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        _ => non_empty(&author.display_name).unwrap_or_else(|| author.login.clone()),
    };

    let mut header = Header::new();
    header.set_text(keys::ID, id.clone());
    header.set_text(keys::NAME, name);

    Ok(Record {
        id,
        slug,
        kind: RecordKind::Author,
        status: Status::Publish,
        created_at: None,
        header,
        cover_asset_id: None,
        asset_urls: Vec::new(),
        body: None,
    })
}
