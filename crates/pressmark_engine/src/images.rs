//! Asset discovery: explicit attachments and images referenced from bodies.

use once_cell::sync::Lazy;
use pressmark_core::{Asset, ExportConfig, RecordKind};
use pressmark_logging::{press_info, press_warn};
use regex::Regex;
use url::Url;

use crate::document::ExportDocument;
use crate::extract::{qualifies, ExtractError};

static ATTACHMENT_EXTENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(gif|jpe?g|png|svg|webp|pdf)$").expect("valid attachment pattern")
});

static BODY_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img[^>]*src="(.+?\.(?:gif|jpe?g|png|svg|webp))"[^>]*>"#)
        .expect("valid body image pattern")
});

const ATTACHMENT_TYPE: &str = "attachment";

pub fn collect_attached_images(doc: &ExportDocument) -> Result<Vec<Asset>, ExtractError> {
    let mut images = Vec::new();
    for item in doc.items_of_type(ATTACHMENT_TYPE) {
        let missing = |field: &'static str| ExtractError::MissingField {
            item: item.index,
            post_type: item.post_type.clone(),
            field,
        };
        let url = item
            .attachment_url
            .as_deref()
            .ok_or_else(|| missing("attachment_url"))?;
        if !ATTACHMENT_EXTENSION.is_match(url) {
            continue;
        }
        let id = item.post_id.as_deref().ok_or_else(|| missing("post_id"))?;
        images.push(Asset {
            source_id: Some(id.to_string()),
            owning_record_id: item.post_parent.clone(),
            url: url.to_string(),
        });
    }

    press_info!("{} attached images found.", images.len());
    Ok(images)
}

/// `<img>` references in the raw bodies of exported items, resolved against
/// each item's link. Not deduplicated.
pub fn collect_scraped_images(
    doc: &ExportDocument,
    post_types: &[String],
    config: &ExportConfig,
) -> Vec<Asset> {
    let mut images = Vec::new();
    for post_type in post_types
        .iter()
        .filter(|t| t.as_str() != RecordKind::AUTHOR_TYPE)
    {
        for item in doc
            .items_of_type(post_type)
            .filter(|item| qualifies(item, config))
        {
            let (Some(content), Some(post_id)) = (item.content.as_deref(), item.post_id.as_ref())
            else {
                continue;
            };
            for caps in BODY_IMAGE.captures_iter(content) {
                let src = &caps[1];
                match resolve_image_url(src, item.link.as_deref()) {
                    Some(url) => images.push(Asset {
                        source_id: None,
                        owning_record_id: Some(post_id.clone()),
                        url,
                    }),
                    None => press_warn!(
                        "Skipping image {src:?} in item #{}: cannot resolve against {:?}",
                        item.index,
                        item.link
                    ),
                }
            }
        }
    }

    press_info!("{} images scraped from post body content.", images.len());
    images
}

fn resolve_image_url(src: &str, link: Option<&str>) -> Option<String> {
    let base = link.and_then(|l| Url::parse(l).ok());
    match base {
        Some(base) => base.join(src).ok(),
        None => Url::parse(src).ok(),
    }
    .map(String::from)
}
