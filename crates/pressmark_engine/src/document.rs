//! WordPress export (WXR) parsing.
//!
//! The XML is read into a small element tree first; namespace prefixes are
//! dropped so `wp:post_id` and `post_id` look the same. Typed items and
//! authors are then lifted out of `rss/channel`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("malformed xml: {0}")]
    Xml(String),
    #[error("unclosed element <{0}> at end of document")]
    Unclosed(String),
    #[error("document has no rss/channel element")]
    MissingChannel,
    #[error("item #{item} is missing required field {field}")]
    MissingField { item: usize, field: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(|c| c.text.clone())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A taxonomy entry on an item (`<category domain="post_tag" nicename="...">`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTerm {
    pub domain: String,
    pub nicename: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    /// Position in the channel, used in error messages.
    pub index: usize,
    pub post_type: String,
    pub post_id: Option<String>,
    pub post_name: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
    pub creator: Option<String>,
    pub pub_date: Option<String>,
    pub content: Option<String>,
    pub link: Option<String>,
    pub post_parent: Option<String>,
    pub attachment_url: Option<String>,
    pub terms: Vec<RawTerm>,
    pub meta: Vec<(String, String)>,
}

impl RawItem {
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAuthor {
    pub login: String,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportDocument {
    pub items: Vec<RawItem>,
    pub authors: Vec<RawAuthor>,
}

impl ExportDocument {
    pub fn items_of_type<'a>(&'a self, post_type: &'a str) -> impl Iterator<Item = &'a RawItem> {
        self.items.iter().filter(move |i| i.post_type == post_type)
    }
}

pub fn parse_document(xml: &str) -> Result<ExportDocument, DocumentError> {
    let root = parse_tree(xml)?;
    let channel = root
        .child("rss")
        .and_then(|rss| rss.child("channel"))
        .ok_or(DocumentError::MissingChannel)?;

    let items = channel
        .children_named("item")
        .enumerate()
        .map(|(index, item)| raw_item(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    let authors = channel
        .children_named("author")
        .filter_map(raw_author)
        .collect();

    Ok(ExportDocument { items, authors })
}

fn raw_item(index: usize, item: &Element) -> Result<RawItem, DocumentError> {
    let post_type = item
        .child_text("post_type")
        .ok_or(DocumentError::MissingField {
            item: index,
            field: "post_type",
        })?;

    let terms = item
        .children_named("category")
        .filter_map(|c| {
            Some(RawTerm {
                domain: c.attribute("domain")?.to_string(),
                nicename: c.attribute("nicename")?.to_string(),
            })
        })
        .collect();

    let meta = item
        .children_named("postmeta")
        .filter_map(|m| Some((m.child_text("meta_key")?, m.child_text("meta_value")?)))
        .collect();

    Ok(RawItem {
        index,
        post_type,
        post_id: item.child_text("post_id"),
        post_name: item.child_text("post_name"),
        status: item.child_text("status"),
        title: item.child_text("title"),
        creator: item.child_text("creator"),
        pub_date: item.child_text("pubDate"),
        // content:encoded precedes excerpt:encoded in every export
        content: item.child_text("encoded"),
        link: item.child_text("link"),
        post_parent: item.child_text("post_parent"),
        attachment_url: item.child_text("attachment_url"),
        terms,
        meta,
    })
}

fn raw_author(author: &Element) -> Option<RawAuthor> {
    // The plain RSS <author> element has no login and is not a site author.
    let login = author.child_text("author_login")?;
    Some(RawAuthor {
        login,
        display_name: author.child_text("author_display_name"),
        first_name: author.child_text("author_first_name"),
        last_name: author.child_text("author_last_name"),
    })
}

fn parse_tree(xml: &str) -> Result<Element, DocumentError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack = vec![Element::named("#document")];
    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error(e, reader.buffer_position()))?;
        match event {
            Event::Start(start) => stack.push(element_from(&start)?),
            Event::Empty(start) => {
                let element = element_from(&start)?;
                push_child(&mut stack, element);
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(DocumentError::Xml("unexpected closing tag".into()));
                }
                if let Some(mut done) = stack.pop() {
                    let trimmed = done.text.trim();
                    if trimmed.len() != done.text.len() {
                        done.text = trimmed.to_string();
                    }
                    push_child(&mut stack, done);
                }
            }
            Event::Text(text) => {
                let unescaped = text
                    .unescape()
                    .map_err(|e| xml_error(e, reader.buffer_position()))?;
                append_text(&mut stack, &unescaped);
            }
            Event::CData(cdata) => {
                append_text(&mut stack, &String::from_utf8_lossy(&cdata));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() > 1 {
        let open = stack.last().map(|e| e.name.clone()).unwrap_or_default();
        return Err(DocumentError::Unclosed(open));
    }
    stack.pop().ok_or(DocumentError::MissingChannel)
}

fn xml_error(err: impl std::fmt::Display, position: impl std::fmt::Display) -> DocumentError {
    DocumentError::Xml(format!("{err} (at byte {position})"))
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, DocumentError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DocumentError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| DocumentError::Xml(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        ..Element::default()
    })
}

fn push_child(stack: &mut [Element], element: Element) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    }
}

fn append_text(stack: &mut [Element], text: &str) {
    if let Some(current) = stack.last_mut() {
        current.text.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss xmlns:wp="http://wordpress.org/export/1.2/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:excerpt="http://wordpress.org/export/1.2/excerpt/">
<channel>
  <title>Site</title>
  <wp:author><wp:author_login><![CDATA[jane]]></wp:author_login><wp:author_display_name><![CDATA[Jane]]></wp:author_display_name></wp:author>
  <item>
    <title>Fish &amp; Chips</title>
    <dc:creator><![CDATA[jane]]></dc:creator>
    <content:encoded><![CDATA[  <p>Body</p>  ]]></content:encoded>
    <excerpt:encoded><![CDATA[Excerpt]]></excerpt:encoded>
    <wp:post_id>7</wp:post_id>
    <wp:post_type><![CDATA[post]]></wp:post_type>
    <category domain="post_tag" nicename="caf%c3%a9"><![CDATA[Café]]></category>
    <category>no domain</category>
    <wp:postmeta><wp:meta_key><![CDATA[_thumbnail_id]]></wp:meta_key><wp:meta_value><![CDATA[12]]></wp:meta_value></wp:postmeta>
  </item>
</channel>
</rss>"#;

    #[test]
    fn lifts_items_and_authors_from_channel() {
        let doc = parse_document(MINIMAL).unwrap();
        assert_eq!(doc.authors.len(), 1);
        assert_eq!(doc.authors[0].login, "jane");
        assert_eq!(doc.authors[0].first_name, None);

        let item = &doc.items[0];
        assert_eq!(item.post_type, "post");
        assert_eq!(item.title.as_deref(), Some("Fish & Chips"));
        assert_eq!(item.content.as_deref(), Some("<p>Body</p>"));
        assert_eq!(item.post_id.as_deref(), Some("7"));
        assert_eq!(item.meta_value("_thumbnail_id"), Some("12"));
        assert_eq!(item.terms.len(), 1);
        assert_eq!(item.terms[0].nicename, "caf%c3%a9");
    }

    #[test]
    fn missing_channel_is_structural() {
        assert_eq!(
            parse_document("<rss><nope/></rss>"),
            Err(DocumentError::MissingChannel)
        );
    }

    #[test]
    fn item_without_type_is_rejected() {
        let xml = "<rss><channel><item><title>x</title></item></channel></rss>";
        assert_eq!(
            parse_document(xml),
            Err(DocumentError::MissingField {
                item: 0,
                field: "post_type"
            })
        );
    }

    #[test]
    fn unbalanced_markup_is_an_error() {
        assert!(parse_document("<rss><channel><item></channel></rss>").is_err());
        assert!(parse_document("<rss><channel>").is_err());
    }
}
