use chrono::{DateTime, Utc};

/// Header keys written by the extractor and the linker.
pub mod keys {
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const CREATED: &str = "created";
    pub const CATEGORIES: &str = "categories";
    pub const TAGS: &str = "tags";
    pub const AUTHORS: &str = "authors";
    pub const IMAGE: &str = "image";
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Post,
    Page,
    Custom(String),
    /// Synthesized from the channel author list.
    Author,
}

impl RecordKind {
    pub const AUTHOR_TYPE: &'static str = "authors";

    pub fn from_type_name(name: &str) -> Self {
        match name {
            "post" => RecordKind::Post,
            "page" => RecordKind::Page,
            Self::AUTHOR_TYPE => RecordKind::Author,
            other => RecordKind::Custom(other.to_string()),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            RecordKind::Post => "post",
            RecordKind::Page => "page",
            RecordKind::Custom(name) => name.as_str(),
            RecordKind::Author => Self::AUTHOR_TYPE,
        }
    }

    /// Folder used when several types share one output tree.
    pub fn folder_name(&self) -> &str {
        match self {
            RecordKind::Post => "blog",
            other => other.type_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Publish,
    Draft,
    Trash,
    Other(String),
}

impl Status {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "publish" => Status::Publish,
            "draft" => Status::Draft,
            "trash" => Status::Trash,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Publish => "publish",
            Status::Draft => "draft",
            Status::Trash => "trash",
            Status::Other(raw) => raw.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Text(String),
    List(Vec<String>),
}

/// Ordered header fields. Keys keep their insertion position when overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    fields: Vec<(String, HeaderValue)>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: HeaderValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key, HeaderValue::Text(value.into()));
    }

    pub fn set_list(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.set(key, HeaderValue::List(values));
    }

    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(HeaderValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.get(key) {
            Some(HeaderValue::List(values)) => Some(values),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One exportable unit: a post, page, custom type item or synthesized author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub slug: String,
    pub kind: RecordKind,
    pub status: Status,
    /// Absent for synthesized authors.
    pub created_at: Option<DateTime<Utc>>,
    pub header: Header,
    pub cover_asset_id: Option<String>,
    pub asset_urls: Vec<String>,
    pub body: Option<String>,
}

impl Record {
    /// Appends `url` unless already present. Returns whether it was added.
    pub fn add_asset_url(&mut self, url: &str) -> bool {
        if self.asset_urls.iter().any(|u| u == url) {
            return false;
        }
        self.asset_urls.push(url.to_string());
        true
    }

    /// Name used in progress and failure output.
    pub fn display_name(&self, include_other_types: bool) -> String {
        if include_other_types {
            format!("{} - {}", self.kind.folder_name(), self.slug)
        } else {
            self.slug.clone()
        }
    }
}

/// A remote binary resource referenced by one or more records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Attachment id; `None` for references scraped from body markup.
    pub source_id: Option<String>,
    pub owning_record_id: Option<String>,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_overwrite_keeps_position() {
        let mut header = Header::new();
        header.set_text(keys::TITLE, "A");
        header.set_list(keys::TAGS, vec!["x".into()]);
        header.set_text(keys::TITLE, "B");

        let names: Vec<_> = header.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["title", "tags"]);
        assert_eq!(header.text(keys::TITLE), Some("B"));
        assert_eq!(header.list(keys::TAGS).map(<[String]>::len), Some(1));
    }

    #[test]
    fn kind_round_trips_type_names() {
        for name in ["post", "page", "authors", "recipe"] {
            assert_eq!(RecordKind::from_type_name(name).type_name(), name);
        }
        assert_eq!(RecordKind::Post.folder_name(), "blog");
        assert_eq!(RecordKind::Custom("recipe".into()).folder_name(), "recipe");
    }

    #[test]
    fn asset_urls_stay_unique() {
        let mut record = Record {
            id: "1".into(),
            slug: "s".into(),
            kind: RecordKind::Post,
            status: Status::Publish,
            created_at: None,
            header: Header::new(),
            cover_asset_id: None,
            asset_urls: Vec::new(),
            body: None,
        };
        assert!(record.add_asset_url("https://a/x.png"));
        assert!(!record.add_asset_url("https://a/x.png"));
        assert_eq!(record.asset_urls.len(), 1);
        assert_eq!(record.display_name(true), "blog - s");
        assert_eq!(record.display_name(false), "s");
    }
}
