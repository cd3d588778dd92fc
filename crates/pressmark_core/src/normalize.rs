use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("percent-encoded value is not valid utf-8: {0:?}")]
    InvalidEncoding(String),
}

pub fn percent_decode(raw: &str) -> Result<String, NormalizeError> {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| NormalizeError::InvalidEncoding(raw.to_string()))
}

/// Titles starting with a tag are replaced by a slug-derived title.
pub fn is_markup_title(raw: &str) -> bool {
    raw.starts_with('<')
}

/// Only the first hyphen becomes a space; every word starting with an ASCII
/// word character gets an upper-case first letter and a lower-cased rest.
pub fn title_from_slug(slug: &str) -> String {
    let spaced = slug.replacen('-', " ", 1);
    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    let mut capitalizing = false;
    for ch in spaced.chars() {
        if ch.is_whitespace() {
            out.push(ch);
            at_word_start = true;
            capitalizing = false;
            continue;
        }
        if at_word_start {
            at_word_start = false;
            capitalizing = ch.is_ascii_alphanumeric() || ch == '_';
            if capitalizing {
                out.extend(ch.to_uppercase());
                continue;
            }
        }
        if capitalizing {
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn normalize_author(raw: &str) -> String {
    raw.to_lowercase().replace(' ', "-")
}

/// Splits a raw creator string on the literal `" and "` separator.
pub fn split_creators(raw: &str) -> Vec<String> {
    raw.split(" and ").map(normalize_author).collect()
}
