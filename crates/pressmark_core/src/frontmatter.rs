use crate::record::keys;
use crate::{Header, HeaderValue};

const DELIMITER: &str = "---";

/// Renders the header block followed by the body, if any.
///
/// Empty lists are left out. Text values get `"` escaped; title and
/// description are additionally wrapped in double quotes.
pub fn build_markdown_document(header: &Header, body: Option<&str>) -> String {
    let mut doc = String::new();
    doc.push_str(DELIMITER);
    doc.push('\n');

    for (key, value) in header.iter() {
        let rendered = match value {
            HeaderValue::List(items) if items.is_empty() => continue,
            HeaderValue::List(items) => items
                .iter()
                .fold(String::new(), |list, item| format!("{list}\n  - {item}")),
            HeaderValue::Text(text) => {
                let escaped = text.replace('"', "\\\"");
                if key == keys::TITLE || key == keys::DESCRIPTION {
                    format!("\"{escaped}\"")
                } else {
                    escaped
                }
            }
        };
        doc.push_str(&format!("{key}: {rendered}\n"));
    }

    match body.filter(|b| !b.is_empty()) {
        Some(body) => doc.push_str(&format!("{DELIMITER}\n\n{body}\n")),
        None => {
            doc.push_str(DELIMITER);
            doc.push('\n');
        }
    }
    doc
}
