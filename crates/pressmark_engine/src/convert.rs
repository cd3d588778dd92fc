//! Rich-text bodies to markdown.
//!
//! [`MarkdownTranslator`] hands the prepared body to `html2md` together with
//! a [`RuleSet`]: tag handlers registered per element name that replace the
//! crate's built-in handling for that tag.

use std::collections::HashMap;

use html2md::{parse_html_custom, TagHandler, TagHandlerFactory};
use once_cell::sync::Lazy;
use pressmark_core::ExportConfig;
use regex::{Captures, Regex};

use crate::rules;

pub trait Converter: Send + Sync {
    fn to_markdown(&self, html: &str) -> String;
}

/// Builds a fresh handler for one occurrence of a tag.
pub type Rule = fn() -> Box<dyn TagHandler>;

struct RuleFactory(Rule);

impl TagHandlerFactory for RuleFactory {
    fn instantiate(&self) -> Box<dyn TagHandler> {
        (self.0)()
    }
}

#[derive(Clone, Default)]
pub struct RuleSet {
    rules: HashMap<String, Rule>,
}

impl RuleSet {
    /// No overrides: every tag gets the `html2md` default.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Code fences with a language hint, raw embeds, quotes, figures,
    /// the read-more separator and dropped scripts.
    pub fn standard() -> Self {
        let mut set = Self::empty();
        set.insert("pre", rules::fence);
        set.insert("iframe", rules::embed);
        set.insert("blockquote", rules::quote);
        set.insert("figure", rules::container);
        set.insert("figcaption", rules::container);
        set.insert(rules::MORE_TAG, rules::more);
        for tag in ["script", "style", "noscript"] {
            set.insert(tag, rules::drop);
        }
        set
    }

    /// Adds or replaces the rule for `tag`.
    pub fn with_rule(mut self, tag: &str, rule: Rule) -> Self {
        self.insert(tag, rule);
        self
    }

    pub fn get(&self, tag: &str) -> Option<Rule> {
        self.rules.get(&tag.to_ascii_lowercase()).copied()
    }

    fn insert(&mut self, tag: &str, rule: Rule) {
        self.rules.insert(tag.to_ascii_lowercase(), rule);
    }

    fn factories(&self) -> HashMap<String, Box<dyn TagHandlerFactory>> {
        self.rules
            .iter()
            .map(|(tag, rule)| {
                let factory: Box<dyn TagHandlerFactory> = Box::new(RuleFactory(*rule));
                (tag.clone(), factory)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    /// When set, `<img src>` values are rewritten to `{prefix}{filename}`.
    pub image_prefix: Option<String>,
}

impl TranslateOptions {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            image_prefix: config
                .save_scraped_images
                .then(|| format!("/{}/images/", config.assets)),
        }
    }
}

static DOUBLE_LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\r?\n){2}").expect("valid line break pattern"));

static IMAGE_SOURCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(<img[^>]*src=").*?([^/"]+\.(?:gif|jpe?g|png|svg|webp))("[^>]*>)"#)
        .expect("valid image source pattern")
});

static LANGUAGE_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<!--\s*wp:[^>]*?"language"\s*:\s*"([^"]+)"[^>]*?-->\s*<pre(\s|>)"#)
        .expect("valid language comment pattern")
});

static MORE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--\s*more\b[^>]*-->").expect("valid more comment pattern"));

pub struct MarkdownTranslator {
    rules: RuleSet,
    options: TranslateOptions,
}

impl MarkdownTranslator {
    pub fn new(options: TranslateOptions) -> Self {
        Self::with_rules(RuleSet::standard(), options)
    }

    pub fn with_rules(rules: RuleSet, options: TranslateOptions) -> Self {
        Self { rules, options }
    }
}

impl Default for MarkdownTranslator {
    fn default() -> Self {
        Self::new(TranslateOptions::default())
    }
}

impl Converter for MarkdownTranslator {
    fn to_markdown(&self, html: &str) -> String {
        let prepared = prepare_body(html, &self.options);
        tidy(&parse_html_custom(&prepared, &self.rules.factories()))
    }
}

/// Source-level rewrites applied before the markup is parsed.
pub fn prepare_body(html: &str, options: &TranslateOptions) -> String {
    // Paragraphs in exports are often bare double line breaks.
    let mut body = DOUBLE_LINE_BREAK
        .replace_all(html, "\n<div></div>\n")
        .into_owned();

    if let Some(prefix) = options.image_prefix.as_deref() {
        body = IMAGE_SOURCE
            .replace_all(&body, |caps: &Captures<'_>| {
                format!("{}{}{}{}", &caps[1], prefix, &caps[2], &caps[3])
            })
            .into_owned();
    }

    body = LANGUAGE_COMMENT
        .replace_all(&body, |caps: &Captures<'_>| {
            format!("<pre data-language=\"{}\"{}", &caps[1], &caps[2])
        })
        .into_owned();

    // Comments never reach the tag handlers, so the separator becomes an element.
    let placeholder = format!("<{0}></{0}>", rules::MORE_TAG);
    MORE_COMMENT
        .replace_all(&body, placeholder.as_str())
        .into_owned()
}

/// Normalizes the assembled markdown line by line. Fenced code is left alone.
fn tidy(markdown: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_fence = false;

    for raw in markdown.lines() {
        if raw.trim_start().starts_with("```") {
            in_fence = !in_fence;
            lines.push(raw.trim().to_string());
            continue;
        }
        if in_fence {
            lines.push(raw.to_string());
            continue;
        }

        // A single leading space is collapsed whitespace from the source.
        let line = match raw.strip_prefix(' ') {
            Some(rest) if !rest.starts_with(' ') => rest,
            _ => raw,
        };
        let content = line.trim_end();
        if content.is_empty() {
            if lines.last().is_some_and(|last| !last.is_empty()) {
                lines.push(String::new());
            }
        } else if line.ends_with("  ") {
            lines.push(format!("{content}  "));
        } else {
            lines.push(content.to_string());
        }
    }

    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_line_pairs_become_paragraph_breaks() {
        let prepared = prepare_body("One\n\nTwo\r\n\r\nThree", &TranslateOptions::default());
        assert_eq!(prepared, "One\n<div></div>\nTwo\n<div></div>\nThree");
    }

    #[test]
    fn image_sources_point_into_assets_when_prefixed() {
        let options = TranslateOptions {
            image_prefix: Some("/assets/images/".into()),
        };
        let prepared = prepare_body(
            r#"<img class="x" src="https://ex.com/wp-content/uploads/2022/12/cat.JPG" alt="cat">"#,
            &options,
        );
        assert_eq!(
            prepared,
            r#"<img class="x" src="/assets/images/cat.JPG" alt="cat">"#
        );
    }

    #[test]
    fn language_comment_moves_onto_pre() {
        let html = "<!-- wp:code {\"language\":\"rust\"} -->\n<pre class=\"wp-block-code\"><code>fn main() {}</code></pre>";
        let prepared = prepare_body(html, &TranslateOptions::default());
        assert!(prepared.starts_with("<pre data-language=\"rust\" class=\"wp-block-code\">"));
    }

    #[test]
    fn tidy_keeps_hard_breaks_and_fences() {
        let raw = "\n\n one  \n two \n\n\n\n```\n  indented\n\n\n```\n";
        assert_eq!(tidy(raw), "one  \ntwo\n\n```\n  indented\n\n\n```");
    }

    #[test]
    fn more_comment_becomes_placeholder() {
        let prepared = prepare_body("<p>a</p><!--more--><p>b</p>", &TranslateOptions::default());
        assert_eq!(prepared, "<p>a</p><wp-more></wp-more><p>b</p>");
    }

    /// Upper-cases everything rendered inside the element.
    #[derive(Default)]
    struct Shout {
        start: usize,
    }

    impl TagHandler for Shout {
        fn handle(&mut self, _tag: &html2md::Handle, printer: &mut html2md::StructuredPrinter) {
            self.start = printer.data.len();
        }

        fn after_handle(&mut self, printer: &mut html2md::StructuredPrinter) {
            let inner = printer.data.split_off(self.start);
            printer.append_str(&inner.to_uppercase());
        }
    }

    fn shout() -> Box<dyn TagHandler> {
        Box::new(Shout::default())
    }

    #[test]
    fn custom_rule_replaces_default() {
        let translator = MarkdownTranslator::with_rules(
            RuleSet::standard().with_rule("EM", shout),
            TranslateOptions::default(),
        );
        assert_eq!(translator.to_markdown("<p>say <em>hi</em></p>"), "say HI");
        assert!(translator.rules.get("em").is_some());
    }

    #[test]
    fn empty_rule_set_uses_crate_defaults() {
        let translator =
            MarkdownTranslator::with_rules(RuleSet::empty(), TranslateOptions::default());
        assert_eq!(
            translator.to_markdown("<p>say <em>hi</em></p>"),
            "say *hi*"
        );
    }
}
