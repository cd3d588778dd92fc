//! Tag handlers registered by [`crate::RuleSet::standard`] on top of the
//! `html2md` defaults.

use html2md::common::get_tag_attr;
use html2md::containers::ContainerHandler;
use html2md::dummy::IdentityHandler;
use html2md::{Handle, NodeData, StructuredPrinter, TagHandler};

/// Element that stands in for the `<!--more-->` comment.
pub const MORE_TAG: &str = "wp-more";

pub fn fence() -> Box<dyn TagHandler> {
    Box::new(FenceHandler)
}

pub fn embed() -> Box<dyn TagHandler> {
    Box::new(EmbedHandler)
}

pub fn quote() -> Box<dyn TagHandler> {
    Box::new(QuoteHandler::default())
}

pub fn container() -> Box<dyn TagHandler> {
    Box::new(ContainerHandler)
}

pub fn more() -> Box<dyn TagHandler> {
    Box::new(MoreHandler)
}

pub fn drop() -> Box<dyn TagHandler> {
    Box::new(DropHandler)
}

/// Fenced code block. Text below `<pre>` is copied verbatim by `html2md`.
struct FenceHandler;

impl TagHandler for FenceHandler {
    fn handle(&mut self, tag: &Handle, printer: &mut StructuredPrinter) {
        let language = code_language(tag).unwrap_or_default();
        printer.append_str(&format!("\n\n```{language}\n"));
    }

    fn after_handle(&mut self, printer: &mut StructuredPrinter) {
        if !printer.data.ends_with('\n') {
            printer.insert_newline();
        }
        printer.append_str("```\n\n");
    }
}

/// `data-language` on the `<pre>`, else a `language-*` class on it or its `<code>`.
fn code_language(pre: &Handle) -> Option<String> {
    if let Some(language) = get_tag_attr(pre, "data-language") {
        return Some(language);
    }
    let code = pre
        .children
        .borrow()
        .iter()
        .find(|child| match child.data {
            NodeData::Element { ref name, .. } => name.local.to_string() == "code",
            _ => false,
        })
        .cloned();
    std::iter::once(pre.clone())
        .chain(code)
        .filter_map(|node| get_tag_attr(&node, "class"))
        .find_map(|class| {
            class
                .split_whitespace()
                .find_map(|c| c.strip_prefix("language-"))
                .map(str::to_string)
        })
}

/// Embeds are kept as raw markup in their own paragraph.
struct EmbedHandler;

impl TagHandler for EmbedHandler {
    fn handle(&mut self, tag: &Handle, printer: &mut StructuredPrinter) {
        printer.append_str("\n\n");
        IdentityHandler.handle(tag, printer);
    }

    fn after_handle(&mut self, printer: &mut StructuredPrinter) {
        printer.append_str("\n\n");
    }

    fn skip_descendants(&self) -> bool {
        true
    }
}

/// Prefixes every rendered line with `> `, one blank quoted line between paragraphs.
#[derive(Default)]
struct QuoteHandler {
    start: usize,
}

impl TagHandler for QuoteHandler {
    fn handle(&mut self, _tag: &Handle, printer: &mut StructuredPrinter) {
        self.start = printer.data.len();
    }

    fn after_handle(&mut self, printer: &mut StructuredPrinter) {
        let inner = printer.data.split_off(self.start);
        let mut quoted: Vec<String> = Vec::new();
        for line in inner.trim().lines().map(str::trim_end) {
            if line.is_empty() {
                if quoted.last().is_some_and(|last| last != ">") {
                    quoted.push(">".to_string());
                }
            } else {
                quoted.push(format!("> {line}"));
            }
        }
        printer.append_str(&format!("\n\n{}\n\n", quoted.join("\n")));
    }
}

struct MoreHandler;

impl TagHandler for MoreHandler {
    fn handle(&mut self, _tag: &Handle, printer: &mut StructuredPrinter) {
        printer.append_str("\n\n<!--more-->\n\n");
    }

    fn after_handle(&mut self, _printer: &mut StructuredPrinter) {}

    fn skip_descendants(&self) -> bool {
        true
    }
}

/// Removes the element together with its text.
struct DropHandler;

impl TagHandler for DropHandler {
    fn handle(&mut self, _tag: &Handle, _printer: &mut StructuredPrinter) {}

    fn after_handle(&mut self, _printer: &mut StructuredPrinter) {}

    fn skip_descendants(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::convert::{Converter, MarkdownTranslator};
    use pretty_assertions::assert_eq;

    fn md(html: &str) -> String {
        MarkdownTranslator::default().to_markdown(html)
    }

    #[test]
    fn emphasis_and_links_use_crate_defaults() {
        assert_eq!(
            md(r#"<p>Some <strong>bold</strong> and <a href="https://ex.com/a">a link</a> <img src="/x.png" alt="X"></p>"#),
            "Some **bold** and [a link](https://ex.com/a) ![X](/x.png)"
        );
    }

    #[test]
    fn lists_render_one_item_per_line() {
        assert_eq!(md("<ul><li>lentils</li><li>water</li></ul>"), "* lentils\n* water");
        assert_eq!(md("<ol><li>one</li><li>two</li></ol>"), "1. one\n2. two");
    }

    #[test]
    fn quotes_are_prefixed() {
        assert_eq!(
            md("<blockquote><p>first</p><p>second</p></blockquote>"),
            "> first\n>\n> second"
        );
    }

    #[test]
    fn code_fence_keeps_raw_text_and_language() {
        assert_eq!(
            md("<pre class=\"language-rust\"><code>let a = 1;\n  let b = a &lt; 2;\n</code></pre>"),
            "```rust\nlet a = 1;\n  let b = a < 2;\n```"
        );
        assert_eq!(
            md("<pre data-language=\"python\"><code>print(1)</code></pre>"),
            "```python\nprint(1)\n```"
        );
    }

    #[test]
    fn iframes_are_kept_and_scripts_dropped() {
        let out = md(r#"<p>Watch</p><iframe src="https://video.example/1"></iframe><script>alert(1)</script>"#);
        assert_eq!(out, "Watch\n\n<iframe src=\"https://video.example/1\"></iframe>");
    }

    #[test]
    fn more_separator_survives() {
        assert_eq!(md("<p>Intro</p><!--more--><p>Rest</p>"), "Intro\n\n<!--more-->\n\nRest");
    }

    #[test]
    fn figure_caption_and_rule() {
        assert_eq!(
            md(r#"<figure><img src="a.png" alt=""><figcaption>Caption</figcaption></figure><hr>"#),
            "![](a.png)\n\nCaption\n\n---"
        );
    }
}
