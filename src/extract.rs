// src/extract.rs
// =============================================================================
// Turns a parsed HTML document into a title and the page's main prose.
//
// HtmlExtractor tries content roots in order (article, main, [role=main],
// then body), walks every match of the first candidate that yields any text,
// drops page chrome (scripts, navigation, headers, footers, forms) and emits
// one line per block element. Broken markup never fails: the HTML parser
// recovers, and a page with nothing usable yields an empty string.
//
// The caller parses the page once and hands the same Html to title(),
// main_text() and the link extractor.
// =============================================================================

use scraper::{ElementRef, Html, Node, Selector};

/// Titles longer than this are cut (counted in characters, not bytes).
pub const MAX_TITLE_CHARS: usize = 200;

/// Subtrees that never contribute to the main text.
const SKIPPED_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "svg",
    "template", "iframe", "button",
];

/// Elements that start a new line of output.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul",
    "ol", "dl", "dt", "dd", "pre", "blockquote", "table", "tr", "td", "th", "figcaption",
    "br", "hr",
];

pub trait Extractor {
    /// Page title, whitespace-collapsed and at most MAX_TITLE_CHARS long;
    /// empty when the page has no <title>.
    fn title(&self, document: &Html) -> String;

    /// Main text of the page; empty when nothing extractable is found.
    fn main_text(&self, document: &Html) -> String;
}

#[derive(Debug)]
pub struct HtmlExtractor {
    title: Selector,
    roots: Vec<Selector>,
}

impl HtmlExtractor {
    pub fn new() -> Self {
        // All selectors are constants, known to be valid
        Self {
            title: Selector::parse("title").expect("title selector"),
            roots: ["article", "main", "[role=main]", "body"]
                .iter()
                .map(|s| Selector::parse(s).expect("root selector"))
                .collect(),
        }
    }

    /// Text under every outermost match of `selector`, one block after another.
    ///
    /// A listing page with several <article> cards keeps all of them; an
    /// article nested in another one is only walked once, via its parent.
    fn text_under(&self, document: &Html, selector: &Selector) -> String {
        let mut collector = TextCollector::default();
        for root in document.select(selector) {
            let nested = root
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| selector.matches(&ancestor));
            if !nested {
                collector.walk(root);
                collector.break_line();
            }
        }
        collector.finish()
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for HtmlExtractor {
    fn title(&self, document: &Html) -> String {
        document
            .select(&self.title)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .map(|title| truncate_chars(&title, MAX_TITLE_CHARS))
            .unwrap_or_default()
    }

    fn main_text(&self, document: &Html) -> String {
        // An empty <article> shell must not hide the prose around it
        for selector in &self.roots {
            let text = self.text_under(document, selector);
            if !text.is_empty() {
                return text;
            }
        }

        let mut collector = TextCollector::default();
        collector.walk(document.root_element());
        collector.finish()
    }
}

#[derive(Default)]
struct TextCollector {
    lines: Vec<String>,
    current: String,
}

impl TextCollector {
    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.current.push_str(text),
                Node::Element(el) => {
                    let name = el.name();
                    if SKIPPED_TAGS.contains(&name) {
                        continue;
                    }

                    let block = BLOCK_TAGS.contains(&name);
                    if block {
                        self.break_line();
                    }
                    if let Some(child_ref) = ElementRef::wrap(child) {
                        self.walk(child_ref);
                    }
                    if block {
                        self.break_line();
                    }
                }
                _ => {}
            }
        }
    }

    fn break_line(&mut self) {
        let line = collapse_whitespace(&self.current);
        if !line.is_empty() {
            self.lines.push(line);
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.lines.join("\n")
    }
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}
