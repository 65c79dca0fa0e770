// src/core/scanner/content_scanner.rs

use crate::core::models::{ExtractedContent, Form, Input};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::hash::Hash;
use tracing::debug;

// Statically compiled selectors and patterns, shared by every worker.
static SEL_ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static SEL_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static SEL_FORM: Lazy<Selector> = Lazy::new(|| Selector::parse("form").unwrap());
static SEL_INPUT: Lazy<Selector> = Lazy::new(|| Selector::parse("input").unwrap());
static SEL_SCRIPT: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());
static RE_CSRF_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[xc]srf|token").unwrap());

/// An insertion-ordered set: the vector keeps first-seen order, the hash set
/// answers membership.
struct OrderedSet<T> {
    items: Vec<T>,
    seen: HashSet<T>,
}

impl<T: Clone + Eq + Hash> OrderedSet<T> {
    fn new() -> Self {
        Self { items: Vec::new(), seen: HashSet::new() }
    }

    fn insert(&mut self, item: T) {
        if self.seen.insert(item.clone()) {
            self.items.push(item);
        }
    }

    fn into_vec(self) -> Vec<T> {
        self.items
    }
}

/// Extracts links, title, forms and script sources from an HTML body.
///
/// Parsing is tolerant: malformed markup and missing attributes never raise,
/// they simply produce empty values. Bytes that are not valid UTF-8 are
/// decoded lossily. The whole body is parsed once and every signal is read
/// from the same tree, so the same input always yields the same output.
///
/// # Arguments
/// * `body` - The fully buffered response body.
///
/// # Returns
/// An `ExtractedContent` with deduplicated links, scripts and forms.
pub fn extract_content(body: &[u8]) -> ExtractedContent {
    let text = String::from_utf8_lossy(body);
    let document = Html::parse_document(&text);

    let content = ExtractedContent {
        links: extract_links(&document),
        title: extract_title(&document),
        forms: extract_forms(&document),
        scripts: extract_scripts(&document),
    };

    debug!(
        links = content.links.len(),
        forms = content.forms.len(),
        scripts = content.scripts.len(),
        "Content extraction finished."
    );
    content
}

fn extract_links(doc: &Html) -> Vec<String> {
    collect_attr(doc, &SEL_ANCHOR, "href")
}

fn extract_scripts(doc: &Html) -> Vec<String> {
    collect_attr(doc, &SEL_SCRIPT, "src")
}

/// Collects `attr` from every element matching `selector`, in document order,
/// keeping the first occurrence of each exact value.
fn collect_attr(doc: &Html, selector: &Selector, attr: &str) -> Vec<String> {
    let mut values = OrderedSet::new();
    for el in doc.select(selector) {
        if let Some(value) = el.value().attr(attr) {
            values.insert(value.to_string());
        }
    }
    values.into_vec()
}

/// Text of the first `<title>`'s immediate text child, trimmed.
fn extract_title(doc: &Html) -> String {
    doc.select(&SEL_TITLE)
        .next()
        .and_then(|title| title.children().find_map(|node| node.value().as_text().map(|t| t.trim().to_string())))
        .unwrap_or_default()
}

fn extract_forms(doc: &Html) -> Vec<Form> {
    let mut forms = OrderedSet::new();
    for el in doc.select(&SEL_FORM) {
        forms.insert(build_form(el));
    }
    forms.into_vec()
}

fn build_form(el: ElementRef<'_>) -> Form {
    let attr = |el: &ElementRef<'_>, name: &str| el.value().attr(name).unwrap_or_default().to_string();

    let mut form = Form {
        csrf: false,
        method: attr(&el, "method"),
        action: attr(&el, "action"),
        inputs: Vec::new(),
    };

    for input_el in el.select(&SEL_INPUT) {
        let input = Input {
            kind: attr(&input_el, "type"),
            name: attr(&input_el, "name"),
            value: attr(&input_el, "value"),
        };
        if is_csrf_name(&input.name) {
            form.csrf = true;
        }
        form.inputs.push(input);
    }
    form
}

/// The CSRF heuristic: a field name containing "csrf", "xsrf" or "token",
/// in any case.
pub fn is_csrf_name(name: &str) -> bool {
    RE_CSRF_NAME.is_match(name)
}
