//! Extractor: heuristic job-description lookup over a page's DOM.
//!
//! Selectors run from most to least specific. The first element whose text
//! clears [`MIN_DESCRIPTION_CHARS`] wins; a specific block that is too short is
//! skipped in favour of a longer generic one. When nothing qualifies the whole
//! page's visible text is used.

use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::job::{normalize_job_text, ExtractedJob, JobSource};

pub const MIN_DESCRIPTION_CHARS: usize = 200;

pub const DESCRIPTION_SELECTORS: &[&str] = &[
    r#"[class*="job-description_wrap"]"#,
    r#"[class*="job-description"]"#,
    r#"[class*="jobDescription"]"#,
    r#"[id*="job-description"]"#,
    r#"[class*="description"]"#,
    "article",
    r#"[role="main"]"#,
    "main",
];

/// Elements whose text is never rendered.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// A page as the browser shim last reported it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    /// Falls back to the document's `<title>` when absent.
    #[serde(default)]
    pub title: Option<String>,
    pub html: String,
}

pub fn extract(page: &PageSnapshot) -> ExtractedJob {
    extract_with(page, DESCRIPTION_SELECTORS, MIN_DESCRIPTION_CHARS)
}

/// [`extract`] with an explicit selector list and threshold.
pub fn extract_with(page: &PageSnapshot, selectors: &[&str], min_chars: usize) -> ExtractedJob {
    let document = Html::parse_document(&page.html);

    let raw_text = find_description(&document, selectors, min_chars).unwrap_or_else(|| {
        debug!("No selector matched on {}, using full page text", page.url);
        page_text(&document)
    });

    let title = page
        .title
        .clone()
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| document_title(&document));

    ExtractedJob::new(page.url.clone(), title, &raw_text, JobSource::Dom)
}

fn find_description(document: &Html, selectors: &[&str], min_chars: usize) -> Option<String> {
    for selector_str in selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            debug!("Skipping unparsable selector {selector_str}");
            continue;
        };
        for element in document.select(&selector) {
            let text = visible_text(element);
            if normalize_job_text(&text).chars().count() > min_chars {
                debug!("Description matched by {selector_str}");
                return Some(text);
            }
        }
    }
    None
}

/// Text of the `<body>`, or of the whole document when there is none.
fn page_text(document: &Html) -> String {
    let body = Selector::parse("body").ok();
    match body.as_ref().and_then(|s| document.select(s).next()) {
        Some(body) => visible_text(body),
        None => visible_text(document.root_element()),
    }
}

/// Descendant text, skipping script-like subtrees, with text nodes joined by
/// spaces so adjacent blocks do not run together.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) if HIDDEN_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

fn document_title(document: &Html) -> String {
    Selector::parse("title")
        .ok()
        .and_then(|s| {
            document
                .select(&s)
                .next()
                .map(|t| t.text().collect::<String>())
        })
        .map(|title| title.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}
