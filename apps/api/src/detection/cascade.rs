//! Detection cascade: ordered strategies, first normalized date wins.
//!
//! Machine-authored signals (meta tags, JSON-LD) are trusted before free text,
//! and free text before the transport's `Last-Modified`, which tracks server
//! caching rather than authorship.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::detection::date::normalize;
use crate::detection::markup::PageDocument;
use crate::detection::Detection;
use crate::fetch::{FetchedPage, ResponseHeaders};
use crate::models::term::{DetectionMethod, UNKNOWN};

/// Metadata field names, highest priority first.
const META_FIELDS: [&str; 6] = [
    "article:modified_time",
    "last-modified",
    "og:updated_time",
    "revised",
    "date",
    "article:published_time",
];

const LD_JSON_TYPE: &str = "application/ld+json";
const STRUCTURED_DATE_KEYS: [&str; 2] = ["dateModified", "datePublished"];

const TEXT_SCAN_CHARS: usize = 2000;
const TEXT_KEYWORDS: [&str; 11] = [
    "last updated",
    "last modified",
    "effective date",
    "last revised",
    "updated on",
    "modified",
    "revision date",
    "date updated",
    "effective as of",
    "last amended",
    "version date",
];

/// One regex per keyword, in keyword priority order. Captures up to 50
/// characters on the same line after the keyword and any `:`/whitespace.
static KEYWORD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TEXT_KEYWORDS
        .iter()
        .map(|kw| {
            Regex::new(&format!(r"(?i){}[:\s]*([^\n]{{0,50}})", regex::escape(kw))).unwrap()
        })
        .collect()
});

const LAST_MODIFIED_HEADER: &str = "last-modified";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    MetaTag,
    StructuredData,
    TextParsing,
    HttpHeader,
}

const CASCADE: [Strategy; 4] = [
    Strategy::MetaTag,
    Strategy::StructuredData,
    Strategy::TextParsing,
    Strategy::HttpHeader,
];

impl Strategy {
    fn method(self) -> DetectionMethod {
        match self {
            Strategy::MetaTag => DetectionMethod::MetaTag,
            Strategy::StructuredData => DetectionMethod::StructuredData,
            Strategy::TextParsing => DetectionMethod::TextParsing,
            Strategy::HttpHeader => DetectionMethod::HttpHeader,
        }
    }

    fn run(self, doc: &PageDocument, headers: &ResponseHeaders) -> Option<String> {
        match self {
            Strategy::MetaTag => from_meta_tags(doc),
            Strategy::StructuredData => from_structured_data(doc),
            Strategy::TextParsing => from_text(doc),
            Strategy::HttpHeader => from_headers(headers),
        }
    }
}

/// Runs the full cascade over a fetched page. Never fails; an undetectable
/// date resolves to `Unknown` / `not-detected`.
pub fn detect(page: &FetchedPage) -> Detection {
    let doc = PageDocument::parse(&page.body);
    detect_document(&doc, &page.headers)
}

pub fn detect_document(doc: &PageDocument, headers: &ResponseHeaders) -> Detection {
    let title = extract_title(doc);

    CASCADE
        .iter()
        .find_map(|strategy| {
            strategy
                .run(doc, headers)
                .map(|date| Detection::found(title.clone(), date, strategy.method()))
        })
        .unwrap_or_else(|| Detection::not_detected(title))
}

fn extract_title(doc: &PageDocument) -> String {
    doc.first_text("title")
        .or_else(|| doc.first_text("h1"))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn from_meta_tags(doc: &PageDocument) -> Option<String> {
    META_FIELDS.iter().find_map(|field| {
        doc.meta_content("property", field)
            .or_else(|| doc.meta_content("name", field))
            .and_then(|content| normalize(&content))
    })
}

fn from_structured_data(doc: &PageDocument) -> Option<String> {
    doc.script_blocks(LD_JSON_TYPE)
        .iter()
        .enumerate()
        .find_map(|(idx, raw)| match serde_json::from_str::<Value>(raw) {
            Ok(data) => date_from_structured(&data),
            Err(e) => {
                debug!("Skipping malformed JSON-LD block #{idx}: {e}");
                None
            }
        })
}

fn date_from_structured(data: &Value) -> Option<String> {
    let items = match data {
        Value::Array(items) => items.as_slice(),
        single => std::slice::from_ref(single),
    };

    items.iter().find_map(|item| {
        STRUCTURED_DATE_KEYS
            .iter()
            .filter_map(|key| item.get(key).and_then(Value::as_str))
            .find_map(normalize)
    })
}

fn from_text(doc: &PageDocument) -> Option<String> {
    let text: String = doc.body_text().chars().take(TEXT_SCAN_CHARS).collect();

    KEYWORD_PATTERNS.iter().find_map(|re| {
        re.captures(&text)
            .and_then(|caps| caps.get(1))
            .and_then(|fragment| normalize(fragment.as_str()))
    })
}

fn from_headers(headers: &ResponseHeaders) -> Option<String> {
    headers
        .get(LAST_MODIFIED_HEADER)
        .and_then(|value| normalize(value))
}
