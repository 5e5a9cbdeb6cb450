//! Read-only queries over parsed page markup.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static META: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta").unwrap());
static SCRIPT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("script").unwrap());
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// Parsed page markup exposing only the queries date detection needs.
pub struct PageDocument {
    html: Html,
}

impl PageDocument {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// Trimmed text of the first `tag` element, if it has any.
    pub fn first_text(&self, tag: &str) -> Option<String> {
        let selector = Selector::parse(tag).ok()?;
        let element = self.html.select(&selector).next()?;
        let text = element_text(&element);
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// `content` of the first `<meta>` whose `attr` equals `value`.
    ///
    /// An empty `content` counts as absent.
    pub fn meta_content(&self, attr: &str, value: &str) -> Option<String> {
        self.html
            .select(&META)
            .find(|el| el.value().attr(attr) == Some(value))
            .and_then(|el| el.value().attr("content"))
            .filter(|content| !content.is_empty())
            .map(str::to_string)
    }

    /// Raw text of every `<script type=...>` block, in document order.
    pub fn script_blocks(&self, script_type: &str) -> Vec<String> {
        self.html
            .select(&SCRIPT)
            .filter(|el| {
                el.value()
                    .attr("type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case(script_type))
            })
            .map(|el| element_text(&el))
            .collect()
    }

    /// Concatenated text content of `<body>`.
    pub fn body_text(&self) -> String {
        self.html
            .select(&BODY)
            .next()
            .map(|body| element_text(&body))
            .unwrap_or_default()
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}
