//! Queryable in-memory HTML for one extraction call.
//!
//! `scraper::Html` is not `Send`, so a [`ParsedDocument`] is built only after
//! every fetch await has completed and is dropped before the call returns.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::normalize::clean_text;
use crate::rules::Locator;

static JSON_LD: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script[type='application/ld+json']").expect("valid JSON-LD selector")
});
static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta").expect("valid meta selector"));

pub struct ParsedDocument {
    html: Html,
    url: Url,
}

impl ParsedDocument {
    /// Parses `body` as an HTML document fetched from `url`.
    #[must_use]
    pub fn parse(body: &str, url: Url) -> Self {
        Self {
            html: Html::parse_document(body),
            url,
        }
    }

    /// The final URL the document was retrieved from, after redirects.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Every raw value `locator` yields, in document order.
    ///
    /// Text locators return the element's whitespace-collapsed text; attribute
    /// locators return the attribute value. Empty values are skipped.
    #[must_use]
    pub fn locate(&self, locator: &Locator) -> Vec<String> {
        let Some(selector) = locator.selector() else {
            return Vec::new();
        };

        self.html
            .select(selector)
            .filter_map(|el| match locator.attribute() {
                Some(name) => el.value().attr(name).map(clean_text),
                None => Some(element_text(el)),
            })
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Text of every element matching `css`. Invalid selectors yield nothing.
    #[must_use]
    pub fn texts(&self, css: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse(css) else {
            return Vec::new();
        };
        self.html
            .select(&selector)
            .map(element_text)
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Content of the first `<meta>` whose `property`, `name`, or `itemprop`
    /// equals `key` (case-insensitive).
    #[must_use]
    pub fn meta_content(&self, key: &str) -> Option<String> {
        self.html.select(&META).find_map(|el| {
            let v = el.value();
            let matches = ["property", "name", "itemprop"]
                .iter()
                .filter_map(|attr| v.attr(attr))
                .any(|k| k.eq_ignore_ascii_case(key));
            if !matches {
                return None;
            }
            v.attr("content").map(clean_text).filter(|c| !c.is_empty())
        })
    }

    /// Parsed bodies of every `application/ld+json` script. Blocks that are
    /// not valid JSON are skipped.
    #[must_use]
    pub fn json_ld(&self) -> Vec<serde_json::Value> {
        self.html
            .select(&JSON_LD)
            .filter_map(|el| {
                let raw = el.text().collect::<String>();
                match serde_json::from_str::<serde_json::Value>(raw.trim()) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::debug!(url = %self.url, error = %e, "skipping malformed JSON-LD block");
                        None
                    }
                }
            })
            .collect()
    }

    /// Text of the parent of the first `<h1>`, which on most product pages
    /// holds the price block alongside the title.
    #[must_use]
    pub fn h1_neighbourhood(&self) -> Option<String> {
        let selector = Selector::parse("h1").ok()?;
        let h1 = self.html.select(&selector).next()?;
        let parent = h1.parent().and_then(ElementRef::wrap)?;
        Some(element_text(parent))
    }

    /// Resolves a possibly-relative URL against the document URL.
    #[must_use]
    pub fn absolutize(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with("data:") {
            return None;
        }
        self.url.join(trimmed).ok().map(String::from)
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<Vec<_>>().join(" "))
}
