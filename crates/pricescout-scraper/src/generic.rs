//! Store-agnostic extraction heuristics for pages with no registered rule.
//!
//! Signals are consulted in priority order: Open Graph / product meta tags,
//! schema.org microdata, schema.org JSON-LD, and finally price-looking text
//! next to the page's `<h1>`. Every field is optional; the orchestrator
//! decides which gaps are fatal.
//!
//! Registered stores only backfill from [`extract_structured`], which never
//! reads a price out of free text.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::cascade::{extract_field, non_empty};
use crate::document::ParsedDocument;
use crate::normalize::{currency_code, default_price_parser, parse_availability, parse_price};
use crate::rules::Locator;

static PRICE_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[$€£¥₹]\s?\d[\d.,]*)|(?:\d[\d.,]*\s?[€£])").expect("valid price regex")
});

static MICRODATA_PRICE: [Locator; 2] = [
    Locator::attr("[itemprop='price']", "content"),
    Locator::text("[itemprop='price']"),
];
static MICRODATA_CURRENCY: [Locator; 2] = [
    Locator::attr("[itemprop='priceCurrency']", "content"),
    Locator::text("[itemprop='priceCurrency']"),
];
static MICRODATA_IMAGE: [Locator; 3] = [
    Locator::attr("[itemprop='image']", "content"),
    Locator::attr("[itemprop='image']", "src"),
    Locator::attr("[itemprop='image']", "href"),
];
static MICRODATA_AVAILABILITY: [Locator; 2] = [
    Locator::attr("[itemprop='availability']", "href"),
    Locator::attr("[itemprop='availability']", "content"),
];
static HEADING: [Locator; 1] = [Locator::text("h1")];
static PRICE_CLASS: [Locator; 2] = [
    Locator::text("[class*='price']"),
    Locator::text("[id*='price']"),
];

/// Field values found on a page before defaults are applied. Every field may
/// be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialSnapshot {
    pub price: Option<f64>,
    /// The raw text the price was parsed from, kept for currency detection.
    pub price_text: Option<String>,
    pub currency: Option<String>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub in_stock: Option<bool>,
}

impl PartialSnapshot {
    /// Fills every missing field from `fallback`, keeping values already set.
    /// The price and its raw text always travel together.
    #[must_use]
    pub fn or_fill(self, fallback: PartialSnapshot) -> Self {
        let (price, price_text) = match self.price {
            Some(price) => (Some(price), self.price_text),
            None => (fallback.price, fallback.price_text),
        };
        Self {
            price,
            price_text,
            currency: self.currency.or(fallback.currency),
            title: self.title.or(fallback.title),
            image: self.image.or(fallback.image),
            in_stock: self.in_stock.or(fallback.in_stock),
        }
    }
}

/// The subset of a schema.org `Product` node the heuristics use.
#[derive(Debug, Default)]
struct StructuredProduct {
    name: Option<String>,
    image: Option<String>,
    price: Option<String>,
    currency: Option<String>,
    availability: Option<String>,
}

/// Which price signals a heuristic pass may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PriceSignals {
    /// Meta tags, microdata and JSON-LD only.
    Structured,
    /// Structured signals, then currency-marked text near the `<h1>` or in
    /// price-classed elements.
    All,
}

/// Applies every store-agnostic heuristic to `document`.
#[must_use]
pub fn extract_generic(document: &ParsedDocument) -> PartialSnapshot {
    extract_with(document, PriceSignals::All)
}

/// Like [`extract_generic`], but the price comes only from machine-readable
/// product metadata.
#[must_use]
pub fn extract_structured(document: &ParsedDocument) -> PartialSnapshot {
    extract_with(document, PriceSignals::Structured)
}

fn extract_with(document: &ParsedDocument, signals: PriceSignals) -> PartialSnapshot {
    let structured = find_structured_product(document);

    let (price, price_text) = structured_price(document, &structured)
        .or_else(|| match signals {
            PriceSignals::All => text_price(document),
            PriceSignals::Structured => None,
        })
        .unzip();

    let title = extract_field(document, &HEADING, non_empty)
        .or_else(|| document.meta_content("og:title"))
        .or_else(|| structured.name.clone())
        .or_else(|| {
            document
                .texts("title")
                .into_iter()
                .find_map(|t| non_empty(&t))
        });

    let image = document
        .meta_content("og:image")
        .or_else(|| extract_field(document, &MICRODATA_IMAGE, non_empty))
        .or_else(|| structured.image.clone())
        .and_then(|raw| document.absolutize(&raw));

    let currency = document
        .meta_content("og:price:currency")
        .or_else(|| document.meta_content("product:price:currency"))
        .or_else(|| extract_field(document, &MICRODATA_CURRENCY, non_empty))
        .or_else(|| structured.currency.clone())
        .and_then(|raw| currency_code(&raw).map(str::to_owned))
        .or_else(|| {
            price_text
                .as_deref()
                .and_then(currency_code)
                .map(str::to_owned)
        });

    let in_stock = document
        .meta_content("og:availability")
        .or_else(|| document.meta_content("product:availability"))
        .or_else(|| extract_field(document, &MICRODATA_AVAILABILITY, non_empty))
        .or_else(|| structured.availability.clone())
        .map(|raw| parse_availability(&raw));

    PartialSnapshot {
        price,
        price_text,
        currency,
        title,
        image,
        in_stock,
    }
}

fn parse_generic(raw: &str) -> Option<(f64, String)> {
    parse_price(raw, default_price_parser).map(|p| (p, raw.to_owned()))
}

fn structured_price(document: &ParsedDocument, structured: &StructuredProduct) -> Option<(f64, String)> {
    let parse = parse_generic;

    if let Some(hit) = ["og:price:amount", "product:price:amount"]
        .iter()
        .filter_map(|key| document.meta_content(key))
        .find_map(|raw| parse(&raw))
    {
        return Some(hit);
    }

    if let Some(hit) = extract_field(document, &MICRODATA_PRICE, parse) {
        return Some(hit);
    }

    structured.price.as_deref().and_then(parse)
}

fn text_price(document: &ParsedDocument) -> Option<(f64, String)> {
    let parse = parse_generic;

    if let Some(hit) = document
        .h1_neighbourhood()
        .and_then(|text| price_looking_text(&text))
        .and_then(|raw| parse(&raw))
    {
        return Some(hit);
    }

    extract_field(document, &PRICE_CLASS, |raw| {
        price_looking_text(raw).and_then(|m| parse(&m))
    })
}

/// The first currency-marked amount in `text`, e.g. `"$34.00"` or `"12,50 €"`.
fn price_looking_text(text: &str) -> Option<String> {
    PRICE_TEXT_RE.find(text).map(|m| m.as_str().to_owned())
}

fn find_structured_product(document: &ParsedDocument) -> StructuredProduct {
    document
        .json_ld()
        .iter()
        .find_map(find_product_node)
        .map(structured_from_node)
        .unwrap_or_default()
}

/// Depth-first search for a node whose `@type` is `Product`, looking through
/// arrays and `@graph` containers.
fn find_product_node(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_product_node),
        Value::Object(map) => {
            if is_product_type(map.get("@type")) {
                return Some(value);
            }
            map.get("@graph").and_then(find_product_node)
        }
        _ => None,
    }
}

fn is_product_type(ty: Option<&Value>) -> bool {
    match ty {
        Some(Value::String(s)) => s == "Product" || s == "ProductGroup",
        Some(Value::Array(types)) => types.iter().any(|t| is_product_type(Some(t))),
        _ => false,
    }
}

fn structured_from_node(node: &Value) -> StructuredProduct {
    let offer = match node.get("offers") {
        Some(Value::Array(offers)) => offers.first(),
        other => other,
    };

    let offer_field = |key: &str| offer.and_then(|o| o.get(key)).and_then(scalar_string);

    StructuredProduct {
        name: node.get("name").and_then(scalar_string),
        image: node.get("image").and_then(image_string),
        price: offer_field("price").or_else(|| offer_field("lowPrice")),
        currency: offer_field("priceCurrency"),
        availability: offer_field("availability"),
    }
}

/// Strings and numbers as text; everything else is absent.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `image` may be a URL, a list of URLs, or an `ImageObject`.
fn image_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Array(items) => items.iter().find_map(image_string),
        Value::Object(map) => map.get("url").and_then(image_string),
        _ => None,
    }
}

#[cfg(test)]
#[path = "generic_test.rs"]
mod tests;
