//! Selector cascade evaluation.

use crate::document::ParsedDocument;
use crate::rules::Locator;

/// Returns the first value in `cascade` that `normalize` accepts.
///
/// Locators are tried in order. For each locator every matched element is
/// offered to `normalize`, not only the first, so a stale or empty match
/// early in the page does not hide a usable one further down. `None` means
/// no locator produced a usable value; whether that is fatal is the
/// caller's decision.
pub fn extract_field<T, F>(document: &ParsedDocument, cascade: &[Locator], normalize: F) -> Option<T>
where
    F: Fn(&str) -> Option<T>,
{
    for (position, locator) in cascade.iter().enumerate() {
        for raw in document.locate(locator) {
            if let Some(value) = normalize(&raw) {
                tracing::trace!(
                    css = locator.css(),
                    position,
                    url = %document.url(),
                    "cascade hit"
                );
                return Some(value);
            }
        }
    }
    None
}

/// Normalizer for free-text fields: trims and rejects empty strings.
pub fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use url::Url;

    use super::*;
    use crate::normalize::{default_price_parser, parse_price};

    fn doc(body: &str) -> ParsedDocument {
        ParsedDocument::parse(body, Url::parse("https://shop.example.com/p").unwrap())
    }

    #[test]
    fn falls_through_to_next_locator_when_first_has_no_match() {
        let d = doc(r#"<span class="sale">$9.99</span>"#);
        let cascade = [Locator::text(".price"), Locator::text(".sale")];
        let price = extract_field(&d, &cascade, |raw| parse_price(raw, default_price_parser));
        assert_eq!(price, Some(9.99));
    }

    #[test]
    fn tries_every_match_of_a_locator() {
        let d = doc(r#"<span class="p">See price in cart</span><span class="p">$4.00</span>"#);
        let cascade = [Locator::text(".p")];
        let price = extract_field(&d, &cascade, |raw| parse_price(raw, default_price_parser));
        assert_eq!(price, Some(4.0));
    }

    #[test]
    fn unparseable_matches_fall_through_to_next_locator() {
        let d = doc(r#"<span class="a">N/A</span><span class="b">$7</span>"#);
        let cascade = [Locator::text(".a"), Locator::text(".b")];
        let price = extract_field(&d, &cascade, |raw| parse_price(raw, default_price_parser));
        assert_eq!(price, Some(7.0));
    }

    #[test]
    fn returns_none_when_nothing_usable() {
        let d = doc("<p>nothing</p>");
        let cascade = [Locator::text(".price"), Locator::text("div[[bad")];
        assert!(extract_field(&d, &cascade, non_empty).is_none());
    }

    #[test]
    fn stops_at_first_success() {
        let d = doc(r#"<h1>One</h1><h2>Two</h2>"#);
        let seen = RefCell::new(Vec::new());
        let cascade = [Locator::text("h1"), Locator::text("h2")];
        let title = extract_field(&d, &cascade, |raw| {
            seen.borrow_mut().push(raw.to_owned());
            non_empty(raw)
        });
        assert_eq!(title.as_deref(), Some("One"));
        assert_eq!(*seen.borrow(), vec!["One".to_owned()]);
    }

    #[test]
    fn empty_cascade_is_none() {
        let d = doc("<h1>Title</h1>");
        assert!(extract_field(&d, &[], non_empty).is_none());
    }
}
