//! Static registry of per-store extraction rules.
//!
//! Rules are plain data: one [`StoreRule`] per store, each holding ordered
//! [`Locator`] cascades per field. Adding a store means adding an entry to
//! [`stores::builtin_rules`], not writing new extraction code.

mod stores;

use std::sync::{LazyLock, OnceLock};

use scraper::Selector;

use crate::normalize::PriceParser;
use crate::origin::{parse_product_url, store_host};

pub use stores::builtin_rules;

static BUILTIN: LazyLock<RuleRegistry> = LazyLock::new(|| RuleRegistry::new(builtin_rules()));

/// One candidate location for a field: a CSS selector plus, optionally, the
/// attribute to read instead of the element's text content.
#[derive(Debug, Clone)]
pub struct Locator {
    css: &'static str,
    attr: Option<&'static str>,
    compiled: OnceLock<Option<Selector>>,
}

impl Locator {
    /// Reads the matched element's text content.
    #[must_use]
    pub const fn text(css: &'static str) -> Self {
        Self {
            css,
            attr: None,
            compiled: OnceLock::new(),
        }
    }

    /// Reads attribute `name` from the matched element.
    #[must_use]
    pub const fn attr(css: &'static str, name: &'static str) -> Self {
        Self {
            css,
            attr: Some(name),
            compiled: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn css(&self) -> &'static str {
        self.css
    }

    #[must_use]
    pub fn attribute(&self) -> Option<&'static str> {
        self.attr
    }

    /// The compiled selector, or `None` if the CSS does not parse. An invalid
    /// selector is logged once and then behaves as a locator that never
    /// matches.
    #[must_use]
    pub fn selector(&self) -> Option<&Selector> {
        self.compiled
            .get_or_init(|| match Selector::parse(self.css) {
                Ok(selector) => Some(selector),
                Err(e) => {
                    tracing::warn!(css = self.css, error = ?e, "invalid locator selector");
                    None
                }
            })
            .as_ref()
    }
}

/// Extraction rules for a single store.
#[derive(Debug, Clone)]
pub struct StoreRule {
    /// Display name, e.g. `"Amazon US"`.
    pub name: &'static str,
    /// Canonical domain suffix, e.g. `"amazon.com"`.
    pub domain: &'static str,
    /// The store hydrates prices client-side and needs a browser.
    pub requires_rendering: bool,
    pub price: Vec<Locator>,
    pub title: Vec<Locator>,
    pub image: Vec<Locator>,
    pub availability: Vec<Locator>,
    pub currency_symbol: Vec<Locator>,
    pub price_parser: PriceParser,
    /// Currency assumed when neither a currency locator nor the price text
    /// names one.
    pub default_currency: &'static str,
}

impl StoreRule {
    /// `true` if `host` is this rule's domain or a subdomain of it.
    #[must_use]
    pub fn matches_host(&self, host: &str) -> bool {
        host == self.domain
            || host
                .strip_suffix(self.domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    /// The locator a renderer should wait for before capturing the page.
    #[must_use]
    pub fn primary_price_locator(&self) -> Option<&Locator> {
        self.price.first()
    }
}

/// An ordered set of store rules. The first rule whose domain matches wins.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<StoreRule>,
}

impl RuleRegistry {
    #[must_use]
    pub fn new(rules: Vec<StoreRule>) -> Self {
        Self { rules }
    }

    /// The process-wide registry of built-in stores.
    #[must_use]
    pub fn builtin() -> &'static RuleRegistry {
        &BUILTIN
    }

    #[must_use]
    pub fn rules(&self) -> &[StoreRule] {
        &self.rules
    }

    /// Looks up a rule by normalized host (lowercase, no `www.`).
    #[must_use]
    pub fn resolve_host(&self, host: &str) -> Option<&StoreRule> {
        self.rules.iter().find(|rule| rule.matches_host(host))
    }

    /// Looks up the rule for a product URL. Unparseable URLs resolve to `None`.
    #[must_use]
    pub fn resolve(&self, url: &str) -> Option<&StoreRule> {
        let url = parse_product_url(url).ok()?;
        let host = store_host(&url)?;
        self.resolve_host(&host)
    }
}

/// Resolves a product URL against the built-in registry.
#[must_use]
pub fn resolve_rule(url: &str) -> Option<&'static StoreRule> {
    RuleRegistry::builtin().resolve(url)
}

/// Reports whether a URL belongs to a registered store. Callers can use this
/// to reject unsupported stores before invoking the engine.
#[must_use]
pub fn is_supported_url(url: &str) -> bool {
    resolve_rule(url).is_some()
}

/// Every registered store, in resolution order.
#[must_use]
pub fn registered_stores() -> &'static [StoreRule] {
    RuleRegistry::builtin().rules()
}

#[cfg(test)]
#[path = "../rules_test.rs"]
mod tests;
