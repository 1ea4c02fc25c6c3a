//! Built-in store catalogue.
//!
//! Selectors are tied to each store's current markup. When a store ships a
//! redesign, prepend the new locations to the cascade and keep the old ones
//! until they stop matching in production.

use crate::normalize::{
    default_price_parser, parse_comma_decimal_price, parse_point_decimal_price,
    parse_split_cents_price, PriceParser,
};

use super::{Locator, StoreRule};

/// Returns the built-in rules in resolution order.
#[must_use]
pub fn builtin_rules() -> Vec<StoreRule> {
    vec![
        amazon("Amazon US", "amazon.com", parse_point_decimal_price, "USD"),
        amazon("Amazon UK", "amazon.co.uk", parse_point_decimal_price, "GBP"),
        amazon("Amazon DE", "amazon.de", parse_comma_decimal_price, "EUR"),
        amazon("Amazon CA", "amazon.ca", parse_point_decimal_price, "CAD"),
        walmart(),
        target(),
        best_buy(),
        ebay(),
        etsy(),
        newegg(),
        home_depot(),
        costco(),
        aliexpress(),
    ]
}

fn amazon(
    name: &'static str,
    domain: &'static str,
    price_parser: PriceParser,
    default_currency: &'static str,
) -> StoreRule {
    StoreRule {
        name,
        domain,
        requires_rendering: false,
        price: vec![
            Locator::text("#corePrice_feature_div .a-price .a-offscreen"),
            Locator::text("#corePriceDisplay_desktop_feature_div .a-price .a-offscreen"),
            Locator::text("#priceblock_ourprice"),
            Locator::text("#priceblock_dealprice"),
            Locator::text("#price_inside_buybox"),
            Locator::text("#apex_desktop .a-price .a-offscreen"),
            Locator::text(".a-price .a-offscreen"),
        ],
        title: vec![Locator::text("#productTitle"), Locator::text("h1#title")],
        image: vec![
            Locator::attr("#landingImage", "data-old-hires"),
            Locator::attr("#landingImage", "src"),
            Locator::attr("#imgBlkFront", "src"),
            Locator::attr("#main-image", "src"),
        ],
        availability: vec![
            Locator::text("#availability"),
            Locator::text("#outOfStock"),
        ],
        currency_symbol: vec![Locator::text(".a-price .a-price-symbol")],
        price_parser,
        default_currency,
    }
}

fn walmart() -> StoreRule {
    StoreRule {
        name: "Walmart",
        domain: "walmart.com",
        requires_rendering: true,
        price: vec![
            Locator::text("[itemprop='price']"),
            Locator::text("span[data-automation-id='product-price'] span"),
            Locator::text("[data-testid='price-wrap'] span"),
        ],
        title: vec![
            Locator::text("h1[itemprop='name']"),
            Locator::text("h1#main-title"),
            Locator::text("h1"),
        ],
        image: vec![
            Locator::attr("[data-testid='hero-image-container'] img", "src"),
            Locator::attr("meta[property='og:image']", "content"),
        ],
        availability: vec![
            Locator::text("[data-testid='out-of-stock-message']"),
            Locator::text("[data-automation-id='fulfillment-banner']"),
        ],
        currency_symbol: vec![Locator::attr("[itemprop='priceCurrency']", "content")],
        price_parser: parse_point_decimal_price,
        default_currency: "USD",
    }
}

fn target() -> StoreRule {
    StoreRule {
        name: "Target",
        domain: "target.com",
        requires_rendering: true,
        price: vec![
            Locator::text("[data-test='product-price']"),
            Locator::text("[data-test='product-price-sale']"),
        ],
        title: vec![Locator::text("h1[data-test='product-title']"), Locator::text("h1")],
        image: vec![
            Locator::attr("[data-test='product-image'] img", "src"),
            Locator::attr("meta[property='og:image']", "content"),
        ],
        availability: vec![
            Locator::text("[data-test='outOfStockMessage']"),
            Locator::text("[data-test='fulfillment-cell-shipping']"),
        ],
        currency_symbol: vec![],
        price_parser: parse_point_decimal_price,
        default_currency: "USD",
    }
}

fn best_buy() -> StoreRule {
    StoreRule {
        name: "Best Buy",
        domain: "bestbuy.com",
        requires_rendering: true,
        price: vec![
            Locator::text("[data-testid='customer-price'] span"),
            Locator::text(".priceView-customer-price span[aria-hidden='true']"),
            Locator::text(".priceView-hero-price span"),
        ],
        title: vec![Locator::text(".sku-title h1"), Locator::text("h1.heading-5")],
        image: vec![
            Locator::attr("img.primary-image", "src"),
            Locator::attr("meta[property='og:image']", "content"),
        ],
        availability: vec![Locator::text(".fulfillment-add-to-cart-button button")],
        currency_symbol: vec![],
        price_parser: parse_point_decimal_price,
        default_currency: "USD",
    }
}

fn ebay() -> StoreRule {
    StoreRule {
        name: "eBay",
        domain: "ebay.com",
        requires_rendering: false,
        price: vec![
            Locator::text(".x-price-primary span.ux-textspans"),
            Locator::attr("[itemprop='price']", "content"),
            Locator::text("#prcIsum"),
            Locator::text("#mm-saleDscPrc"),
        ],
        title: vec![
            Locator::text("h1.x-item-title__mainTitle span"),
            Locator::text("#itemTitle"),
        ],
        image: vec![
            Locator::attr(".ux-image-carousel-item.active img", "src"),
            Locator::attr("#icImg", "src"),
        ],
        availability: vec![
            Locator::text(".d-quantity__availability"),
            Locator::text("#qtySubTxt"),
        ],
        currency_symbol: vec![
            Locator::attr("[itemprop='priceCurrency']", "content"),
            Locator::text(".x-price-primary span.ux-textspans"),
        ],
        price_parser: default_price_parser,
        default_currency: "USD",
    }
}

fn etsy() -> StoreRule {
    StoreRule {
        name: "Etsy",
        domain: "etsy.com",
        requires_rendering: false,
        price: vec![
            Locator::text("[data-buy-box-region='price'] p.wt-text-title-larger"),
            Locator::text("[data-selector='price-only'] .currency-value"),
            Locator::text("p.wt-text-title-03"),
        ],
        title: vec![
            Locator::text("h1[data-buy-box-listing-title]"),
            Locator::text("h1"),
        ],
        image: vec![
            Locator::attr("ul[data-carousel-pane-list] img", "data-src-zoom-image"),
            Locator::attr("ul[data-carousel-pane-list] img", "src"),
        ],
        availability: vec![Locator::text("[data-buy-box-region='stock-indicator']")],
        currency_symbol: vec![Locator::text("[data-selector='price-only'] .currency-symbol")],
        price_parser: default_price_parser,
        default_currency: "USD",
    }
}

fn newegg() -> StoreRule {
    StoreRule {
        name: "Newegg",
        domain: "newegg.com",
        requires_rendering: false,
        price: vec![
            Locator::text(".product-buy-box .price-current"),
            Locator::text("li.price-current"),
        ],
        title: vec![Locator::text("h1.product-title")],
        image: vec![
            Locator::attr(".product-view-img-original", "src"),
            Locator::attr(".swiper-slide-active img", "src"),
        ],
        availability: vec![
            Locator::text(".product-inventory strong"),
            Locator::text(".product-flag"),
        ],
        currency_symbol: vec![],
        price_parser: parse_point_decimal_price,
        default_currency: "USD",
    }
}

fn home_depot() -> StoreRule {
    StoreRule {
        name: "The Home Depot",
        domain: "homedepot.com",
        requires_rendering: true,
        price: vec![
            Locator::text("[data-testid='price-format__main-price']"),
            Locator::text(".price-format__main-price"),
            Locator::text("#standard-price"),
        ],
        title: vec![
            Locator::text("h1.product-details__title"),
            Locator::text("[data-component='ProductDetailsTitle'] h1"),
            Locator::text("h1"),
        ],
        image: vec![
            Locator::attr(".mediagallery__mainimage img", "src"),
            Locator::attr("meta[property='og:image']", "content"),
        ],
        availability: vec![Locator::text("[data-component='FulfillmentTiles']")],
        currency_symbol: vec![],
        price_parser: parse_split_cents_price,
        default_currency: "USD",
    }
}

fn costco() -> StoreRule {
    StoreRule {
        name: "Costco",
        domain: "costco.com",
        requires_rendering: true,
        price: vec![
            Locator::text("#pull-right-price span.value"),
            Locator::text(".your-price .value"),
        ],
        title: vec![
            Locator::text("h1[itemprop='name']"),
            Locator::text("h1.product-h1-container-v2"),
        ],
        image: vec![Locator::attr("#initialProductImage", "src")],
        availability: vec![Locator::attr("#add-to-cart-btn", "value")],
        currency_symbol: vec![Locator::text(".your-price .currency")],
        price_parser: parse_point_decimal_price,
        default_currency: "USD",
    }
}

fn aliexpress() -> StoreRule {
    StoreRule {
        name: "AliExpress",
        domain: "aliexpress.com",
        requires_rendering: true,
        price: vec![
            Locator::text(".product-price-current"),
            Locator::text("[class*='price--current'] span"),
            Locator::text(".uniform-banner-box-price"),
        ],
        title: vec![
            Locator::text("h1[data-pl='product-title']"),
            Locator::text(".product-title-text"),
        ],
        image: vec![
            Locator::attr("[class*='magnifier--image']", "src"),
            Locator::attr(".image-view-magnifier-wrap img", "src"),
        ],
        availability: vec![Locator::text("[class*='quantity--info']")],
        currency_symbol: vec![],
        price_parser: default_price_parser,
        default_currency: "USD",
    }
}
