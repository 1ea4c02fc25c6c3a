use super::*;

// -----------------------------------------------------------------------
// default_price_parser
// -----------------------------------------------------------------------

#[test]
fn default_parser_us_thousands_and_cents() {
    assert_eq!(default_price_parser("$1,299.00"), Some(1299.0));
}

#[test]
fn default_parser_eu_thousands_and_cents() {
    assert_eq!(default_price_parser("1.299,00 €"), Some(1299.0));
}

#[test]
fn default_parser_plain_decimal() {
    assert_eq!(default_price_parser("19.99"), Some(19.99));
}

#[test]
fn default_parser_comma_decimal() {
    assert_eq!(default_price_parser("4,95 €"), Some(4.95));
}

#[test]
fn default_parser_lone_thousands_separator() {
    assert_eq!(default_price_parser("$1,299"), Some(1299.0));
    assert_eq!(default_price_parser("1.299 €"), Some(1299.0));
}

#[test]
fn default_parser_repeated_thousands_separator() {
    assert_eq!(default_price_parser("1,234,567"), Some(1_234_567.0));
}

#[test]
fn default_parser_space_grouping() {
    assert_eq!(default_price_parser("1\u{a0}299,50 €"), Some(1299.5));
}

#[test]
fn default_parser_takes_first_price_of_range() {
    assert_eq!(default_price_parser("$10.00 - $20.00"), Some(10.0));
}

#[test]
fn default_parser_ignores_trailing_separator() {
    assert_eq!(default_price_parser("1,299."), Some(1299.0));
}

#[test]
fn default_parser_garbage_returns_none() {
    assert!(default_price_parser("Call for price").is_none());
    assert!(default_price_parser("").is_none());
    assert!(default_price_parser("$").is_none());
}

#[test]
fn default_parser_rejects_negative() {
    assert!(default_price_parser("-$5.00").is_none());
    assert!(default_price_parser("$ -5.00").is_none());
}

// -----------------------------------------------------------------------
// store-specific parsers
// -----------------------------------------------------------------------

#[test]
fn point_decimal_parser() {
    assert_eq!(parse_point_decimal_price("US $1,049.99"), Some(1049.99));
    assert_eq!(parse_point_decimal_price("£12.50"), Some(12.5));
}

#[test]
fn comma_decimal_parser() {
    assert_eq!(parse_comma_decimal_price("1.049,99 €"), Some(1049.99));
    assert_eq!(parse_comma_decimal_price("EUR 12,50"), Some(12.5));
}

#[test]
fn split_cents_parser_joins_dollars_and_cents() {
    assert_eq!(parse_split_cents_price("$ 129 00"), Some(129.0));
    assert_eq!(parse_split_cents_price("$ 1 49"), Some(1.49));
}

#[test]
fn split_cents_parser_falls_back_for_regular_text() {
    assert_eq!(parse_split_cents_price("$129.99"), Some(129.99));
    assert_eq!(parse_split_cents_price("$129"), Some(129.0));
}

#[test]
fn split_cents_parser_handles_thousands_separator() {
    assert_eq!(parse_split_cents_price("$ 1,299 00"), Some(1299.0));
    assert_eq!(parse_split_cents_price("$ 12,499 95"), Some(12499.95));
    assert_eq!(parse_split_cents_price("- $ 1,299 00"), None);
}

#[test]
fn grouping_space_needs_three_digit_group() {
    assert_eq!(default_price_parser("$19.99 2 left"), Some(19.99));
    assert_eq!(default_price_parser("$129 00"), Some(129.0));
    assert_eq!(default_price_parser("1 299 999,00 €"), Some(1_299_999.0));
}

#[test]
fn parse_price_filters_non_finite_and_negative() {
    fn negative(_: &str) -> Option<f64> {
        Some(-1.0)
    }
    fn infinite(_: &str) -> Option<f64> {
        Some(f64::INFINITY)
    }
    assert!(parse_price("anything", negative).is_none());
    assert!(parse_price("anything", infinite).is_none());
    assert_eq!(parse_price("$3.50", default_price_parser), Some(3.5));
}

#[test]
fn formatted_price_reparses_to_same_value() {
    for price in [0.0, 0.99, 19.99, 1299.0, 1_234_567.89] {
        let text = format_usd(price);
        let reparsed = parse_price(&text, default_price_parser).unwrap();
        assert!(
            (reparsed - price).abs() < 1e-9,
            "{price} -> {text} -> {reparsed}"
        );
    }
}

#[test]
fn format_usd_groups_thousands() {
    assert_eq!(format_usd(1299.0), "$1,299.00");
    assert_eq!(format_usd(5.5), "$5.50");
}

// -----------------------------------------------------------------------
// currency
// -----------------------------------------------------------------------

#[test]
fn currency_symbol_mapping() {
    assert_eq!(parse_currency_symbol("$"), "USD");
    assert_eq!(parse_currency_symbol("€"), "EUR");
    assert_eq!(parse_currency_symbol("£"), "GBP");
}

#[test]
fn currency_symbol_unmapped_defaults_to_usd() {
    assert_eq!(parse_currency_symbol("¤"), "USD");
    assert_eq!(parse_currency_symbol(""), "USD");
}

#[test]
fn currency_code_reads_iso_codes_and_prefixed_dollars() {
    assert_eq!(currency_code("CAD 12.00"), Some("CAD"));
    assert_eq!(currency_code("CA$12.00"), Some("CAD"));
    assert_eq!(currency_code("A$ 9"), Some("AUD"));
    assert_eq!(currency_code("12,00 €"), Some("EUR"));
    assert_eq!(currency_code("Price"), None);
}

// -----------------------------------------------------------------------
// availability
// -----------------------------------------------------------------------

#[test]
fn availability_negative_phrases() {
    assert!(!parse_availability("Out of Stock"));
    assert!(!parse_availability("Currently unavailable."));
    assert!(!parse_availability("SOLD OUT"));
    assert!(!parse_availability("https://schema.org/OutOfStock"));
}

#[test]
fn availability_defaults_to_in_stock() {
    assert!(parse_availability(""));
    assert!(parse_availability("In Stock"));
    assert!(parse_availability("Only 3 left"));
    assert!(parse_availability("https://schema.org/InStock"));
}

#[test]
fn clean_text_collapses_whitespace() {
    assert_eq!(clean_text("  Big \n\t Laptop  "), "Big Laptop");
}
