//! Pure normalizers turning raw matched text into prices, currency codes,
//! and stock flags.
//!
//! Nothing here panics or returns errors: a value that cannot be interpreted
//! is `None`, and the caller decides whether that field is fatal.

/// A store-specific numeric parser for raw price text.
pub type PriceParser = fn(&str) -> Option<f64>;

/// Which character separates the integer part from the fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecimalStyle {
    /// `1,299.00`
    Point,
    /// `1.299,00`
    Comma,
    /// Decide from the text itself.
    Auto,
}

/// Known negative stock phrases, matched case-insensitively as substrings.
const OUT_OF_STOCK_PHRASES: &[&str] = &[
    "out of stock",
    "out-of-stock",
    "unavailable",
    "not available",
    "no longer available",
    "sold out",
    "sold-out",
    "outofstock",
    "soldout",
    "discontinued",
];

const ISO_CODES: &[&str] = &[
    "USD", "EUR", "GBP", "CAD", "AUD", "JPY", "INR", "CNY", "CHF", "SEK", "NOK", "DKK", "PLN",
    "MXN", "BRL", "NZD",
];

/// Dollar prefixes that name a non-US currency. Checked before the bare `$`.
const DOLLAR_PREFIXES: &[(&str, &str)] = &[
    ("CA$", "CAD"),
    ("C$", "CAD"),
    ("AU$", "AUD"),
    ("A$", "AUD"),
    ("NZ$", "NZD"),
    ("MX$", "MXN"),
    ("R$", "BRL"),
    ("US$", "USD"),
];

const SYMBOLS: &[(char, &str)] = &[
    ('€', "EUR"),
    ('£', "GBP"),
    ('¥', "JPY"),
    ('₹', "INR"),
    ('$', "USD"),
];

/// Runs `parser` over `raw` and keeps the result only if it is a finite,
/// non-negative number.
#[must_use]
pub fn parse_price(raw: &str, parser: PriceParser) -> Option<f64> {
    parser(raw).filter(|p| p.is_finite() && *p >= 0.0)
}

/// Store-agnostic price parser.
///
/// Takes the first numeric run in the text and infers the decimal separator:
/// when both `.` and `,` occur the last one is decimal; a lone separator
/// followed by exactly three digits is a thousands separator.
#[must_use]
pub fn default_price_parser(raw: &str) -> Option<f64> {
    parse_with_style(raw, DecimalStyle::Auto)
}

/// Parser for `1,299.00`-style prices (US, UK, most of Asia).
#[must_use]
pub fn parse_point_decimal_price(raw: &str) -> Option<f64> {
    parse_with_style(raw, DecimalStyle::Point)
}

/// Parser for `1.299,00`-style prices (most of continental Europe).
#[must_use]
pub fn parse_comma_decimal_price(raw: &str) -> Option<f64> {
    parse_with_style(raw, DecimalStyle::Comma)
}

/// Parser for markup that renders dollars and cents as separate elements,
/// which reads back as `"$ 129 00"` or `"$ 1,299 00"` once the text nodes
/// are joined.
///
/// A whole-dollar amount followed by whitespace and exactly two digits takes
/// those digits as the cents. Anything else falls back to
/// [`parse_point_decimal_price`].
#[must_use]
pub fn parse_split_cents_price(raw: &str) -> Option<f64> {
    let (start, token) = first_numeric_token(raw)?;
    let end = start + token.len();
    let after = &raw[end..];
    let gap = after.len() - after.trim_start().len();

    if gap > 0 && !token.contains('.') {
        if let Some(cents) = two_digit_run(&after[gap..]) {
            let dollars = parse_point_decimal_price(&raw[..end])?;
            return format!("{dollars}.{cents}").parse::<f64>().ok();
        }
    }

    parse_point_decimal_price(raw)
}

/// The leading digits of `text` if there are exactly two of them.
fn two_digit_run(text: &str) -> Option<&str> {
    let digits = text.chars().take_while(char::is_ascii_digit).count();
    (digits == 2).then(|| &text[..2])
}

fn parse_with_style(raw: &str, style: DecimalStyle) -> Option<f64> {
    let (start, token) = first_numeric_token(raw)?;
    if is_negated(&raw[..start]) {
        return None;
    }

    let compact: String = token.chars().filter(|c| !is_group_space(*c)).collect();
    let compact = compact.trim_end_matches(['.', ',']);
    if compact.is_empty() {
        return None;
    }

    let decimal_sep = match style {
        DecimalStyle::Point => Some('.'),
        DecimalStyle::Comma => Some(','),
        DecimalStyle::Auto => infer_decimal_separator(compact),
    };

    let mut normalized = String::with_capacity(compact.len());
    for c in compact.chars() {
        match c {
            '0'..='9' => normalized.push(c),
            sep if Some(sep) == decimal_sep => normalized.push('.'),
            _ => {}
        }
    }

    // A second decimal point means the style guess was wrong for this text.
    if normalized.matches('.').count() > 1 {
        return None;
    }

    normalized.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Returns the byte offset and text of the first run of digits and
/// separators in `raw`.
fn first_numeric_token(raw: &str) -> Option<(usize, &str)> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let rest = &raw[start..];
    let mut end = rest.len();
    let mut chars = rest.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let keep = match c {
            '0'..='9' | '.' | ',' => true,
            // "1 299,00": a grouping space is only kept before a three-digit group.
            c if is_group_space(c) => {
                chars.peek().is_some_and(|(_, n)| n.is_ascii_digit())
                    && is_thousands_group(&rest[idx + c.len_utf8()..])
            }
            _ => false,
        };
        if !keep {
            end = idx;
            break;
        }
    }

    Some((start, &rest[..end]))
}

fn is_thousands_group(text: &str) -> bool {
    text.chars().take_while(char::is_ascii_digit).count() == 3
}

fn is_group_space(c: char) -> bool {
    matches!(c, ' ' | '\u{a0}' | '\u{202f}' | '\'')
}

/// `true` if the text before the first digit ends in a minus sign, ignoring
/// whitespace and currency symbols (`-$5`, `$ -5`).
fn is_negated(prefix: &str) -> bool {
    prefix
        .trim_end_matches(|c: char| c.is_whitespace() || SYMBOLS.iter().any(|(s, _)| *s == c))
        .ends_with(['-', '\u{2212}'])
}

fn infer_decimal_separator(token: &str) -> Option<char> {
    let last_point = token.rfind('.');
    let last_comma = token.rfind(',');

    match (last_point, last_comma) {
        (None, None) => None,
        (Some(p), Some(c)) => Some(if p > c { '.' } else { ',' }),
        (Some(idx), None) | (None, Some(idx)) => {
            let sep = if last_point.is_some() { '.' } else { ',' };
            if token.matches(sep).count() > 1 {
                return None;
            }
            let digits_after = token.len() - idx - 1;
            if digits_after == 3 {
                None
            } else {
                Some(sep)
            }
        }
    }
}

/// Maps currency text (symbol, prefixed dollar, or ISO code) to an ISO 4217
/// code. Returns `None` when nothing recognizable is present.
#[must_use]
pub fn currency_code(text: &str) -> Option<&'static str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let upper = trimmed.to_ascii_uppercase();
    for code in ISO_CODES {
        if upper
            .split(|c: char| !c.is_ascii_alphabetic())
            .any(|word| word == *code)
        {
            return Some(code);
        }
    }

    for (prefix, code) in DOLLAR_PREFIXES {
        if upper.contains(prefix) {
            return Some(code);
        }
    }

    SYMBOLS
        .iter()
        .find(|(symbol, _)| trimmed.contains(*symbol))
        .map(|(_, code)| *code)
}

/// Maps a currency symbol to its ISO 4217 code, defaulting to `USD` for
/// anything unmapped.
#[must_use]
pub fn parse_currency_symbol(symbol: &str) -> &'static str {
    currency_code(symbol).unwrap_or("USD")
}

/// Interprets availability text.
///
/// Only recognized out-of-stock phrases yield `false`. Anything else,
/// including empty text, is treated as in stock.
#[must_use]
pub fn parse_availability(raw: &str) -> bool {
    let lower = raw.to_lowercase();
    !OUT_OF_STOCK_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
}

/// Collapses runs of whitespace into single spaces and trims the ends.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Renders a price the way a US storefront would, e.g. `$1,299.00`.
#[must_use]
pub fn format_usd(price: f64) -> String {
    let fixed = format!("{price:.2}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${grouped}.{frac_part}")
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
