//! Parsers for the free-form `price` and `duration` label strings.
//!
//! Both fields are operator-entered text (`"$20"`, `"FREE"`,
//! `"1 Hour 15 Minutes"`). The numeric values derived here feed the
//! range filters and API responses; they are computed at read time
//! and never stored.

use std::sync::LazyLock;

use regex::Regex;

/// First run of digits with an optional `$` prefix and an optional
/// two-decimal fraction, e.g. `$20`, `20.00`.
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?(\d+(?:\.\d{2})?)").expect("price regex"));

/// `<N> [Hour|Hr] <M>? [Minute|Min]` with every unit optional. Whether
/// the first number means hours or minutes is decided afterwards by a
/// substring check, not by the regex.
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:Hour|Hr)?s?\s*(\d+)?\s*(?:Minute|Min)?s?")
        .expect("duration regex")
});

/// Any standalone integer, used as the last-resort duration fallback.
static INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").expect("int regex"));

/// Convert a price label to a numeric value.
///
/// `"FREE"` (any case) is 0.0; otherwise the first decimal number in
/// the string wins; a label with no number at all is also 0.0.
pub fn parse_price(label: &str) -> f64 {
    if label.eq_ignore_ascii_case("free") {
        return 0.0;
    }
    PRICE_RE
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Convert a duration label to total minutes.
///
/// If the label contains the substring "hour" (case-insensitive), the
/// first captured number is hours and the second, when present, is
/// minutes. Otherwise the first captured number is already minutes and
/// any second number is ignored. When the pattern does not match at
/// all, the first standalone integer anywhere in the label is used;
/// failing that, 0.
///
/// The "hour" detection is deliberately substring-based (so "Hours",
/// "hourly" etc. all count) to keep parity with the data this catalog
/// was built from.
pub fn parse_duration_minutes(label: &str) -> i64 {
    if let Some(caps) = DURATION_RE.captures(label) {
        let first: i64 = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        let second: Option<i64> = caps.get(2).and_then(|m| m.as_str().parse().ok());

        let has_hour = label.to_lowercase().contains("hour");
        let hours = if has_hour { first } else { 0 };
        let minutes = match second {
            Some(m) => m,
            None if has_hour => 0,
            None => first,
        };
        return hours * 60 + minutes;
    }

    INT_RE
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Whether a price label denotes free content.
///
/// Used for the `free` sub-list and the `is_premium` default at
/// creation time: premium means "not FREE and not $0".
pub fn is_free_price(label: &str) -> bool {
    label.eq_ignore_ascii_case("free") || label == "$0"
}
