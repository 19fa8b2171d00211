//! Swedish display formatting for money, dates and card numbers.

use chrono::Datelike;
use models::dates::parse_iso;
use rust_decimal::{Decimal, RoundingStrategy};

const NBSP: char = '\u{00A0}';
const MINUS: &str = "\u{2212}";
pub const MISSING: &str = "-";

const MONTHS: [&str; 12] = [
    "januari", "februari", "mars", "april", "maj", "juni", "juli", "augusti", "september", "oktober",
    "november", "december",
];

/// Whole kronor, e.g. `1 234 kr`.
pub fn sek(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();
    format!("{}{}{NBSP}kr", sign(rounded), group(&digits))
}

/// Kronor and öre, e.g. `1 234,50 kr`.
pub fn sek_precise(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    format!("{}{},{frac}{NBSP}kr", sign(rounded), group(int_part))
}

fn sign(amount: Decimal) -> &'static str {
    if amount.is_sign_negative() && !amount.is_zero() {
        MINUS
    } else {
        ""
    }
}

fn group(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * 2);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(NBSP);
        }
        out.push(c);
    }
    out
}

/// `10 januari 2024`; `-` when the input is not a date.
pub fn date_long(raw: &str) -> String {
    match parse_iso(raw) {
        Some(dt) => {
            let d = dt.date();
            format!("{:02} {} {}", d.day(), MONTHS[d.month0() as usize], d.year())
        }
        None => MISSING.into(),
    }
}

/// `2024-01-10`; `-` when the input is not a date.
pub fn date_numeric(raw: &str) -> String {
    parse_iso(raw)
        .map(|dt| dt.date().format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| MISSING.into())
}

/// Keep the first two groups of a grouped card number. Anything with fewer
/// than four groups is returned as is.
pub fn mask_card(number: &str) -> String {
    let groups: Vec<&str> = number.split_whitespace().collect();
    if groups.len() < 4 {
        return number.to_string();
    }
    format!("{} {} •• ••", groups[0], groups[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::dec;

    #[test]
    fn whole_kronor_grouping() {
        assert_eq!(sek(dec("0")), "0\u{a0}kr");
        assert_eq!(sek(dec("999")), "999\u{a0}kr");
        assert_eq!(sek(dec("1234")), "1\u{a0}234\u{a0}kr");
        assert_eq!(sek(dec("1234567")), "1\u{a0}234\u{a0}567\u{a0}kr");
    }

    #[test]
    fn whole_kronor_round_half_away_from_zero() {
        assert_eq!(sek(dec("1234.5")), "1\u{a0}235\u{a0}kr");
        assert_eq!(sek(dec("1234.49")), "1\u{a0}234\u{a0}kr");
        assert_eq!(sek(dec("-2.5")), "\u{2212}3\u{a0}kr");
        assert_eq!(sek(dec("-0.4")), "0\u{a0}kr");
    }

    #[test]
    fn precise_keeps_two_decimals() {
        assert_eq!(sek_precise(dec("1234.5")), "1\u{a0}234,50\u{a0}kr");
        assert_eq!(sek_precise(dec("12")), "12,00\u{a0}kr");
        assert_eq!(sek_precise(dec("-0.125")), "\u{2212}0,13\u{a0}kr");
    }

    #[test]
    fn dates() {
        assert_eq!(date_long("2024-01-10"), "10 januari 2024");
        assert_eq!(date_long("2024-03-01T08:00:00"), "01 mars 2024");
        assert_eq!(date_numeric("2024-01-10T23:59:59Z"), "2024-01-10");
        assert_eq!(date_long("not a date"), MISSING);
        assert_eq!(date_numeric(""), MISSING);
    }

    #[test]
    fn card_mask() {
        assert_eq!(mask_card("1234 5678 9012 3456"), "1234 5678 •• ••");
        assert_eq!(mask_card("1234 5678"), "1234 5678");
        assert_eq!(mask_card("1234567890123456"), "1234567890123456");
    }
}
