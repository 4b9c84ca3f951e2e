//! Currency rounding, parsing, and display.
//!
//! CRITICAL: Never use floating-point for money calculations. Every amount is
//! a `rust_decimal::Decimal`; rounding happens only when a value is persisted
//! or displayed.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fraction digits stored for every amount.
pub const CURRENCY_SCALE: u32 = 2;

/// Number of fraction digits stored for line quantities.
pub const QUANTITY_SCALE: u32 = 3;

/// Number of fraction digits stored for percentages.
pub const PERCENT_SCALE: u32 = 2;

/// Largest amount a money column holds: `999999999999.99`.
pub const MAX_AMOUNT: Decimal =
    Decimal::from_parts(276_447_231, 23_283, 0, false, CURRENCY_SCALE);

/// Largest line quantity a quantity column holds: `999999999.999`.
pub const MAX_QUANTITY: Decimal =
    Decimal::from_parts(3_567_587_327, 232, 0, false, QUANTITY_SCALE);

/// True when `value` needs no more than `scale` fraction digits and its
/// magnitude is at most `max`. Trailing zeros do not count.
#[must_use]
pub fn fits(value: Decimal, scale: u32, max: Decimal) -> bool {
    value.normalize().scale() <= scale && value.abs() <= max
}

/// True when `amount` is storable in a money column unchanged.
#[must_use]
pub fn fits_amount(amount: Decimal) -> bool {
    fits(amount, CURRENCY_SCALE, MAX_AMOUNT)
}

/// Rounds an amount to currency precision, half away from zero.
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Replaces Arabic-Indic and Eastern Arabic-Indic digits with ASCII digits.
///
/// The Arabic decimal separator (`٫`) becomes `.` and the Arabic thousands
/// separator (`٬`) is dropped. Other characters pass through.
#[must_use]
pub fn normalize_digits(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c != '\u{066C}')
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => ascii_digit(c, '\u{0660}'),
            '\u{06F0}'..='\u{06F9}' => ascii_digit(c, '\u{06F0}'),
            '\u{066B}' => '.',
            other => other,
        })
        .collect()
}

fn ascii_digit(c: char, zero: char) -> char {
    let offset = u32::from(c) - u32::from(zero);
    char::from_digit(offset, 10).unwrap_or(c)
}

/// Parses a user-entered amount.
///
/// Accepts Arabic digits, surrounding whitespace, and `,` thousands
/// separators. Returns `None` when the text is not a number.
#[must_use]
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let normalized: String = normalize_digits(input.trim())
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<Decimal>().ok()
}

/// Formats an amount with two fraction digits, thousands separators, and an
/// optional currency symbol suffix.
///
/// `format_amount(dec!(1234.5), "ج.م")` gives `"1,234.50 ج.م"`.
#[must_use]
pub fn format_amount(amount: Decimal, symbol: &str) -> String {
    let rounded = round_currency(amount);
    let mut magnitude = rounded.abs();
    magnitude.rescale(CURRENCY_SCALE);
    let text = magnitude.to_string();
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    if symbol.is_empty() {
        format!("{sign}{grouped}.{frac}")
    } else {
        format!("{sign}{grouped}.{frac} {symbol}")
    }
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
