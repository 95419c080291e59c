//! Utility functions for formatting and common operations
//!
//! This module provides centralized formatting utilities for consistent
//! display of currency, quantity and decimal values throughout the application.

use rust_decimal::{Decimal, RoundingStrategy};

/// Core formatting function with full control over output.
///
/// Rounds half away from zero to `decimal_places`, groups the integer part
/// with `,` and uses `.` as the decimal separator. The sign follows the
/// currency symbol, matching the PDF/CSV reports ("¥-1,000").
///
/// # Arguments
/// * `value` - The decimal value to format
/// * `width` - Minimum width for padding (0 for no padding, right-aligned)
/// * `symbol` - Currency symbol prefix ("" for none)
/// * `decimal_places` - Digits after the decimal point
///
/// # Examples
/// ```
/// use zeitan::utils::format_currency_with_width;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency_with_width(dec!(1234.56), 0, "¥", 0), "¥1,235");
/// assert_eq!(format_currency_with_width(dec!(1234), 10, "", 2), "  1,234.00");
/// ```
pub fn format_currency_with_width(
    value: Decimal,
    width: usize,
    symbol: &str,
    decimal_places: u32,
) -> String {
    let rounded =
        value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let is_negative = rounded < Decimal::ZERO;

    let formatted = format!("{:.*}", decimal_places as usize, rounded.abs());
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((int, dec)) => (int, Some(dec)),
        None => (formatted.as_str(), None),
    };

    let result = format!(
        "{}{}{}{}",
        symbol,
        if is_negative { "-" } else { "" },
        group_thousands(integer_part),
        decimal_part.map(|d| format!(".{}", d)).unwrap_or_default()
    );

    // chars, not bytes: "¥" is multi-byte
    let len = result.chars().count();
    if width > len {
        format!("{}{}", " ".repeat(width - len), result)
    } else {
        result
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Format a quantity with trailing zeros removed: "0.5", "12"
pub fn format_quantity(value: Decimal) -> String {
    value.normalize().to_string()
}
