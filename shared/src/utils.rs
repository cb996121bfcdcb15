//! # Shared Utility Functions
//!
//! Display helpers used by the client and by anything rendering DTOs.
//!
//! ## Usage
//!
//! ```rust
//! use shared::utils::mask_iban;
//!
//! assert_eq!(mask_iban("DE89 3704 0044 0532 0130 00"), "DE89...3000");
//! ```

use rust_decimal::Decimal;

/// Keep the first `prefix_len` and last `suffix_len` characters of `value`,
/// joined by an ellipsis.
///
/// If the value is not longer than `prefix_len + suffix_len`, it is returned as-is.
///
/// # Examples
///
/// ```rust
/// use shared::utils::truncate_middle;
///
/// assert_eq!(truncate_middle("DE89370400440532013000", 4, 4), "DE89...3000");
/// assert_eq!(truncate_middle("short", 4, 4), "short");
/// ```
pub fn truncate_middle(value: &str, prefix_len: usize, suffix_len: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();

    if len <= prefix_len + suffix_len {
        return value.to_string();
    }

    let prefix: String = chars[..prefix_len].iter().collect();
    let suffix: String = chars[len - suffix_len..].iter().collect();

    format!("{}...{}", prefix, suffix)
}

/// Mask an IBAN for display, ignoring the grouping spaces users type.
pub fn mask_iban(iban: &str) -> String {
    let compact: String = iban.chars().filter(|c| !c.is_whitespace()).collect();
    truncate_middle(&compact.to_uppercase(), 4, 4)
}

/// Format a price in euros with two decimals.
///
/// ```rust
/// use shared::utils::format_price;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_price(Decimal::new(450, 2)), "€4.50");
/// assert_eq!(format_price(Decimal::new(12, 0)), "€12.00");
/// ```
pub fn format_price(amount: Decimal) -> String {
    format!("€{:.2}", amount.round_dp(2))
}

/// "First Last", tolerating an empty part.
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.trim(), last_name.trim())
        .trim()
        .to_string()
}
