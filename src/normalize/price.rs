//! Price string parsing
//!
//! Listing cards render prices as display strings like "Rs. 330.00",
//! "₹1,299" or "Contact us". Persistence needs an exact decimal amount,
//! so parsing strips currency decoration and pulls out the first numeric
//! substring. A string with no numeric content yields `None`; callers
//! must treat that as "do not persist this product".

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

static RUPEE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[Rr][Ss]\.?\s*").expect("static regex"));
static CURRENCY_SIGN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[₹$]\s*").expect("static regex"));
static STRAY_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z:]+").expect("static regex"));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.?\d*").expect("static regex"));

/// Parses a display price string into an exact decimal amount.
///
/// Strips known currency markers (`Rs.`, `₹`, `$`), stray alphabetic
/// tokens and colons, and thousands separators, then parses the first
/// integer-or-decimal substring.
///
/// Returns `None` when no numeric substring remains, never zero and
/// never an error.
///
/// # Examples
///
/// ```
/// use catalog_harvest::normalize::parse_price;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(parse_price("Rs. 330.00"), Some(Decimal::from_str("330.00").unwrap()));
/// assert_eq!(parse_price("Contact us"), None);
/// ```
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let stripped = RUPEE_MARKER.replace_all(trimmed, "");
    let stripped = CURRENCY_SIGN.replace_all(&stripped, "");
    let stripped = STRAY_TEXT.replace_all(&stripped, "");
    let stripped = stripped.replace(',', "");

    // The pattern admits a trailing dot with no fraction ("330."); trim it
    // so the decimal parser sees a plain integer.
    let number = NUMBER.find(&stripped)?;
    Decimal::from_str(number.as_str().trim_end_matches('.')).ok()
}
