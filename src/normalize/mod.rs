//! Field normalization for raw extracted strings
//!
//! The markup extractor hands back whatever text the storefront renders:
//! currency-decorated price strings, free-form availability labels, and
//! descriptions full of emoji and irregular whitespace. This module turns
//! those into canonical typed values:
//! - price strings into exact decimal amounts
//! - availability text into the [`Availability`] enum
//! - description text into sanitized, whitespace-collapsed plain text
//! - image URL lists into order-preserving de-duplicated lists

mod price;
mod text;

pub use price::parse_price;
pub use text::sanitize_text;

use std::collections::HashSet;

/// Stock availability of a product, as persisted in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    InStock,
    OutOfStock,
    Limited,
}

impl Availability {
    /// Maps free-form availability text onto the enum.
    ///
    /// The mapping is total: every input, including absent or empty text,
    /// resolves to exactly one variant. Substrings are matched
    /// case-insensitively, with "out of stock"/"unavailable" checked
    /// before "limited" so that text mentioning both resolves to
    /// `OutOfStock`.
    pub fn from_text(text: Option<&str>) -> Self {
        let lower = match text {
            Some(t) if !t.trim().is_empty() => t.to_lowercase(),
            _ => return Self::InStock,
        };

        if lower.contains("out of stock") || lower.contains("unavailable") {
            Self::OutOfStock
        } else if lower.contains("limited") {
            Self::Limited
        } else {
            Self::InStock
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::OutOfStock => "out_of_stock",
            Self::Limited => "limited",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "in_stock" => Some(Self::InStock),
            "out_of_stock" => Some(Self::OutOfStock),
            "limited" => Some(Self::Limited),
            _ => None,
        }
    }
}

/// Removes exact-duplicate URLs while preserving first-seen order
pub fn dedup_urls(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_out_of_stock() {
        assert_eq!(
            Availability::from_text(Some("Out of Stock")),
            Availability::OutOfStock
        );
        assert_eq!(
            Availability::from_text(Some("Currently UNAVAILABLE")),
            Availability::OutOfStock
        );
    }

    #[test]
    fn test_availability_limited() {
        assert_eq!(
            Availability::from_text(Some("Limited stock")),
            Availability::Limited
        );
    }

    #[test]
    fn test_availability_match_order() {
        // "out of stock" wins over "limited" when both appear
        assert_eq!(
            Availability::from_text(Some("Limited - out of stock soon")),
            Availability::OutOfStock
        );
        assert_eq!(
            Availability::from_text(Some("Only 2 left, limited run")),
            Availability::Limited
        );
    }

    #[test]
    fn test_availability_default_in_stock() {
        assert_eq!(Availability::from_text(Some("In Stock")), Availability::InStock);
        assert_eq!(
            Availability::from_text(Some("Ships tomorrow")),
            Availability::InStock
        );
        assert_eq!(Availability::from_text(Some("")), Availability::InStock);
        assert_eq!(Availability::from_text(Some("   ")), Availability::InStock);
        assert_eq!(Availability::from_text(None), Availability::InStock);
    }

    #[test]
    fn test_availability_db_string_roundtrip() {
        for availability in &[
            Availability::InStock,
            Availability::OutOfStock,
            Availability::Limited,
        ] {
            let db_str = availability.to_db_string();
            assert_eq!(Availability::from_db_string(db_str), Some(*availability));
        }
        assert_eq!(Availability::from_db_string("unknown"), None);
    }

    #[test]
    fn test_dedup_urls_preserves_order() {
        let urls = vec![
            "https://cdn.example.com/a.jpg".to_string(),
            "https://cdn.example.com/b.jpg".to_string(),
            "https://cdn.example.com/a.jpg".to_string(),
            "https://cdn.example.com/c.jpg".to_string(),
            "https://cdn.example.com/b.jpg".to_string(),
        ];
        assert_eq!(
            dedup_urls(urls),
            vec![
                "https://cdn.example.com/a.jpg".to_string(),
                "https://cdn.example.com/b.jpg".to_string(),
                "https://cdn.example.com/c.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_dedup_urls_empty() {
        assert!(dedup_urls(vec![]).is_empty());
    }
}
