//! Listing order for signs: by the number in `sign (N)` inside the image file name.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::contract::model::Sign;

static SIGN_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)sign\s*\((\d+)\)").expect("valid sign-number regex"));

/// `Some(3)` for "Storefront sign (3).png", `None` when no token is present.
/// Numbers past `u64::MAX` saturate.
pub fn sign_number(image_name: &str) -> Option<u64> {
    SIGN_NUMBER
        .captures(image_name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
}

/// Numbered signs ascending, then unnumbered ones; ties keep their input order.
pub fn arrange_signs(mut signs: Vec<Sign>) -> Vec<Sign> {
    signs.sort_by_key(|s| match s.image_name.as_deref().and_then(sign_number) {
        Some(n) => (0u8, n),
        None => (1u8, 0),
    });
    signs
}
