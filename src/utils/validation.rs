//! Input validation and parsing utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex for validating subdomain labels (stored lowercase, DNS-safe)
static SUBDOMAIN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").unwrap());

/// Validate a tenant subdomain label
pub fn validate_subdomain(subdomain: &str) -> bool {
    !subdomain.is_empty() && subdomain.len() <= 63 && SUBDOMAIN_REGEX.is_match(subdomain)
}

/// Parse a comma-separated list of children's ages.
///
/// Non-numeric tokens are discarded silently; an all-garbage input yields an
/// empty list, which callers store as NULL to keep "no kids" distinguishable
/// from "data missing".
pub fn parse_kids_ages(raw: &str) -> Vec<i32> {
    raw.split(',')
        .filter_map(|token| token.trim().parse::<i32>().ok())
        .collect()
}

/// Split a comma-separated amenities field into trimmed, non-empty entries.
pub fn parse_amenities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect()
}
