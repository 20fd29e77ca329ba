//! Row validation: build an annotated [`Row`] from a raw record.
//!
//! Validation runs exactly once per row, at import time. The verdict is
//! stored in `Row::is_valid` and never recomputed; later passes may only
//! append duplicate findings and flip the exclusion flag.

use crate::error::RowError;
use crate::pipeline::input::RawRow;
use crate::pipeline::mapper::{extract_fields, format_product_name};
use crate::profile::ProductTypeProfile;
use crate::row::Row;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_HTTP_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://.+").unwrap());

/// Outcome of checking one row's derived fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    pub is_valid: bool,
    pub errors: Vec<RowError>,
}

/// Check a URL: non-blank and starting with `http://` or `https://`
/// (case-insensitive) followed by at least one character.
pub fn validate_url(url: &str) -> Vec<RowError> {
    if url.trim().is_empty() {
        vec![RowError::EmptyUrl]
    } else if !RE_HTTP_URL.is_match(url) {
        vec![RowError::InvalidUrlScheme]
    } else {
        Vec::new()
    }
}

/// Check a row's formatted name and URL. Both findings may be reported.
pub fn validate(product_name: &str, url: &str) -> Validation {
    let mut errors = Vec::new();
    if product_name.trim().is_empty() {
        errors.push(RowError::EmptyProductName);
    }
    errors.extend(validate_url(url));
    Validation {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Map, format and validate one raw record.
///
/// `index` is the record's 0-based position and only feeds the `row-<index>`
/// placeholder id.
pub fn parse_row(raw: RawRow, index: usize, profile: &ProductTypeProfile) -> Row {
    let fields = extract_fields(&raw, profile);
    let product_name = format_product_name(&raw, profile);
    let verdict = validate(&product_name, &fields.url);

    let id = if fields.id.is_empty() {
        format!("row-{index}")
    } else {
        fields.id
    };

    Row {
        id,
        product_name,
        url: fields.url,
        raw_fields: raw,
        is_valid: verdict.is_valid,
        errors: verdict.errors,
        is_excluded: false,
        product_type: profile.id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(fields: &[&str]) -> RawRow {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn url_checks() {
        assert_eq!(validate_url(""), vec![RowError::EmptyUrl]);
        assert_eq!(validate_url("   "), vec![RowError::EmptyUrl]);
        assert_eq!(validate_url("ftp://x"), vec![RowError::InvalidUrlScheme]);
        assert_eq!(validate_url("http://"), vec![RowError::InvalidUrlScheme]);
        assert!(validate_url("http://x").is_empty());
        assert!(validate_url("HTTPS://Example.com/a").is_empty());
    }

    #[test]
    fn both_findings_accumulate() {
        let v = validate("  ", "ftp://x");
        assert!(!v.is_valid);
        assert_eq!(
            v.errors,
            vec![RowError::EmptyProductName, RowError::InvalidUrlScheme]
        );
    }

    #[test]
    fn parse_valid_plyty_row() {
        let plyty = ProductTypeProfile::lookup("plyty").unwrap();
        let row = parse_row(
            raw(&["007", "0110_SM_2800x2070_18", "", "", "BIAŁY KORPUSOWY", "http://x/y"]),
            0,
            plyty,
        );
        assert_eq!(row.id, "007");
        assert_eq!(row.product_name, "Biały Korpusowy 0110 SM");
        assert_eq!(row.url, "http://x/y");
        assert!(row.is_valid);
        assert!(row.errors.is_empty());
        assert!(!row.is_excluded);
        assert_eq!(row.product_type, "plyty");
    }

    #[test]
    fn empty_id_gets_placeholder() {
        let plyty = ProductTypeProfile::lookup("plyty").unwrap();
        let row = parse_row(raw(&["", "A_B", "", "", "C", "http://x"]), 4, plyty);
        assert_eq!(row.id, "row-4");
    }

    #[test]
    fn short_row_is_invalid_not_an_error() {
        let plyty = ProductTypeProfile::lookup("plyty").unwrap();
        let row = parse_row(raw(&["1"]), 0, plyty);
        assert!(!row.is_valid);
        assert_eq!(
            row.error_messages(),
            vec!["empty product name".to_string(), "URL is empty".to_string()]
        );
    }
}
