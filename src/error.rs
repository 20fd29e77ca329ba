//! Error types for the qrcards library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`CardsError`] is **fatal**: the import or the generation cannot proceed
//!   at all (unreadable file, unknown product type, nothing eligible to print,
//!   a QR code that will not encode). Returned as `Err(CardsError)` from the
//!   top-level `import*` and `generate*` functions.
//!
//! * [`RowError`] is **non-fatal**: a single row failed validation or was
//!   flagged as a duplicate. Stored on [`crate::row::Row::errors`] so callers
//!   can show every problem in a preview instead of losing the whole file to
//!   one bad line.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the qrcards library.
///
/// Row-level findings use [`RowError`] and are stored on the row rather than
/// propagated here.
#[derive(Debug, Error)]
pub enum CardsError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Product list not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8 text.
    #[error("Failed to decode product list as UTF-8: invalid byte at offset {offset}")]
    DecodeFailed { offset: usize },

    /// The delimited text could not be parsed into records.
    #[error("Failed to parse product list: {detail}")]
    ParseFailed { detail: String },

    /// No built-in profile has this identifier.
    #[error("Unknown product type '{id}' (known: {known})")]
    UnknownProductType { id: String, known: String },

    // ── Generation errors ─────────────────────────────────────────────────
    /// No row is both valid and included; nothing to lay out.
    #[error("No valid rows to generate document ({total} rows imported, none valid and included)")]
    NoEligibleRows { total: usize },

    /// A card's QR code could not be produced. Aborts the whole document.
    #[error("Failed to generate QR code for row '{row_id}': {detail}")]
    QrEncodeFailed { row_id: String, detail: String },

    /// The document backend rejected a page.
    #[error("Rendering failed on page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// An exclusion toggle pointed past the end of the row list.
    #[error("Row {index} is out of range (list has {total} rows)")]
    RowOutOfRange { index: usize, total: usize },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output document.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal finding on a single row.
///
/// Display strings are the human-readable messages shown next to the row.
/// Validation findings come first in [`crate::row::Row::errors`], duplicate
/// findings are appended after them by the deduplication pass.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowError {
    /// Formatted product name is blank.
    #[error("empty product name")]
    EmptyProductName,

    /// URL field is blank or whitespace-only.
    #[error("URL is empty")]
    EmptyUrl,

    /// URL does not start with `http://` or `https://`.
    #[error("URL must start with http:// or https://")]
    InvalidUrlScheme,

    /// Second-or-later valid row with this URL.
    #[error("duplicate URL (occurrence {occurrence})")]
    DuplicateUrl { occurrence: usize },

    /// Second-or-later valid row with this product code.
    #[error("duplicate product code (occurrence {occurrence})")]
    DuplicateProductCode { occurrence: usize },
}

impl RowError {
    /// True for findings produced by the deduplication pass.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            RowError::DuplicateUrl { .. } | RowError::DuplicateProductCode { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_eligible_rows_display() {
        let e = CardsError::NoEligibleRows { total: 12 };
        let msg = e.to_string();
        assert!(msg.contains("No valid rows"), "got: {msg}");
        assert!(msg.contains("12"), "got: {msg}");
    }

    #[test]
    fn qr_encode_failed_display() {
        let e = CardsError::QrEncodeFailed {
            row_id: "007".into(),
            detail: "data too long".into(),
        };
        assert!(e.to_string().contains("007"));
        assert!(e.to_string().contains("data too long"));
    }

    #[test]
    fn unknown_product_type_lists_known() {
        let e = CardsError::UnknownProductType {
            id: "drzwi".into(),
            known: "plyty, blaty".into(),
        };
        assert!(e.to_string().contains("drzwi"));
        assert!(e.to_string().contains("plyty, blaty"));
    }

    #[test]
    fn row_error_messages() {
        assert_eq!(RowError::EmptyProductName.to_string(), "empty product name");
        assert_eq!(RowError::EmptyUrl.to_string(), "URL is empty");
        assert_eq!(
            RowError::InvalidUrlScheme.to_string(),
            "URL must start with http:// or https://"
        );
        assert_eq!(
            RowError::DuplicateUrl { occurrence: 2 }.to_string(),
            "duplicate URL (occurrence 2)"
        );
        assert_eq!(
            RowError::DuplicateProductCode { occurrence: 3 }.to_string(),
            "duplicate product code (occurrence 3)"
        );
    }

    #[test]
    fn duplicate_classification() {
        assert!(RowError::DuplicateUrl { occurrence: 2 }.is_duplicate());
        assert!(!RowError::EmptyUrl.is_duplicate());
    }
}
