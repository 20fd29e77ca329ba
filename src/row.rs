//! The annotated row: one product line after mapping and validation.

use crate::error::{CardsError, RowError};
use serde::{Deserialize, Serialize};

/// Rows above this count trigger a performance warning on import.
pub const LARGE_IMPORT_ROWS: usize = 1000;

/// One product line, derived from a raw record and a profile.
///
/// `is_valid` is fixed at import time. Only `is_excluded` and the tail of
/// `errors` (duplicate findings) change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Value of the profile's id field, or `row-<index>` when that is empty.
    pub id: String,
    /// Display name computed by the profile's formatter.
    pub product_name: String,
    /// URL encoded in the card's QR code.
    pub url: String,
    /// The original record, kept for duplicate-key lookups.
    pub raw_fields: Vec<String>,
    pub is_valid: bool,
    /// Validation findings followed by duplicate findings, in discovery order.
    pub errors: Vec<RowError>,
    /// Withheld from rendering, by deduplication or by the user.
    pub is_excluded: bool,
    /// Identifier of the profile that produced this row.
    pub product_type: String,
}

impl Row {
    /// Human-readable findings, in order.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Valid and not excluded: this row becomes a card.
    pub fn is_eligible(&self) -> bool {
        self.is_valid && !self.is_excluded
    }

    /// Raw field at `index`, or `""` when the record is shorter.
    pub fn raw_field(&self, index: usize) -> &str {
        self.raw_fields.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Counts shown above the preview table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSummary {
    pub total: usize,
    /// Valid and not excluded.
    pub valid: usize,
    pub invalid: usize,
    pub excluded: usize,
}

impl RowSummary {
    pub fn of(rows: &[Row]) -> Self {
        Self {
            total: rows.len(),
            valid: rows.iter().filter(|r| r.is_eligible()).count(),
            invalid: rows.iter().filter(|r| !r.is_valid).count(),
            excluded: rows.iter().filter(|r| r.is_excluded).count(),
        }
    }
}

/// Flip the exclusion flag of the row at `index` (0-based display position).
///
/// Returns the new flag value. Validity is never touched.
pub fn toggle_exclusion(rows: &mut [Row], index: usize) -> Result<bool, CardsError> {
    let total = rows.len();
    let row = rows
        .get_mut(index)
        .ok_or(CardsError::RowOutOfRange { index, total })?;
    row.is_excluded = !row.is_excluded;
    Ok(row.is_excluded)
}

/// Rows that will be rendered, in input order.
pub fn eligible_rows(rows: &[Row]) -> Vec<&Row> {
    rows.iter().filter(|r| r.is_eligible()).collect()
}
