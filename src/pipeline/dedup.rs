//! Duplicate detection over the whole imported list.
//!
//! Two keys are tracked: the URL and the base product code (a raw field at a
//! fixed index shared by all built-in profiles). The first valid row carrying
//! a key wins; every later valid row with the same key is annotated and
//! excluded. Invalid rows are skipped entirely and never occupy a key slot.
//!
//! Re-running the pass over its own output is a no-op: a finding already on
//! a row is neither appended twice nor re-applied to the exclusion flag, so a
//! user who re-included a duplicate by hand keeps that choice.

use crate::error::RowError;
use crate::profile::ProductTypeProfile;
use crate::row::Row;
use std::collections::HashMap;
use tracing::debug;

/// Annotate duplicate rows. Same order and length as the input.
///
/// `product_code_index` is the raw field holding the product code; see
/// [`deduplicate`] for the built-in default.
pub fn deduplicate_by(mut rows: Vec<Row>, product_code_index: usize) -> Vec<Row> {
    let mut url_seen: HashMap<String, usize> = HashMap::new();
    let mut code_seen: HashMap<String, usize> = HashMap::new();
    let mut flagged = 0usize;

    for row in rows.iter_mut().filter(|r| r.is_valid) {
        let mut findings = Vec::with_capacity(2);

        let url_count = url_seen.entry(row.url.clone()).or_insert(0);
        *url_count += 1;
        if *url_count > 1 {
            findings.push(RowError::DuplicateUrl {
                occurrence: *url_count,
            });
        }

        let code = row.raw_field(product_code_index).trim().to_string();
        if !code.is_empty() {
            let code_count = code_seen.entry(code).or_insert(0);
            *code_count += 1;
            if *code_count > 1 {
                findings.push(RowError::DuplicateProductCode {
                    occurrence: *code_count,
                });
            }
        }

        for finding in findings {
            if row.errors.contains(&finding) {
                continue;
            }
            row.errors.push(finding);
            row.is_excluded = true;
            flagged += 1;
        }
    }

    debug!("Deduplication flagged {} findings", flagged);
    rows
}

/// Annotate duplicate rows using the product-code field of the built-in
/// profiles.
pub fn deduplicate(rows: Vec<Row>) -> Vec<Row> {
    let code_index = ProductTypeProfile::default_profile().fields.product_code;
    deduplicate_by(rows, code_index)
}
