//! Import entry points: product list → annotated rows.
//!
//! ```text
//! read → decode → detect delimiter → parse → map + validate → dedup → summary
//! ```
//!
//! A fatal problem (missing file, bad encoding, unknown product type) aborts
//! with a [`CardsError`]. Everything row-level is recorded on the row itself,
//! so one bad line never costs the rest of the file.

use crate::error::CardsError;
use crate::output::ImportOutput;
use crate::pipeline::{dedup, input, validate};
use crate::profile::ProductTypeProfile;
use crate::row::{Row, RowSummary, LARGE_IMPORT_ROWS};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Import a CSV/TSV product list from disk.
///
/// # Arguments
/// * `path`: delimited text file, UTF-8
/// * `product_type`: profile identifier, e.g. `"plyty"` or `"blaty"`
///
/// # Errors
/// [`CardsError::UnknownProductType`] before the file is touched, then any
/// read, decode or parse failure.
pub fn import_file(
    path: impl AsRef<Path>,
    product_type: &str,
) -> Result<ImportOutput, CardsError> {
    let path = path.as_ref();
    let profile = ProductTypeProfile::lookup(product_type)?;
    info!("Importing {} as '{}'", path.display(), profile.id);
    let text = input::read_text(path)?;
    import_with_profile(&text, profile)
}

/// Import product-list text that is already in memory.
pub fn import_str(text: &str, product_type: &str) -> Result<ImportOutput, CardsError> {
    let profile = ProductTypeProfile::lookup(product_type)?;
    import_with_profile(text, profile)
}

fn import_with_profile(
    text: &str,
    profile: &'static ProductTypeProfile,
) -> Result<ImportOutput, CardsError> {
    let start = Instant::now();
    let records = input::parse_records(text)?;

    let rows: Vec<Row> = records
        .into_iter()
        .enumerate()
        .map(|(index, raw)| validate::parse_row(raw, index, profile))
        .collect();
    let rows = dedup::deduplicate_by(rows, profile.fields.product_code);

    let summary = RowSummary::of(&rows);
    if summary.total > LARGE_IMPORT_ROWS {
        warn!(
            "Imported {} rows; more than {} may slow down generation",
            summary.total, LARGE_IMPORT_ROWS
        );
    }
    info!(
        "Imported {} rows ({} valid, {} invalid, {} excluded) in {}ms",
        summary.total,
        summary.valid,
        summary.invalid,
        summary.excluded,
        start.elapsed().as_millis()
    );

    Ok(ImportOutput {
        product_type: profile.id.to_string(),
        rows,
        summary,
    })
}
