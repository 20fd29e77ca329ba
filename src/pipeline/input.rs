//! Input: read a product list from disk and split it into raw records.
//!
//! Product lists arrive as spreadsheet exports, sometimes tab-separated and
//! sometimes comma-separated, with no header convention. The delimiter is
//! guessed from the first line; every record is kept as an ordered list of
//! text fields with no meaning attached until a profile maps it.

use crate::error::CardsError;
use csv::ReaderBuilder;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// An ordered list of text fields straight from the parsed file.
pub type RawRow = Vec<String>;

const UTF8_BOM: char = '\u{feff}';

/// Read a file and decode it as UTF-8.
///
/// Any failure here is fatal to the import; no partial row list is produced.
pub fn read_text(path: &Path) -> Result<String, CardsError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CardsError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => CardsError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => CardsError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    decode_text(bytes)
}

/// Decode raw bytes as UTF-8 text.
pub fn decode_text(bytes: Vec<u8>) -> Result<String, CardsError> {
    String::from_utf8(bytes).map_err(|e| CardsError::DecodeFailed {
        offset: e.utf8_error().valid_up_to(),
    })
}

/// Guess the delimiter from the first line: tab when it has strictly more
/// tabs than commas, comma otherwise.
pub fn detect_delimiter(text: &str) -> u8 {
    let first_line = text.split('\n').next().unwrap_or("");
    let tabs = first_line.matches('\t').count();
    let commas = first_line.matches(',').count();
    if tabs > commas {
        b'\t'
    } else {
        b','
    }
}

/// Split delimited text into records, skipping empty lines.
///
/// A line of bare delimiters (`,,,`) is not empty and is kept. Records may
/// have differing field counts; short records are handled by the field
/// mapper.
pub fn parse_records(text: &str) -> Result<Vec<RawRow>, CardsError> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let delimiter = detect_delimiter(text);
    debug!(
        "Detected delimiter: {}",
        if delimiter == b'\t' { "tab" } else { "comma" }
    );

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| CardsError::ParseFailed {
            detail: format!("record {}: {}", index + 1, e),
        })?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}
