//! Field mapping: pull semantic values out of a raw record via a profile.
//!
//! Missing fields never fail here; they come back as empty strings and the
//! validator decides what that means.

use crate::pipeline::input::RawRow;
use crate::profile::{NameFormat, ProductTypeProfile};

/// The values a profile selects from one raw record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub id: String,
    pub raw_product_name: String,
    pub color_name: String,
    pub url: String,
}

fn field(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Pick id, raw name, colour and URL at the profile's indices.
pub fn extract_fields(row: &RawRow, profile: &ProductTypeProfile) -> ExtractedFields {
    let f = &profile.fields;
    ExtractedFields {
        id: field(row, f.id).to_string(),
        raw_product_name: field(row, f.product_name).to_string(),
        color_name: field(row, f.color).to_string(),
        url: field(row, f.url).to_string(),
    }
}

/// Build the display name for a record.
///
/// For [`NameFormat::ColorCodeType`]: when both the raw name and the colour
/// are non-empty and the raw name splits on `_` into at least two parts, the
/// result is `"<Title Cased Color> <part0> <part1>"`. Otherwise the raw name
/// is returned verbatim, possibly empty.
pub fn format_product_name(row: &RawRow, profile: &ProductTypeProfile) -> String {
    let raw_name = field(row, profile.fields.product_name);
    match profile.format {
        NameFormat::ColorCodeType => {
            let color = field(row, profile.fields.color);
            if raw_name.is_empty() || color.is_empty() {
                return raw_name.to_string();
            }
            let mut parts = raw_name.split('_');
            match (parts.next(), parts.next()) {
                (Some(code), Some(kind)) => {
                    format!("{} {} {}", title_case(color), code, kind)
                }
                _ => raw_name.to_string(),
            }
        }
    }
}

/// Upper-case the first character of each space-separated word and
/// lower-case the rest. Runs of spaces are preserved.
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
