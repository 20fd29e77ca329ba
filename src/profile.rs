//! Product-type profiles: which raw field holds which value.
//!
//! Every supported product family ships its lists in a slightly different
//! column order, but all of them are formatted the same way. A profile is
//! therefore pure data: a set of field indices plus a [`NameFormat`] tag that
//! selects the shared formatting algorithm in [`crate::pipeline::mapper`].
//!
//! Profiles are selected once per import and never change afterwards.

use crate::error::CardsError;
use serde::{Deserialize, Serialize};

/// Zero-based raw field positions for one product family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIndices {
    /// Row identifier. Rows with an empty id get a `row-<index>` placeholder.
    pub id: usize,
    /// Raw product name, e.g. `0110_SM_2800x2070_18`.
    pub product_name: usize,
    /// Colour name, e.g. `BIAŁY KORPUSOWY`.
    pub color: usize,
    /// Target URL encoded in the QR code.
    pub url: usize,
    /// Base product code used as the second duplicate key.
    pub product_code: usize,
}

/// How the display name is built from the raw fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameFormat {
    /// `"<Title Cased Color> <code> <type>"` from a `code_type_…` raw name,
    /// falling back to the raw name verbatim.
    #[default]
    ColorCodeType,
}

/// A named product-type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductTypeProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub fields: FieldIndices,
    pub format: NameFormat,
}

/// Identifier of the profile used when none is chosen.
pub const DEFAULT_PRODUCT_TYPE: &str = "plyty";

/// Built-in profiles, in the order they are offered to the user.
pub static BUILTIN_PROFILES: &[ProductTypeProfile] = &[
    ProductTypeProfile {
        id: "plyty",
        name: "Płyty",
        description: "Nazwa produktu (indeks 1), Kolor (indeks 4), URL (indeks 5)",
        fields: FieldIndices {
            id: 0,
            product_name: 1,
            color: 4,
            url: 5,
            product_code: 1,
        },
        format: NameFormat::ColorCodeType,
    },
    ProductTypeProfile {
        id: "blaty",
        name: "Blaty",
        description: "Kod produktu (indeks 1), Kolor (indeks 5), URL (indeks 6)",
        fields: FieldIndices {
            id: 0,
            product_name: 1,
            color: 5,
            url: 6,
            product_code: 1,
        },
        format: NameFormat::ColorCodeType,
    },
];

impl ProductTypeProfile {
    /// Look up a built-in profile by identifier (case-insensitive).
    pub fn lookup(id: &str) -> Result<&'static ProductTypeProfile, CardsError> {
        let wanted = id.trim();
        BUILTIN_PROFILES
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CardsError::UnknownProductType {
                id: id.to_string(),
                known: known_ids().join(", "),
            })
    }

    /// The profile used when the caller does not choose one.
    pub fn default_profile() -> &'static ProductTypeProfile {
        &BUILTIN_PROFILES[0]
    }
}

/// Identifiers of every built-in profile.
pub fn known_ids() -> Vec<&'static str> {
    BUILTIN_PROFILES.iter().map(|p| p.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_profiles() {
        let plyty = ProductTypeProfile::lookup("plyty").unwrap();
        assert_eq!(plyty.fields.color, 4);
        assert_eq!(plyty.fields.url, 5);

        let blaty = ProductTypeProfile::lookup("BLATY").unwrap();
        assert_eq!(blaty.fields.color, 5);
        assert_eq!(blaty.fields.url, 6);
    }

    #[test]
    fn lookup_unknown_profile_fails() {
        let err = ProductTypeProfile::lookup("drzwi").unwrap_err();
        assert!(matches!(err, CardsError::UnknownProductType { .. }));
        assert!(err.to_string().contains("plyty"));
    }

    #[test]
    fn default_profile_is_plyty() {
        assert_eq!(ProductTypeProfile::default_profile().id, DEFAULT_PRODUCT_TYPE);
    }

    #[test]
    fn builtin_profiles_share_product_code_field() {
        let first = BUILTIN_PROFILES[0].fields.product_code;
        assert!(BUILTIN_PROFILES
            .iter()
            .all(|p| p.fields.product_code == first));
    }
}
