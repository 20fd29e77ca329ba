//! # qrcards
//!
//! Turn a retail product list into printable QR cards.
//!
//! A spreadsheet export (CSV or TSV) describes one product per line. Each
//! line is mapped through a product-type profile, validated, checked for
//! duplicates and finally laid out as a 3-column grid of cards on A4 pages,
//! one QR code and label per card, exported as PDF or DOCX.
//!
//! ## Pipeline Overview
//!
//! ```text
//! CSV/TSV
//!  │
//!  ├─ 1. Input     read, decode UTF-8, detect delimiter, split records
//!  ├─ 2. Map       profile picks id / name / colour / URL, formats label
//!  ├─ 3. Validate  URL scheme + non-empty name, verdict fixed per row
//!  ├─ 4. Dedup     repeated URL or product code → flagged and excluded
//!  ├─ 5. Layout    rows per page, slot positions, page count
//!  └─ 6. Render    QR rasterisation + PDF (printpdf) or DOCX (docx-rs)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qrcards::{generate_to_file, import_file, toggle_exclusion, GenerationConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut import = import_file("products.tsv", "plyty")?;
//!     println!(
//!         "{} rows, {} ready to print",
//!         import.summary.total, import.summary.valid
//!     );
//!
//!     // Put the third row back on the sheet even if it was flagged.
//!     toggle_exclusion(&mut import.rows, 2)?;
//!
//!     let config = GenerationConfig::builder().qr_size(30.0).build()?;
//!     let stats = generate_to_file(&import.rows, "qrcards.pdf", &config)?;
//!     eprintln!("{} cards on {} pages", stats.total_cards, stats.total_pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `qrcards` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! qrcards = { version = "0.1", default-features = false }
//! ```
//!
//! ## Product Types
//!
//! | Id | Name column | Colour column | URL column |
//! |----|-------------|---------------|------------|
//! | `plyty` | 1 | 4 | 5 |
//! | `blaty` | 1 | 5 | 6 |
//!
//! Both take the id from column 0 and the product code from column 1.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod import;
pub mod output;
pub mod pipeline;
pub mod profile;
pub mod progress;
pub mod render;
pub mod row;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationConfig, GenerationConfigBuilder, LayoutPolicy, OutputFormat, PageGeometry};
pub use error::{CardsError, RowError};
pub use generate::{generate, generate_to_file};
pub use import::{import_file, import_str};
pub use output::{GenerationOutput, GenerationStats, ImportOutput};
pub use pipeline::layout::LayoutPlan;
pub use profile::ProductTypeProfile;
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use row::{eligible_rows, toggle_exclusion, Row, RowSummary};
