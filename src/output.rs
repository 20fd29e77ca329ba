//! Result types returned by import and generation.

use crate::config::OutputFormat;
use crate::pipeline::layout::LayoutPlan;
use crate::row::{Row, RowSummary};
use serde::Serialize;

/// The annotated row list produced by an import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutput {
    /// Identifier of the profile used to map the rows.
    pub product_type: String,
    pub rows: Vec<Row>,
    pub summary: RowSummary,
}

/// A finished document.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub format: OutputFormat,
    /// Encoded PDF or DOCX bytes.
    pub bytes: Vec<u8>,
    pub plan: LayoutPlan,
    pub stats: GenerationStats,
}

/// Counters describing a finished generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    pub total_pages: usize,
    pub total_cards: usize,
    /// Rows skipped because they were invalid or excluded.
    pub skipped_rows: usize,
    pub output_bytes: usize,
    pub total_duration_ms: u64,
}
