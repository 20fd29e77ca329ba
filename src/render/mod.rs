//! Document renderers: draw laid-out cards into a concrete file format.
//!
//! The generator owns pagination; a renderer only ever sees "start page N",
//! "draw this card in this slot" and "finish". Both backends therefore share
//! the exact same page/slot assignment from [`crate::pipeline::layout`].
//!
//! ```text
//! ┌──────────────────────── card (width × height) ───────┐
//! │ pad                                                  │
//! │   ┌────────┐  gap  Biały Korpusowy 0110 SM   (10 pt) │
//! │   │  QR    │                                         │
//! │   │        │       zeskanuj, aby poznać…      (7 pt) │
//! │   └────────┘                                         │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! 1. [`qr`]: rasterise the card URL (the only per-card step that can fail)
//! 2. [`pdf`]: printpdf backend, absolute positioning in mm
//! 3. [`docx`]: docx-rs backend, one fixed-height table per page

pub mod docx;
pub mod pdf;
pub mod qr;

use crate::config::{GenerationConfig, OutputFormat};
use crate::error::CardsError;
use crate::pipeline::layout::LayoutPlan;
use crate::row::Row;
use qr::QrImage;

/// Inner padding between the card edge and the QR code, in mm.
pub const CARD_PADDING_MM: f64 = 4.0;

/// Horizontal space between the QR code and the label, in mm.
pub const TEXT_SPACING_MM: f64 = 6.0;

/// Product label size, in points.
pub const LABEL_FONT_PT: f64 = 10.0;

/// Caption size, in points.
pub const CAPTION_FONT_PT: f64 = 7.0;

/// Caption printed under every product label.
pub const CAPTION_TEXT: &str = "zeskanuj, aby poznać szczegóły i cenę";

/// Caption colour (#666666).
pub const CAPTION_GREY: (u8, u8, u8) = (0x66, 0x66, 0x66);

/// Everything a renderer needs to draw one card.
#[derive(Debug, Clone, Copy)]
pub struct Card<'a> {
    pub row: &'a Row,
    pub qr: &'a QrImage,
}

/// Where a card goes: grid position and top-left corner in page mm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSlot {
    pub slot: usize,
    pub row: usize,
    pub column: usize,
    pub x: f64,
    pub y: f64,
}

/// A document backend.
///
/// Calls arrive in strict order: `begin_page(0)`, `draw_card`…, `end_page(0)`,
/// `begin_page(1)`, …, `finish`. A returned error aborts the document.
pub trait DocumentRenderer {
    fn begin_page(&mut self, page_index: usize) -> Result<(), CardsError>;

    fn draw_card(&mut self, card: &Card<'_>, slot: &CardSlot) -> Result<(), CardsError>;

    fn end_page(&mut self, page_index: usize) -> Result<(), CardsError> {
        let _ = page_index;
        Ok(())
    }

    /// Encode the finished document.
    fn finish(self: Box<Self>) -> Result<Vec<u8>, CardsError>;
}

/// Width left for the label and caption to the right of the QR code.
pub fn text_width(card_width: f64, qr_size: f64) -> f64 {
    (card_width - qr_size - TEXT_SPACING_MM - 2.0 * CARD_PADDING_MM).max(0.0)
}

/// Create the backend for the configured output format.
pub fn renderer_for(
    config: &GenerationConfig,
    plan: &LayoutPlan,
) -> Result<Box<dyn DocumentRenderer>, CardsError> {
    Ok(match config.format {
        OutputFormat::Pdf => Box::new(pdf::PdfRenderer::new(config, plan)?),
        OutputFormat::Docx => Box::new(docx::DocxRenderer::new(config, plan)),
    })
}
