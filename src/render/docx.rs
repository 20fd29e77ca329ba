//! DOCX backend built on docx-rs.
//!
//! Word has no absolute positioning worth relying on, so each page is one
//! borderless table: card columns alternate with spacer columns of the gap
//! width, and under [`LayoutPolicy::GappedRows`] card rows alternate with
//! spacer rows. Every row has an exact height so the grid cannot grow. Pages
//! are separated by explicit page breaks.
//!
//! [`LayoutPolicy::GappedRows`]: crate::config::LayoutPolicy::GappedRows

use super::{
    text_width, Card, CardSlot, DocumentRenderer, CAPTION_FONT_PT, CAPTION_TEXT,
    CARD_PADDING_MM, LABEL_FONT_PT, TEXT_SPACING_MM,
};
use crate::config::GenerationConfig;
use crate::error::CardsError;
use crate::pipeline::layout::LayoutPlan;
use docx_rs::{
    BreakType, Docx, HeightRule, LineSpacing, PageMargin, Paragraph, Pic, Run,
    Table, TableCell, TableRow, VAlignType, WidthType,
};
use std::io::Cursor;
use tracing::debug;

/// Space above the caption paragraph, in twips.
const CAPTION_SPACING_TWIPS: u32 = 75;

const CAPTION_COLOR: &str = "666666";

/// 1 twip = 1/1440 inch.
pub fn mm_to_twips(mm: f64) -> usize {
    ((mm / 25.4) * 1440.0).round().max(0.0) as usize
}

/// 1 mm = 36 000 English Metric Units.
pub fn mm_to_emu(mm: f64) -> u32 {
    (mm * 36_000.0).round().max(0.0) as u32
}

fn half_points(pt: f64) -> usize {
    (pt * 2.0).round() as usize
}

fn empty_cell(width_mm: f64) -> TableCell {
    TableCell::new()
        .width(mm_to_twips(width_mm), WidthType::Dxa)
        .add_paragraph(Paragraph::new())
}

fn exact_row(cells: Vec<TableCell>, height_mm: f64) -> TableRow {
    TableRow::new(cells)
        .row_height(mm_to_twips(height_mm) as f32)
        .height_rule(HeightRule::Exact)
}

/// Renders cards into an in-memory docx-rs document.
pub struct DocxRenderer {
    plan: LayoutPlan,
    qr_size: f64,
    text_width: f64,
    pages: Vec<Table>,
    cells: Vec<Option<TableCell>>,
    current_page: Option<usize>,
}

impl DocxRenderer {
    pub fn new(config: &GenerationConfig, plan: &LayoutPlan) -> Self {
        Self {
            plan: *plan,
            qr_size: config.qr_size,
            text_width: text_width(plan.card_width, config.qr_size),
            pages: Vec::with_capacity(plan.total_pages),
            cells: Vec::new(),
            current_page: None,
        }
    }

    fn page_number(&self) -> usize {
        self.current_page.map_or(0, |p| p + 1)
    }

    /// Card contents: a nested table holding the QR code and the text column,
    /// inset by the card padding.
    fn card_cell(&self, card: &Card<'_>) -> Result<TableCell, CardsError> {
        let png = card.qr.to_png().map_err(|e| CardsError::RenderFailed {
            page: self.page_number(),
            detail: format!("PNG encoding for row {}: {e}", card.row.id),
        })?;
        let qr_emu = mm_to_emu(self.qr_size);
        let pic = Pic::new(&png).size(qr_emu, qr_emu);

        let qr_column = self.qr_size + TEXT_SPACING_MM;
        let qr_cell = TableCell::new()
            .width(mm_to_twips(qr_column), WidthType::Dxa)
            .vertical_align(VAlignType::Top)
            .add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic)));

        let label = Run::new()
            .add_text(&card.row.product_name)
            .bold()
            .size(half_points(LABEL_FONT_PT));
        let caption = Run::new()
            .add_text(CAPTION_TEXT)
            .size(half_points(CAPTION_FONT_PT))
            .color(CAPTION_COLOR);
        let text_cell = TableCell::new()
            .width(mm_to_twips(self.text_width), WidthType::Dxa)
            .vertical_align(VAlignType::Top)
            .add_paragraph(Paragraph::new().add_run(label))
            .add_paragraph(
                Paragraph::new()
                    .line_spacing(LineSpacing::new().before(CAPTION_SPACING_TWIPS))
                    .add_run(caption),
            );

        let inner = Table::without_borders(vec![
            exact_row(
                vec![
                    empty_cell(CARD_PADDING_MM),
                    empty_cell(qr_column),
                    empty_cell(self.text_width),
                ],
                CARD_PADDING_MM,
            ),
            TableRow::new(vec![empty_cell(CARD_PADDING_MM), qr_cell, text_cell]),
        ])
        .set_grid(vec![
            mm_to_twips(CARD_PADDING_MM),
            mm_to_twips(qr_column),
            mm_to_twips(self.text_width),
        ]);

        Ok(TableCell::new()
            .width(mm_to_twips(self.plan.card_width), WidthType::Dxa)
            .vertical_align(VAlignType::Top)
            .add_table(inner)
            .add_paragraph(Paragraph::new()))
    }

    /// Assemble the page table from the collected card cells. Slots without
    /// a card become empty cells so every row keeps its full width.
    fn page_table(&mut self) -> Table {
        let plan = self.plan;
        let gapped = plan.row_gap > 0.0;
        let mut slots = std::mem::take(&mut self.cells).into_iter();
        let mut rows = Vec::with_capacity(plan.rows_per_page * 2);

        for r in 0..plan.rows_per_page {
            if r > 0 && gapped {
                let spacers = (0..plan.columns * 2 - 1)
                    .map(|c| {
                        empty_cell(if c % 2 == 0 {
                            plan.card_width
                        } else {
                            plan.column_gap
                        })
                    })
                    .collect();
                rows.push(exact_row(spacers, plan.row_gap));
            }

            let mut cells = Vec::with_capacity(plan.columns * 2 - 1);
            for c in 0..plan.columns {
                if c > 0 {
                    cells.push(empty_cell(plan.column_gap));
                }
                let cell = slots
                    .next()
                    .flatten()
                    .unwrap_or_else(|| empty_cell(plan.card_width));
                cells.push(cell);
            }
            rows.push(exact_row(cells, plan.card_height));
        }

        let grid = (0..plan.columns * 2 - 1)
            .map(|c| {
                mm_to_twips(if c % 2 == 0 {
                    plan.card_width
                } else {
                    plan.column_gap
                })
            })
            .collect();
        Table::without_borders(rows).set_grid(grid)
    }
}

impl DocumentRenderer for DocxRenderer {
    fn begin_page(&mut self, page_index: usize) -> Result<(), CardsError> {
        self.current_page = Some(page_index);
        self.cells = (0..self.plan.cards_per_page).map(|_| None).collect();
        Ok(())
    }

    fn draw_card(&mut self, card: &Card<'_>, slot: &CardSlot) -> Result<(), CardsError> {
        if self.current_page.is_none() {
            return Err(CardsError::Internal(
                "draw_card called before begin_page".into(),
            ));
        }
        let cell = self.card_cell(card)?;
        let per_page = self.plan.cards_per_page;
        let target = self.cells.get_mut(slot.slot).ok_or_else(|| {
            CardsError::Internal(format!(
                "slot {} outside a {per_page}-card page",
                slot.slot
            ))
        })?;
        *target = Some(cell);
        Ok(())
    }

    fn end_page(&mut self, page_index: usize) -> Result<(), CardsError> {
        let table = self.page_table();
        self.pages.push(table);
        debug!("DOCX page {} assembled", page_index + 1);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>, CardsError> {
        let geometry = self.plan.geometry;
        let margin = mm_to_twips(geometry.margin) as i32;
        let page_count = self.pages.len();

        let mut docx = Docx::new()
            .page_size(
                mm_to_twips(geometry.page_width) as u32,
                mm_to_twips(geometry.page_height) as u32,
            )
            .page_margin(
                PageMargin::new()
                    .top(margin)
                    .bottom(margin)
                    .left(margin)
                    .right(margin),
            );

        for (i, table) in self.pages.into_iter().enumerate() {
            docx = docx.add_table(table);
            if i + 1 < page_count {
                docx = docx.add_paragraph(
                    Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
                );
            }
        }

        let mut buf = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buf)
            .map_err(|e| CardsError::RenderFailed {
                page: page_count,
                detail: format!("DOCX packaging: {e}"),
            })?;
        Ok(buf.into_inner())
    }
}
