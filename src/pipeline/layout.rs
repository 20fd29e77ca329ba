//! Layout engine: page geometry and pagination for card grids.
//!
//! Everything here is pure arithmetic over millimetres. The PDF and DOCX
//! renderers consume the same [`LayoutPlan`], so both formats put the same
//! card at the same slot on the same page.
//!
//! ```text
//!  margin  card   gap  card   gap  card  margin
//! |<---->|<---->|<-->|<---->|<-->|<---->|<---->|
//!         slot 0       slot 1      slot 2          row 0
//!         slot 3       slot 4      slot 5          row 1
//! ```
//!
//! Slots fill row-major: left to right, top to bottom; pages fill in input
//! order.

use crate::config::{LayoutPolicy, PageGeometry};
use crate::error::CardsError;
use serde::Serialize;

// Absorbs float noise such as 5.999999 when a row fits exactly.
const FIT_EPSILON: f64 = 1e-9;

/// Width of one card when `columns` cards and their gaps span the content area.
pub fn card_width(page_width: f64, margin: f64, gap: f64, columns: usize) -> f64 {
    let columns = columns.max(1) as f64;
    (page_width - 2.0 * margin - (columns - 1.0) * gap) / columns
}

/// How many card rows fit between the top and bottom margins.
///
/// `n` rows need only `n - 1` gaps, hence the `+ gap` in the numerator.
pub fn rows_per_page(page_height: f64, margin: f64, gap: f64, card_height: f64) -> usize {
    let fit = (page_height - 2.0 * margin + gap) / (card_height + gap);
    if fit.is_finite() && fit > 0.0 {
        (fit + FIT_EPSILON).floor() as usize
    } else {
        0
    }
}

pub fn cards_per_page(rows_per_page: usize, columns: usize) -> usize {
    rows_per_page * columns
}

/// `ceil(card_count / cards_per_page)`. Zero cards give zero pages; callers
/// must reject that case before laying anything out.
pub fn total_pages(card_count: usize, cards_per_page: usize) -> usize {
    if cards_per_page == 0 {
        return 0;
    }
    card_count.div_ceil(cards_per_page)
}

/// Top-left corner of page-local slot `index`, in mm.
pub fn slot_origin(
    index: usize,
    columns: usize,
    margin: f64,
    card_width: f64,
    card_height: f64,
    column_gap: f64,
    row_gap: f64,
) -> (f64, f64) {
    let columns = columns.max(1);
    let row = index / columns;
    let col = index % columns;
    (
        margin + col as f64 * (card_width + column_gap),
        margin + row as f64 * (card_height + row_gap),
    )
}

/// Grid dimensions for one document, derived from settings and card count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutPlan {
    pub geometry: PageGeometry,
    pub policy: LayoutPolicy,
    pub card_width: f64,
    pub card_height: f64,
    pub columns: usize,
    pub column_gap: f64,
    pub row_gap: f64,
    pub rows_per_page: usize,
    pub cards_per_page: usize,
    pub card_count: usize,
    pub total_pages: usize,
}

/// One card's position on its page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement<'a, T> {
    pub item: &'a T,
    /// Page-local slot index (row-major).
    pub slot: usize,
    pub row: usize,
    pub column: usize,
    pub x: f64,
    pub y: f64,
}

/// Cards on one page, in slot order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagePlan<'a, T> {
    /// 0-based page index.
    pub index: usize,
    pub placements: Vec<Placement<'a, T>>,
}

impl LayoutPlan {
    /// Compute the grid for `card_count` cards.
    ///
    /// `card_height` is the configured height; [`LayoutPolicy::FixedRows`]
    /// overrides it with its own.
    ///
    /// # Errors
    /// [`CardsError::NoEligibleRows`] when `card_count` is zero, and
    /// [`CardsError::InvalidConfig`] when the card height is not a positive
    /// finite value or not a single row fits on the page.
    pub fn compute(
        geometry: PageGeometry,
        policy: LayoutPolicy,
        card_height: f64,
        card_count: usize,
    ) -> Result<Self, CardsError> {
        if card_count == 0 {
            return Err(CardsError::NoEligibleRows { total: 0 });
        }

        let requested = match policy {
            LayoutPolicy::GappedRows => card_height,
            LayoutPolicy::FixedRows { card_height, .. } => card_height,
        };
        if !requested.is_finite() || requested <= 0.0 {
            return Err(CardsError::InvalidConfig(format!(
                "Card height must be a positive number of millimetres, got {requested}"
            )));
        }

        let width = card_width(
            geometry.page_width,
            geometry.margin,
            geometry.gap,
            geometry.columns,
        );

        let (card_height, row_gap, rows) = match policy {
            LayoutPolicy::GappedRows => (
                card_height,
                geometry.gap,
                rows_per_page(geometry.page_height, geometry.margin, geometry.gap, card_height),
            ),
            LayoutPolicy::FixedRows { rows, card_height } => (card_height, 0.0, rows),
        };

        if rows == 0 || geometry.columns == 0 || width <= 0.0 {
            return Err(CardsError::InvalidConfig(format!(
                "A {width:.2} × {card_height:.2} mm card does not fit on a {} × {} mm page",
                geometry.page_width, geometry.page_height
            )));
        }

        let per_page = cards_per_page(rows, geometry.columns);
        Ok(Self {
            geometry,
            policy,
            card_width: width,
            card_height,
            columns: geometry.columns,
            column_gap: geometry.gap,
            row_gap,
            rows_per_page: rows,
            cards_per_page: per_page,
            card_count,
            total_pages: total_pages(card_count, per_page),
        })
    }

    /// Top-left corner of page-local slot `index`.
    pub fn slot_origin(&self, index: usize) -> (f64, f64) {
        slot_origin(
            index,
            self.columns,
            self.geometry.margin,
            self.card_width,
            self.card_height,
            self.column_gap,
            self.row_gap,
        )
    }

    /// Split `items` into pages and assign each one a slot.
    ///
    /// Only the first `card_count` items are placed.
    pub fn paginate<'a, T>(&self, items: &'a [T]) -> Vec<PagePlan<'a, T>> {
        let items = &items[..items.len().min(self.card_count)];
        items
            .chunks(self.cards_per_page)
            .enumerate()
            .map(|(index, chunk)| PagePlan {
                index,
                placements: chunk
                    .iter()
                    .enumerate()
                    .map(|(slot, item)| {
                        let (x, y) = self.slot_origin(slot);
                        Placement {
                            item,
                            slot,
                            row: slot / self.columns,
                            column: slot % self.columns,
                            x,
                            y,
                        }
                    })
                    .collect(),
            })
            .collect()
    }
}
