//! Generation entry points: annotated rows → PDF or DOCX bytes.
//!
//! Pages are produced strictly one after another on the calling thread, so
//! progress events arrive in page order and a failing card stops the run
//! before any later page is started.

use crate::config::GenerationConfig;
use crate::error::CardsError;
use crate::output::{GenerationOutput, GenerationStats};
use crate::pipeline::layout::LayoutPlan;
use crate::render::{self, qr, Card, CardSlot, CARD_PADDING_MM};
use crate::row::{eligible_rows, Row};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Render every eligible row as a card.
///
/// # Arguments
/// * `rows`: the imported list; invalid and excluded rows are skipped
/// * `config`: sizes, layout policy, output format, progress callback
///
/// # Errors
/// [`CardsError::NoEligibleRows`] when nothing is both valid and included
/// (checked before any layout work), [`CardsError::QrEncodeFailed`] for the
/// first URL that will not encode, and [`CardsError::RenderFailed`] from the
/// document backend.
pub fn generate(rows: &[Row], config: &GenerationConfig) -> Result<GenerationOutput, CardsError> {
    let total_start = Instant::now();

    let cards = eligible_rows(rows);
    if cards.is_empty() {
        return Err(CardsError::NoEligibleRows { total: rows.len() });
    }

    let plan = LayoutPlan::compute(
        config.geometry,
        config.policy,
        config.effective_card_height(),
        cards.len(),
    )?;
    info!(
        "Generating {}: {} cards on {} pages ({} per page, {:.2} × {:.2} mm)",
        config.format.extension().to_uppercase(),
        plan.card_count,
        plan.total_pages,
        plan.cards_per_page,
        plan.card_width,
        plan.card_height
    );

    if config.qr_size + 2.0 * CARD_PADDING_MM > plan.card_height {
        warn!(
            "QR code of {} mm plus padding exceeds the {:.2} mm card height; cards will overlap",
            config.qr_size, plan.card_height
        );
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_start(plan.total_pages, plan.card_count);
    }

    let mut renderer = render::renderer_for(config, &plan)?;

    for page in plan.paginate(&cards) {
        let page_num = page.index + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, plan.total_pages);
        }

        renderer.begin_page(page.index)?;
        for placement in &page.placements {
            let row: &Row = placement.item;
            let code = qr::rasterize(&row.url, config.qr_size).map_err(|e| {
                CardsError::QrEncodeFailed {
                    row_id: row.id.clone(),
                    detail: e.to_string(),
                }
            })?;
            let slot = CardSlot {
                slot: placement.slot,
                row: placement.row,
                column: placement.column,
                x: placement.x,
                y: placement.y,
            };
            renderer.draw_card(&Card { row, qr: &code }, &slot)?;
        }
        renderer.end_page(page.index)?;

        debug!(
            "Page {}/{}: {} cards",
            page_num,
            plan.total_pages,
            page.placements.len()
        );
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(page_num, plan.total_pages, page.placements.len());
        }
    }

    let bytes = renderer.finish()?;

    let stats = GenerationStats {
        total_pages: plan.total_pages,
        total_cards: plan.card_count,
        skipped_rows: rows.len() - plan.card_count,
        output_bytes: bytes.len(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Generation complete: {} pages, {} bytes, {}ms",
        stats.total_pages, stats.output_bytes, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_complete(plan.total_pages, bytes.len());
    }

    Ok(GenerationOutput {
        format: config.format,
        bytes,
        plan,
        stats,
    })
}

/// Generate a document and write it to `output_path`.
///
/// Uses atomic write (temp file + rename) so a failed run never leaves a
/// truncated document behind.
pub fn generate_to_file(
    rows: &[Row],
    output_path: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<GenerationStats, CardsError> {
    let output = generate(rows, config)?;
    let path = output_path.as_ref();
    let write_err = |source| CardsError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent).map_err(write_err)?;
            parent
        }
        None => Path::new("."),
    };

    // The temp file lives next to the target so the final rename never
    // crosses a filesystem boundary.
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(&output.bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    info!("Wrote {}", path.display());
    Ok(output.stats)
}
