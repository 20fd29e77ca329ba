//! PDF backend built on printpdf.
//!
//! Cards are positioned absolutely in millimetres. printpdf puts the origin
//! at the bottom-left corner, so every top-down layout coordinate is flipped
//! with `page_height - y` before drawing.

use super::{
    text_width, Card, CardSlot, DocumentRenderer, CAPTION_FONT_PT, CAPTION_GREY, CAPTION_TEXT,
    CARD_PADDING_MM, LABEL_FONT_PT, TEXT_SPACING_MM,
};
use crate::config::GenerationConfig;
use crate::error::CardsError;
use crate::pipeline::layout::LayoutPlan;
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex, PdfLayerReference,
    PdfPageIndex, Px, Rgb,
};
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

const PT_TO_MM: f64 = 0.352_777_78;

/// Average glyph advance as a fraction of the font size.
const AVG_GLYPH_EM: f64 = 0.5;

const LABEL_LINE_HEIGHT: f64 = 1.2;
const CAPTION_LINE_HEIGHT: f64 = 1.3;

/// Label baseline offset below the top of the QR code.
const LABEL_BASELINE_MM: f64 = 3.0;

/// Caption baseline offset below the first label baseline.
const CAPTION_OFFSET_MM: f64 = 8.0;

const LAYER_NAME: &str = "Cards";

/// Fonts used for every card in one document.
///
/// Loaded once when the document is created and passed to each draw call.
pub struct CardFonts {
    pub label: IndirectFontRef,
    pub caption: IndirectFontRef,
    /// `true` when a TrueType font was embedded, `false` for the built-in
    /// Helvetica fallback.
    pub embedded: bool,
}

impl CardFonts {
    /// Embed the font at `path`, or fall back to built-in Helvetica.
    ///
    /// A font that cannot be read or parsed is logged and skipped; only a
    /// failure to register the built-in fallback is an error.
    pub fn load(doc: &PdfDocumentReference, path: Option<&Path>) -> Result<Self, CardsError> {
        if let Some(path) = path {
            match File::open(path)
                .map_err(|e| e.to_string())
                .and_then(|f| doc.add_external_font(f).map_err(|e| e.to_string()))
            {
                Ok(font) => {
                    debug!("Embedded font {}", path.display());
                    return Ok(Self {
                        label: font.clone(),
                        caption: font,
                        embedded: true,
                    });
                }
                Err(e) => warn!(
                    "Could not load font {}: {}; falling back to Helvetica",
                    path.display(),
                    e
                ),
            }
        }

        let builtin = |font: BuiltinFont| {
            doc.add_builtin_font(font)
                .map_err(|e| CardsError::RenderFailed {
                    page: 0,
                    detail: format!("built-in font: {e}"),
                })
        };
        Ok(Self {
            label: builtin(BuiltinFont::HelveticaBold)?,
            caption: builtin(BuiltinFont::Helvetica)?,
            embedded: false,
        })
    }
}

/// Greedy word wrap using an average glyph width estimate.
///
/// Words wider than `max_width_mm` on their own are broken between
/// characters so no line overflows the text column.
pub fn wrap_text(text: &str, max_width_mm: f64, font_pt: f64) -> Vec<String> {
    let glyph_mm = font_pt * AVG_GLYPH_EM * PT_TO_MM;
    let max_chars = ((max_width_mm / glyph_mm).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        let needed = if current_len == 0 {
            chars.len()
        } else {
            current_len + 1 + chars.len()
        };
        if needed <= max_chars {
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(chars.iter());
            current_len += chars.len();
            continue;
        }

        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
        }
        while chars.len() > max_chars {
            let rest = chars.split_off(max_chars);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }
        current_len = chars.len();
        current = chars.into_iter().collect();
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Renders cards into an in-memory printpdf document.
pub struct PdfRenderer {
    doc: PdfDocumentReference,
    first_page: (PdfPageIndex, PdfLayerIndex),
    layer: Option<PdfLayerReference>,
    current_page: usize,
    fonts: CardFonts,
    page_width: f64,
    page_height: f64,
    text_width: f64,
    qr_size: f64,
}

impl PdfRenderer {
    pub fn new(config: &GenerationConfig, plan: &LayoutPlan) -> Result<Self, CardsError> {
        let page_width = plan.geometry.page_width;
        let page_height = plan.geometry.page_height;
        let (doc, page, layer) = PdfDocument::new(
            "QR cards",
            Mm(page_width as f32),
            Mm(page_height as f32),
            LAYER_NAME,
        );
        let fonts = CardFonts::load(&doc, config.font_path.as_deref())?;
        debug!(
            "PDF renderer ready: {}×{} mm, embedded font: {}",
            page_width, page_height, fonts.embedded
        );

        Ok(Self {
            doc,
            first_page: (page, layer),
            layer: None,
            current_page: 0,
            fonts,
            page_width,
            page_height,
            text_width: text_width(plan.card_width, config.qr_size),
            qr_size: config.qr_size,
        })
    }

    fn flip(&self, y_top: f64) -> Mm {
        Mm((self.page_height - y_top) as f32)
    }

    fn draw_lines(
        &self,
        layer: &PdfLayerReference,
        lines: &[String],
        font: &IndirectFontRef,
        font_pt: f64,
        line_height: f64,
        x: f64,
        first_baseline: f64,
    ) {
        let step = font_pt * line_height * PT_TO_MM;
        for (i, line) in lines.iter().enumerate() {
            layer.use_text(
                line.as_str(),
                font_pt as f32,
                Mm(x as f32),
                self.flip(first_baseline + i as f64 * step),
                font,
            );
        }
    }
}

impl DocumentRenderer for PdfRenderer {
    fn begin_page(&mut self, page_index: usize) -> Result<(), CardsError> {
        let (page, layer) = if page_index == 0 {
            self.first_page
        } else {
            self.doc.add_page(
                Mm(self.page_width as f32),
                Mm(self.page_height as f32),
                LAYER_NAME,
            )
        };
        self.layer = Some(self.doc.get_page(page).get_layer(layer));
        self.current_page = page_index;
        Ok(())
    }

    fn draw_card(&mut self, card: &Card<'_>, slot: &CardSlot) -> Result<(), CardsError> {
        let layer = self.layer.clone().ok_or_else(|| {
            CardsError::Internal("draw_card called before begin_page".into())
        })?;

        let qr_x = slot.x + CARD_PADDING_MM;
        let qr_y = slot.y + CARD_PADDING_MM;

        let (w, h) = card.qr.pixels.dimensions();
        let image = Image::from(ImageXObject {
            width: Px(w as usize),
            height: Px(h as usize),
            color_space: ColorSpace::Greyscale,
            bits_per_component: ColorBits::Bit8,
            interpolate: false,
            image_data: card.qr.pixels.as_raw().clone(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });
        image.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(qr_x as f32)),
                translate_y: Some(self.flip(qr_y + self.qr_size)),
                dpi: Some(card.qr.dpi() as f32),
                ..Default::default()
            },
        );

        let text_x = qr_x + self.qr_size + TEXT_SPACING_MM;
        let label_y = qr_y + LABEL_BASELINE_MM;

        layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        let label = wrap_text(&card.row.product_name, self.text_width, LABEL_FONT_PT);
        self.draw_lines(
            &layer,
            &label,
            &self.fonts.label,
            LABEL_FONT_PT,
            LABEL_LINE_HEIGHT,
            text_x,
            label_y,
        );

        let (r, g, b) = CAPTION_GREY;
        layer.set_fill_color(Color::Rgb(Rgb::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            None,
        )));
        let caption = wrap_text(CAPTION_TEXT, self.text_width, CAPTION_FONT_PT);
        self.draw_lines(
            &layer,
            &caption,
            &self.fonts.caption,
            CAPTION_FONT_PT,
            CAPTION_LINE_HEIGHT,
            text_x,
            label_y + CAPTION_OFFSET_MM,
        );
        layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>, CardsError> {
        let this = *self;
        let page = this.current_page;
        this.doc
            .save_to_bytes()
            .map_err(|e| CardsError::RenderFailed {
                page: page + 1,
                detail: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutPolicy, PageGeometry};
    use crate::render::qr;
    use crate::row::Row;

    fn sample_row() -> Row {
        Row {
            id: "1".into(),
            product_name: "Biały Korpusowy 0110 SM".into(),
            url: "https://example.com/0110".into(),
            raw_fields: vec![],
            is_valid: true,
            errors: vec![],
            is_excluded: false,
            product_type: "plyty".into(),
        }
    }

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap_text("Dąb K190", 22.0, 10.0), vec!["Dąb K190"]);
    }

    #[test]
    fn wrap_breaks_on_words() {
        // 22 mm at 10 pt fits 12 average glyphs.
        assert_eq!(
            wrap_text("Biały Korpusowy 0110 SM", 22.0, 10.0),
            vec!["Biały", "Korpusowy", "0110 SM"]
        );
    }

    #[test]
    fn wrap_splits_overlong_word() {
        let lines = wrap_text("Supercalifragilistic", 10.0, 10.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "Supercalifragilistic");
    }

    #[test]
    fn wrap_flushes_line_before_overlong_word() {
        assert_eq!(
            wrap_text("SM Supercalifragilisticexpialidocious 0110", 22.0, 10.0),
            vec!["SM", "Supercalifra", "gilisticexpi", "alidocious", "0110"]
        );
    }

    #[test]
    fn wrap_empty_text() {
        assert!(wrap_text("   ", 22.0, 10.0).is_empty());
    }

    #[test]
    fn missing_font_falls_back_to_helvetica() {
        let (doc, _, _) = PdfDocument::new("t", Mm(210.0), Mm(297.0), "L");
        let fonts = CardFonts::load(&doc, Some(Path::new("/nonexistent/font.ttf"))).unwrap();
        assert!(!fonts.embedded);
    }

    #[test]
    fn renders_two_pages() {
        let config = GenerationConfig::default();
        let plan =
            LayoutPlan::compute(PageGeometry::default(), LayoutPolicy::GappedRows, 40.0, 2)
                .unwrap();
        let row = sample_row();
        let code = qr::rasterize(&row.url, config.qr_size).unwrap();
        let card = Card {
            row: &row,
            qr: &code,
        };

        let mut renderer: Box<dyn DocumentRenderer> =
            Box::new(PdfRenderer::new(&config, &plan).unwrap());
        for page in 0..2 {
            renderer.begin_page(page).unwrap();
            let (x, y) = plan.slot_origin(0);
            let slot = CardSlot {
                slot: 0,
                row: 0,
                column: 0,
                x,
                y,
            };
            renderer.draw_card(&card, &slot).unwrap();
            renderer.end_page(page).unwrap();
        }
        let bytes = renderer.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn draw_before_begin_page_is_an_error() {
        let config = GenerationConfig::default();
        let plan =
            LayoutPlan::compute(PageGeometry::default(), LayoutPolicy::GappedRows, 40.0, 1)
                .unwrap();
        let row = sample_row();
        let code = qr::rasterize(&row.url, config.qr_size).unwrap();
        let mut renderer = PdfRenderer::new(&config, &plan).unwrap();
        let slot = CardSlot {
            slot: 0,
            row: 0,
            column: 0,
            x: 12.0,
            y: 12.0,
        };
        let err = renderer
            .draw_card(&Card { row: &row, qr: &code }, &slot)
            .unwrap_err();
        assert!(matches!(err, CardsError::Internal(_)));
    }
}
