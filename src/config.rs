//! Configuration types for card generation.
//!
//! All generation behaviour is controlled through [`GenerationConfig`], built
//! via its [`GenerationConfigBuilder`]. Keeping every knob in one struct makes
//! it easy to pass the same settings to the PDF and the DOCX renderer and to
//! log exactly what a run used.
//!
//! Lengths are millimetres throughout.

use crate::error::CardsError;
use crate::profile::{ProductTypeProfile, DEFAULT_PRODUCT_TYPE};
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Smallest and largest QR code edge, in mm.
pub const QR_SIZE_RANGE: (f64, f64) = (20.0, 40.0);

/// Smallest and largest card height for [`LayoutPolicy::GappedRows`], in mm.
pub const CARD_HEIGHT_RANGE: (f64, f64) = (40.0, 80.0);

/// Row count of the fixed grid.
pub const FIXED_ROWS: usize = 7;

/// Card height of the fixed grid, in mm.
pub const FIXED_CARD_HEIGHT: f64 = 38.14;

/// Configuration for one document generation.
///
/// Built via [`GenerationConfig::builder()`] or using
/// [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use qrcards::{GenerationConfig, OutputFormat};
///
/// let config = GenerationConfig::builder()
///     .qr_size(30.0)
///     .card_height(50.0)
///     .format(OutputFormat::Docx)
///     .build()
///     .unwrap();
/// assert_eq!(config.format.default_file_name(), "qrcards.docx");
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// QR code edge length. Range: 20–40. Default: 24.
    pub qr_size: f64,

    /// Card height used by [`LayoutPolicy::GappedRows`]. Range: 40–80. Default: 40.
    pub card_height: f64,

    /// Product-type profile identifier. Default: `"plyty"`.
    pub product_type: String,

    /// Row arrangement on each page. Default: [`LayoutPolicy::GappedRows`].
    pub policy: LayoutPolicy,

    /// Page size, margins and column grid. Default: A4 portrait, 3 columns.
    pub geometry: PageGeometry,

    /// Output document format. Default: PDF.
    pub format: OutputFormat,

    /// TrueType font embedded in PDF output for full Polish glyph coverage.
    ///
    /// When `None`, or when the file cannot be loaded, the renderer falls back
    /// to built-in Helvetica.
    pub font_path: Option<PathBuf>,

    /// Per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            qr_size: 24.0,
            card_height: CARD_HEIGHT_RANGE.0,
            product_type: DEFAULT_PRODUCT_TYPE.to_string(),
            policy: LayoutPolicy::default(),
            geometry: PageGeometry::default(),
            format: OutputFormat::default(),
            font_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("qr_size", &self.qr_size)
            .field("card_height", &self.card_height)
            .field("product_type", &self.product_type)
            .field("policy", &self.policy)
            .field("geometry", &self.geometry)
            .field("format", &self.format)
            .field("font_path", &self.font_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn GenerationProgressCallback>"),
            )
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }

    /// Card height actually used on the page, which depends on the policy.
    pub fn effective_card_height(&self) -> f64 {
        match self.policy {
            LayoutPolicy::GappedRows => self.card_height,
            LayoutPolicy::FixedRows { card_height, .. } => card_height,
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn qr_size(mut self, mm: f64) -> Self {
        self.config.qr_size = mm.clamp(QR_SIZE_RANGE.0, QR_SIZE_RANGE.1);
        self
    }

    pub fn card_height(mut self, mm: f64) -> Self {
        self.config.card_height = mm.clamp(CARD_HEIGHT_RANGE.0, CARD_HEIGHT_RANGE.1);
        self
    }

    pub fn product_type(mut self, id: impl Into<String>) -> Self {
        self.config.product_type = id.into();
        self
    }

    pub fn policy(mut self, policy: LayoutPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn geometry(mut self, geometry: PageGeometry) -> Self {
        self.config.geometry = geometry;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, CardsError> {
        let c = &self.config;
        if !c.qr_size.is_finite() || !c.card_height.is_finite() {
            return Err(CardsError::InvalidConfig(
                "QR size and card height must be finite".into(),
            ));
        }
        ProductTypeProfile::lookup(&c.product_type)?;
        c.geometry.validate()?;
        if let LayoutPolicy::FixedRows { rows, card_height } = c.policy {
            if rows == 0 || card_height <= 0.0 {
                return Err(CardsError::InvalidConfig(format!(
                    "Fixed grid needs at least one row of positive height, got {rows} × {card_height} mm"
                )));
            }
            let needed = rows as f64 * card_height;
            let available = c.geometry.content_height();
            if needed > available + 1e-6 {
                return Err(CardsError::InvalidConfig(format!(
                    "Fixed grid of {rows} × {card_height} mm needs {needed:.2} mm but only {available:.2} mm fit between the margins"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Geometry ─────────────────────────────────────────────────────────────

/// Physical page and grid parameters, in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    /// Same margin on all four sides.
    pub margin: f64,
    /// Spacing between adjacent cards.
    pub gap: f64,
    pub columns: usize,
}

impl Default for PageGeometry {
    /// A4 portrait, 12 mm margins, 3 mm gaps, 3 columns of 60 mm cards.
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 12.0,
            gap: 3.0,
            columns: 3,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f64 {
        self.page_height - 2.0 * self.margin
    }

    fn validate(&self) -> Result<(), CardsError> {
        if self.columns == 0 {
            return Err(CardsError::InvalidConfig("Column count must be ≥ 1".into()));
        }
        if self.margin < 0.0 || self.gap < 0.0 {
            return Err(CardsError::InvalidConfig(
                "Margin and gap must not be negative".into(),
            ));
        }
        let gaps = (self.columns - 1) as f64 * self.gap;
        if self.content_width() - gaps <= 0.0 || self.content_height() <= 0.0 {
            return Err(CardsError::InvalidConfig(format!(
                "Page {}×{} mm leaves no room for cards with {} mm margins",
                self.page_width, self.page_height, self.margin
            )));
        }
        Ok(())
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How card rows are arranged down the page.
///
/// | Policy | Rows per page | Row gap | Card height |
/// |--------|---------------|---------|-------------|
/// | `GappedRows` | as many as fit | `geometry.gap` | from config (40–80) |
/// | `FixedRows`  | `rows` | 0 | `card_height` of the variant |
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutPolicy {
    /// Rows separated by the page gap; row count computed from card height. (default)
    #[default]
    GappedRows,
    /// Hard-coded row count and card height, rows touching.
    FixedRows { rows: usize, card_height: f64 },
}

impl LayoutPolicy {
    /// The built-in fixed grid: 7 rows of 38.14 mm.
    pub fn fixed() -> Self {
        LayoutPolicy::FixedRows {
            rows: FIXED_ROWS,
            card_height: FIXED_CARD_HEIGHT,
        }
    }
}

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Docx,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Docx => "docx",
        }
    }

    /// Deterministic file name used when the caller does not choose one.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "qrcards.pdf",
            OutputFormat::Docx => "qrcards.docx",
        }
    }
}
