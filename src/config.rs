//! Configuration types for batch encoding and decoding.
//!
//! All pipeline behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across threads, serialise them for logging, and diff two
//! runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A many-field constructor is unreadable and breaks on every new field. The
//! builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::DmBatchError;
use crate::progress::DecodeProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for batch generation and decoding.
///
/// Built via [`BatchConfig::builder()`] or using [`BatchConfig::default()`].
///
/// # Example
/// ```rust
/// use dmbatch::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .module_px(8)
///     .quiet_zone(2)
///     .enhance(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Pixel size of one DataMatrix module in generated images. Range: 1–64. Default: 5.
    ///
    /// 5 px per module yields images around 110–200 px for short payloads —
    /// large enough to survive a round trip through most scanners and small
    /// enough that a batch of hundreds of codes stays a few megabytes.
    pub module_px: u32,

    /// Width of the white quiet zone around the symbol, in modules. Default: 2.
    ///
    /// The DataMatrix standard requires at least one module of clear space on
    /// every side; detectors get measurably more reliable with two.
    pub quiet_zone: u32,

    /// Apply the enhancement step (contrast ×2, grayscale, 2x upscale) to
    /// plain image inputs before decoding. Default: true.
    ///
    /// PDF pages are always enhanced: rasterised text-and-symbol pages are
    /// the low-quality end of the input spectrum and the fixed enhancement
    /// step exists for them. This knob only affects direct image decoding,
    /// where the input may already be a clean synthetic render.
    pub enhance: bool,

    /// Maximum rendered page dimension (width or height) in pixels. Default: 2000.
    ///
    /// A safety cap on pdfium output. An A0 poster rasterised without a cap
    /// could produce a 13 000 × 18 000 px image and exhaust memory. This caps
    /// either dimension, scaling the other proportionally.
    pub max_rendered_pixels: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Page selection for PDF decoding. Default: all pages.
    pub pages: PageSelection,

    /// Optional per-page progress callback fired during PDF decoding.
    pub progress_callback: Option<Arc<dyn DecodeProgressCallback>>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            module_px: 5,
            quiet_zone: 2,
            enhance: true,
            max_rendered_pixels: 2000,
            password: None,
            pages: PageSelection::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("module_px", &self.module_px)
            .field("quiet_zone", &self.quiet_zone)
            .field("enhance", &self.enhance)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pages", &self.pages)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn DecodeProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn module_px(mut self, px: u32) -> Self {
        self.config.module_px = px.clamp(1, 64);
        self
    }

    pub fn quiet_zone(mut self, modules: u32) -> Self {
        self.config.quiet_zone = modules.min(16);
        self
    }

    pub fn enhance(mut self, v: bool) -> Self {
        self.config.enhance = v;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn DecodeProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, DmBatchError> {
        let c = &self.config;
        if c.module_px == 0 || c.module_px > 64 {
            return Err(DmBatchError::InvalidConfig(format!(
                "module_px must be 1–64, got {}",
                c.module_px
            )));
        }
        if c.max_rendered_pixels < 100 {
            return Err(DmBatchError::InvalidConfig(format!(
                "max_rendered_pixels must be ≥ 100, got {}",
                c.max_rendered_pixels
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of a PDF to decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// Decode all pages (default).
    #[default]
    All,
    /// Decode a single page (1-indexed).
    Single(usize),
    /// Decode a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Decode specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BatchConfig::builder().build().unwrap();
        assert_eq!(config.module_px, 5);
        assert_eq!(config.quiet_zone, 2);
        assert!(config.enhance);
    }

    #[test]
    fn module_px_is_clamped() {
        let config = BatchConfig::builder().module_px(0).build().unwrap();
        assert_eq!(config.module_px, 1);
        let config = BatchConfig::builder().module_px(500).build().unwrap();
        assert_eq!(config.module_px, 64);
    }

    #[test]
    fn max_rendered_pixels_has_floor() {
        let config = BatchConfig::builder().max_rendered_pixels(1).build().unwrap();
        assert_eq!(config.max_rendered_pixels, 100);
    }

    #[test]
    fn debug_redacts_password() {
        let config = BatchConfig::builder().password("secret").build().unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("redacted"));
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(5), vec![0, 1, 2, 3, 4]);
        assert_eq!(PageSelection::Single(3).to_indices(5), vec![2]);
        assert_eq!(PageSelection::Single(6).to_indices(5), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 4).to_indices(5), vec![1, 2, 3]);
        assert_eq!(
            PageSelection::Set(vec![1, 3, 5]).to_indices(5),
            vec![0, 2, 4]
        );
        assert_eq!(
            PageSelection::Set(vec![3, 1, 3]).to_indices(5),
            vec![0, 2] // deduplicated and sorted
        );
    }
}
