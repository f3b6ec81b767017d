//! Output types for the encode and decode pipelines.

use crate::error::{DmBatchError, PageWarning};
use image::GrayImage;
use serde::{Deserialize, Serialize};

/// One generated DataMatrix code: the source line, its 1-based position in
/// the original input, and the rendered symbol image.
///
/// Entries are created by [`crate::batch::encode_lines`] and are immutable
/// thereafter; regenerating replaces the whole list.
#[derive(Debug, Clone)]
pub struct CodeEntry {
    /// 1-based line number in the pre-filter input. Blank lines are skipped
    /// by the encode pipeline but still consume a number, so the numbering
    /// always matches what the user typed.
    pub line_number: usize,
    /// The payload text exactly as encoded.
    pub text: String,
    /// The rendered symbol: black modules on white, square canvas.
    pub image: GrayImage,
}

impl CodeEntry {
    /// Deterministic export file name: `datamatrix_<line_number>.png`.
    pub fn file_name(&self) -> String {
        format!("datamatrix_{}.png", self.line_number)
    }
}

/// The decode result for a single page (or a single image, treated as page 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageOutcome {
    /// 1-based page number in the source document.
    pub page: usize,
    /// Every payload recovered from this page, in detector-report order.
    pub payloads: Vec<String>,
    /// Set when the page yielded nothing; the decode continues regardless.
    pub warning: Option<PageWarning>,
    /// Wall-clock time spent enhancing and decoding this page.
    pub duration_ms: u64,
}

/// Decode statistics across all pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeStats {
    /// Pages in the source document (1 for a plain image).
    pub total_pages: usize,
    /// Pages actually selected for decoding.
    pub selected_pages: usize,
    /// Pages that yielded at least one payload.
    pub decoded_pages: usize,
    /// Pages that rendered fine but held no recoverable symbol.
    pub empty_pages: usize,
    /// Pages lost to rasterisation or decoder errors.
    pub failed_pages: usize,
    /// Total payloads recovered across all pages.
    pub total_payloads: usize,
    /// End-to-end wall-clock time.
    pub total_duration_ms: u64,
    /// Time spent in pdfium rasterisation (0 for plain images).
    pub render_duration_ms: u64,
    /// Time spent enhancing and running the detector.
    pub detect_duration_ms: u64,
}

/// Metadata extracted from a PDF document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
    pub is_encrypted: bool,
}

/// Complete result of a decode run.
///
/// The decode entry points return `Ok(DecodeOutput)` even when some (or all)
/// pages yielded nothing — inspect [`DecodeOutput::pages`] for per-page
/// warnings, or call [`DecodeOutput::require_payloads`] to turn an all-empty
/// run into a hard error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeOutput {
    /// All recovered payloads, flattened in page order.
    pub payloads: Vec<String>,
    /// Per-page outcomes, in page order.
    pub pages: Vec<PageOutcome>,
    /// Document metadata; `None` for plain image inputs.
    pub metadata: Option<DocumentMetadata>,
    /// Aggregate statistics.
    pub stats: DecodeStats,
}

impl DecodeOutput {
    /// Fail when no payload was recovered from any page.
    ///
    /// The decode pipeline itself is partial-failure tolerant; this is the
    /// strict view for callers that treat an all-empty decode as an error.
    pub fn require_payloads(self) -> Result<Self, DmBatchError> {
        if self.payloads.is_empty() {
            Err(DmBatchError::NoPayloads {
                pages: self.pages.len(),
            })
        } else {
            Ok(self)
        }
    }

    /// Every warning collected across pages, in page order.
    pub fn warnings(&self) -> impl Iterator<Item = &PageWarning> {
        self.pages.iter().filter_map(|p| p.warning.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_output(pages: usize) -> DecodeOutput {
        DecodeOutput {
            payloads: vec![],
            pages: (1..=pages)
                .map(|page| PageOutcome {
                    page,
                    payloads: vec![],
                    warning: Some(PageWarning::Empty { page }),
                    duration_ms: 0,
                })
                .collect(),
            metadata: None,
            stats: DecodeStats::default(),
        }
    }

    #[test]
    fn entry_file_name_uses_line_number() {
        let entry = CodeEntry {
            line_number: 12,
            text: "abc".into(),
            image: GrayImage::new(1, 1),
        };
        assert_eq!(entry.file_name(), "datamatrix_12.png");
    }

    #[test]
    fn require_payloads_rejects_empty_run() {
        let err = empty_output(3).require_payloads().unwrap_err();
        assert!(matches!(err, DmBatchError::NoPayloads { pages: 3 }));
    }

    #[test]
    fn require_payloads_passes_through_success() {
        let mut out = empty_output(1);
        out.payloads.push("hello".into());
        assert!(out.require_payloads().is_ok());
    }

    #[test]
    fn warnings_iterates_in_page_order() {
        let out = empty_output(2);
        let pages: Vec<usize> = out.warnings().map(|w| w.page()).collect();
        assert_eq!(pages, vec![1, 2]);
    }

    #[test]
    fn decode_output_serialises_to_json() {
        let out = empty_output(1);
        let json = serde_json::to_string(&out).unwrap();
        let back: DecodeOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pages.len(), 1);
    }
}
