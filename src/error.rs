//! Error types for the dmbatch library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DmBatchError`] — **Fatal**: the batch operation cannot proceed at all
//!   (missing input file, corrupt PDF, nothing to encode). Returned as
//!   `Err(DmBatchError)` from the top-level entry points.
//!
//! * [`PageWarning`] — **Non-fatal**: a single PDF page produced nothing (no
//!   recoverable symbol, or a rasterisation glitch) but the remaining pages
//!   are still worth processing. Stored inside
//!   [`crate::output::PageOutcome`] so callers can inspect partial success
//!   instead of losing a whole document to one bad page.
//!
//! The original tool surfaced every one of these as a modal dialog and then
//! carried on; the split keeps that contract while letting library callers
//! choose their own tolerance.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the dmbatch library.
///
/// Page-level misses use [`PageWarning`] and are stored in
/// [`crate::output::PageOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum DmBatchError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file is neither a PDF nor a supported image format.
    #[error("Unsupported input '{path}': expected a PDF or a PNG/JPEG/BMP image\nFirst bytes: {magic:?}")]
    UnsupportedInput { path: PathBuf, magic: [u8; 4] },

    /// The file looked like an image but could not be decoded.
    #[error("Failed to load image '{path}': {detail}")]
    ImageLoadFailed { path: PathBuf, detail: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Selected page numbers exceed the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    // ── Encode errors ─────────────────────────────────────────────────────
    /// The line store holds no non-blank line to encode.
    ///
    /// The original tool's "enter at least one code" warning. Blank lines do
    /// not count: they are skipped by the encode pipeline.
    #[error("Nothing to encode: the line store is empty or contains only blank lines")]
    EmptyBatch,

    /// The DataMatrix encoder rejected a line's payload.
    #[error("Line {line}: DataMatrix encoding failed: {detail}")]
    EncodeFailed { line: usize, detail: String },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// No payload was recovered from any page of the input.
    ///
    /// Produced by [`crate::output::DecodeOutput::require_payloads`] for
    /// callers that treat an all-empty decode as failure; the decode entry
    /// points themselves return `Ok` with per-page warnings instead.
    #[error("No DataMatrix payload recovered from any of the {pages} page(s)")]
    NoPayloads { pages: usize },

    // ── Export errors ─────────────────────────────────────────────────────
    /// Export requested before any generation happened.
    #[error("Nothing to export: generate codes first")]
    NothingToExport,

    /// Could not create or write an exported PNG file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Decoding PDF pages requires the PDFium shared library.\n\
  • Install it (e.g. from bblanchon/pdfium-binaries) next to the binary, or\n\
  • set PDFIUM_DYNAMIC_LIB_PATH to the directory containing it.\n\
Plain image decoding and code generation work without PDFium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal warning for a single page (or single image).
///
/// Stored alongside [`crate::output::PageOutcome`] when a page yields
/// nothing. The overall decode continues regardless — page-level
/// partial-failure tolerance is the whole point of the PDF path.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageWarning {
    /// The page rendered fine but no DataMatrix symbol was recovered.
    #[error("Page {page}: no DataMatrix symbol recovered")]
    Empty { page: usize },

    /// Page rasterisation failed.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The detector aborted on this page's pixel data.
    #[error("Page {page}: decoder error: {detail}")]
    DecodeFailed { page: usize, detail: String },
}

impl PageWarning {
    /// The 1-based page index the warning names.
    pub fn page(&self) -> usize {
        match self {
            PageWarning::Empty { page }
            | PageWarning::RenderFailed { page, .. }
            | PageWarning::DecodeFailed { page, .. } => *page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_display() {
        let e = DmBatchError::EmptyBatch;
        assert!(e.to_string().contains("blank"));
    }

    #[test]
    fn encode_failed_names_line() {
        let e = DmBatchError::EncodeFailed {
            line: 7,
            detail: "payload too large".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Line 7"), "got: {msg}");
        assert!(msg.contains("payload too large"));
    }

    #[test]
    fn no_payloads_display() {
        let e = DmBatchError::NoPayloads { pages: 4 };
        assert!(e.to_string().contains("4 page(s)"));
    }

    #[test]
    fn page_warning_names_page() {
        let w = PageWarning::Empty { page: 3 };
        assert_eq!(w.page(), 3);
        assert!(w.to_string().contains("Page 3"));
    }

    #[test]
    fn page_warning_roundtrips_through_json() {
        let w = PageWarning::DecodeFailed {
            page: 2,
            detail: "binarizer failed".into(),
        };
        let json = serde_json::to_string(&w).unwrap();
        let back: PageWarning = serde_json::from_str(&json).unwrap();
        assert_eq!(back.page(), 2);
    }
}
