//! # dmbatch
//!
//! Batch-generate and batch-decode DataMatrix 2D barcodes from text lines,
//! image files, and PDF pages.
//!
//! ## Why this crate?
//!
//! Labelling workflows often start from a plain list of payloads — one code
//! per line — and need a symbol image for each, or the reverse: a scanned
//! sheet or PDF full of printed codes whose payloads must be recovered back
//! into lines. This crate wires those two directions together as a batch
//! pipeline. All symbology work is delegated: the `datamatrix` crate encodes
//! payloads into module bitmaps, `rxing` (a ZXing port) finds and decodes
//! symbols in noisy pixel data, `pdfium-render` rasterises PDF pages, and
//! `image` handles the pixel plumbing.
//!
//! ## Pipeline Overview
//!
//! ```text
//! text lines                          image / PDF
//!  │                                   │
//!  ├─ 1. Store    one payload per      ├─ 1. Input    classify by magic bytes
//!  │              line, 1-based        ├─ 2. Render   rasterise pages via
//!  │              numbering            │              pdfium (spawn_blocking)
//!  ├─ 2. Encode   datamatrix symbol    ├─ 3. Enhance  contrast ×2, grayscale,
//!  │              per non-blank line   │              2x upscale (fixed)
//!  ├─ 3. Gallery  cyclic prev/next     ├─ 4. Detect   rxing DataMatrix
//!  │              browsing             │              detector, per page
//!  └─ 4. Export   datamatrix_<n>.png   └─ 5. Output   payloads appended to
//!                 per entry                           the store, per-page
//!                                                     warnings for misses
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dmbatch::{decode_auto, encode_lines, export_entries, BatchConfig, LineStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::default();
//!
//!     // Generate: one PNG-ready entry per non-blank line.
//!     let store = LineStore::from_text("SKU-0001\nSKU-0002\n\nSKU-0004");
//!     let entries = encode_lines(&store, &config)?;
//!     export_entries(&entries, "out/").await?;
//!
//!     // Decode: recover payloads from a scanned sheet.
//!     let output = decode_auto("scanned_sheet.pdf", &config).await?;
//!     for payload in &output.payloads {
//!         println!("{payload}");
//!     }
//!     for warning in output.warnings() {
//!         eprintln!("warning: {warning}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `dmbatch` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! dmbatch = { version = "0.3", default-features = false }
//! ```
//!
//! ## PDFium
//!
//! Decoding PDF pages requires the PDFium shared library at runtime (see
//! [`DmBatchError::PdfiumBindingFailed`] for the lookup order). Generation,
//! plain image decoding, and export work without it.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod gallery;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod session;
pub mod store;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{
    decode_auto, decode_image, decode_pdf, decode_pdf_from_bytes, decode_sync, encode_lines,
    inspect,
};
pub use config::{BatchConfig, BatchConfigBuilder, PageSelection};
pub use error::{DmBatchError, PageWarning};
pub use export::{export_entries, export_entries_sync};
pub use gallery::Gallery;
pub use output::{CodeEntry, DecodeOutput, DecodeStats, DocumentMetadata, PageOutcome};
pub use progress::{DecodeProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::BatchSession;
pub use store::{LineStore, PAYLOAD_LIMIT};
pub use stream::{decode_pdf_stream, decode_pdf_stream_from_bytes, PageOutcomeStream};
