//! Pipeline stages for DataMatrix batch processing.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! encode:  text line ──▶ symbol ──▶ CodeEntry
//!                        (datamatrix)
//!
//! decode:  input ──▶ render ──▶ enhance ──▶ detect
//!          (magic)   (pdfium)   (fixed)    (rxing)
//! ```
//!
//! 1. [`input`]   — classify the user-supplied file (PDF vs image) by magic
//!    bytes so failures surface before pdfium or the image codecs run
//! 2. [`render`]  — rasterise selected PDF pages; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`enhance`] — the fixed contrast/grayscale/upscale step applied before
//!    detection
//! 4. [`detect`]  — run the DataMatrix detector over a grayscale image; the
//!    only stage that touches the symbology decoder
//! 5. [`symbol`]  — the opposite direction: payload text to a rendered
//!    symbol bitmap

pub mod detect;
pub mod enhance;
pub mod input;
pub mod render;
pub mod symbol;
