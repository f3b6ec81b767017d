//! Eager (whole-batch) entry points.
//!
//! ## Why eager vs. streaming?
//!
//! This module provides the simpler API: process everything, then return.
//! Decoding collects every [`PageOutcome`] into memory and assembles the
//! final [`DecodeOutput`] before returning. Use
//! [`crate::stream::decode_pdf_stream`] instead when you want per-page
//! results progressively on documents with many pages.

use crate::config::BatchConfig;
use crate::error::{DmBatchError, PageWarning};
use crate::output::{CodeEntry, DecodeOutput, DecodeStats, DocumentMetadata, PageOutcome};
use crate::pipeline::{detect, enhance, input, render, symbol};
use crate::store::LineStore;
use image::DynamicImage;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Encode every non-blank line of the store into a [`CodeEntry`].
///
/// Entries keep the original order and are numbered by their 1-based
/// position in the pre-filter line list — blank lines are skipped but still
/// consume a number, so entry numbering always matches what the user typed.
///
/// # Errors
/// * [`DmBatchError::EmptyBatch`] when the store is empty or all-blank.
/// * [`DmBatchError::EncodeFailed`] when the encoder rejects a line.
pub fn encode_lines(
    store: &LineStore,
    config: &BatchConfig,
) -> Result<Vec<CodeEntry>, DmBatchError> {
    if store.non_blank_count() == 0 {
        return Err(DmBatchError::EmptyBatch);
    }

    let mut entries = Vec::with_capacity(store.non_blank_count());
    for (idx, line) in store.lines().iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = idx + 1;
        let image = symbol::render_symbol(line, config.module_px, config.quiet_zone).map_err(
            |e| DmBatchError::EncodeFailed {
                line: line_number,
                detail: format!("{e:?}"),
            },
        )?;
        debug!("Encoded line {} ({} bytes)", line_number, line.len());
        entries.push(CodeEntry {
            line_number,
            text: line.clone(),
            image,
        });
    }

    info!("Encoded {} line(s)", entries.len());
    Ok(entries)
}

/// Decode DataMatrix symbols from a single image file (PNG/JPEG/BMP).
///
/// The image is loaded at native resolution, enhanced when
/// [`BatchConfig::enhance`] is set, and handed to the detector. The result
/// is a single-page [`DecodeOutput`] with `metadata: None`.
pub async fn decode_image(
    path: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<DecodeOutput, DmBatchError> {
    let total_start = Instant::now();
    let path = path.as_ref().to_path_buf();
    info!("Decoding image: {}", path.display());

    match input::classify(&path)? {
        input::InputKind::Image => {}
        input::InputKind::Pdf => {
            return Err(DmBatchError::UnsupportedInput {
                path,
                magic: *b"%PDF",
            })
        }
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_decode_start(1);
        cb.on_page_start(1, 1);
    }

    let enhance_input = config.enhance;
    let load_path = path.clone();
    let detect_result = tokio::task::spawn_blocking(move || {
        let img = image::open(&load_path).map_err(|e| DmBatchError::ImageLoadFailed {
            path: load_path.clone(),
            detail: e.to_string(),
        })?;
        let gray = if enhance_input {
            enhance::enhance(&img)
        } else {
            img.to_luma8()
        };
        Ok::<_, DmBatchError>(detect::detect_payloads(&gray))
    })
    .await
    .map_err(|e| DmBatchError::Internal(format!("Decode task panicked: {e}")))??;

    let duration_ms = total_start.elapsed().as_millis() as u64;
    let outcome = page_outcome(1, detect_result, duration_ms);

    if let Some(ref cb) = config.progress_callback {
        match &outcome.warning {
            None => cb.on_page_complete(1, 1, outcome.payloads.len()),
            Some(w) => cb.on_page_warning(1, 1, &w.to_string()),
        }
        cb.on_decode_complete(1, outcome.payloads.len());
    }

    Ok(assemble_output(
        vec![outcome],
        None,
        1,
        total_start,
        0,
        duration_ms,
    ))
}

/// Decode DataMatrix symbols from every selected page of a PDF.
///
/// Pages are rasterised via pdfium, always enhanced, and decoded strictly in
/// page order. A page that yields nothing produces a [`PageWarning`] naming
/// its 1-based index and processing continues with the remaining pages.
///
/// # Errors
/// Fatal errors only: missing file, not a PDF, corrupt or password-protected
/// document, pdfium binding failure, empty page selection. Per-page misses
/// are reported through [`DecodeOutput::pages`], never as `Err`.
pub async fn decode_pdf(
    path: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<DecodeOutput, DmBatchError> {
    let total_start = Instant::now();
    let path = path.as_ref();
    info!("Decoding PDF: {}", path.display());

    input::require_pdf(path)?;

    let metadata = render::extract_metadata(path, config.password.as_deref()).await?;
    let total_pages = metadata.page_count;
    info!("PDF has {} pages", total_pages);

    let page_indices = config.pages.to_indices(total_pages);
    if page_indices.is_empty() {
        return Err(DmBatchError::PageOutOfRange {
            page: 0,
            total: total_pages,
        });
    }
    let selected = page_indices.len();
    debug!("Selected {} pages for decoding", selected);

    if let Some(ref cb) = config.progress_callback {
        cb.on_decode_start(selected);
    }

    let render_start = Instant::now();
    let rendered = render::render_pages(path, config, &page_indices).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!("Rendered {} pages in {}ms", rendered.len(), render_duration_ms);

    let detect_start = Instant::now();
    let mut outcomes = Vec::with_capacity(rendered.len());
    for (idx, page_render) in rendered {
        let page = idx + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page, selected);
        }

        let outcome = match page_render {
            Ok(img) => decode_page(page, img).await,
            Err(detail) => PageOutcome {
                page,
                payloads: vec![],
                warning: Some(PageWarning::RenderFailed { page, detail }),
                duration_ms: 0,
            },
        };

        if let Some(ref cb) = config.progress_callback {
            match &outcome.warning {
                None => cb.on_page_complete(page, selected, outcome.payloads.len()),
                Some(w) => cb.on_page_warning(page, selected, &w.to_string()),
            }
        }
        if let Some(ref w) = outcome.warning {
            warn!("{w}");
        }

        outcomes.push(outcome);
    }
    let detect_duration_ms = detect_start.elapsed().as_millis() as u64;

    let output = assemble_output(
        outcomes,
        Some(metadata),
        total_pages,
        total_start,
        render_duration_ms,
        detect_duration_ms,
    );

    info!(
        "Decode complete: {} payload(s) from {}/{} pages, {}ms total",
        output.stats.total_payloads,
        output.stats.decoded_pages,
        selected,
        output.stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_decode_complete(selected, output.stats.total_payloads);
    }

    Ok(output)
}

/// Decode a file of either supported kind, dispatching on its magic bytes.
pub async fn decode_auto(
    path: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<DecodeOutput, DmBatchError> {
    let path = path.as_ref();
    match input::classify(path)? {
        input::InputKind::Pdf => decode_pdf(path, config).await,
        input::InputKind::Image => decode_image(path, config).await,
    }
}

/// Decode PDF bytes held in memory.
///
/// Pdfium requires a file-system path, so the bytes are written to a managed
/// [`tempfile`] that is cleaned up automatically on return or panic. This is
/// the right API when PDF data arrives from a database or network buffer
/// rather than a file on disk.
pub async fn decode_pdf_from_bytes(
    bytes: &[u8],
    config: &BatchConfig,
) -> Result<DecodeOutput, DmBatchError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| DmBatchError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| DmBatchError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_path_buf();
    // `tmp` is dropped (and the file deleted) when `decode_pdf` returns
    decode_pdf(&path, config).await
}

/// Synchronous wrapper around [`decode_auto`].
///
/// Creates a temporary tokio runtime internally.
pub fn decode_sync(
    path: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<DecodeOutput, DmBatchError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DmBatchError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(decode_auto(path, config))
}

/// Extract PDF metadata without decoding content.
///
/// Does not rasterise any page; only pdfium's document header is touched.
pub async fn inspect(path: impl AsRef<Path>) -> Result<DocumentMetadata, DmBatchError> {
    let path = path.as_ref();
    input::require_pdf(path)?;
    render::extract_metadata(path, None).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Enhance and decode one rendered page on the blocking pool.
pub(crate) async fn decode_page(page: usize, img: DynamicImage) -> PageOutcome {
    let page_start = Instant::now();
    let result = tokio::task::spawn_blocking(move || {
        let gray = enhance::enhance(&img);
        detect::detect_payloads(&gray)
    })
    .await
    .unwrap_or_else(|e| Err(format!("decode task panicked: {e}")));

    page_outcome(page, result, page_start.elapsed().as_millis() as u64)
}

/// Fold a detector result into a [`PageOutcome`] with the right warning.
fn page_outcome(page: usize, result: Result<Vec<String>, String>, duration_ms: u64) -> PageOutcome {
    match result {
        Ok(payloads) if payloads.is_empty() => PageOutcome {
            page,
            payloads,
            warning: Some(PageWarning::Empty { page }),
            duration_ms,
        },
        Ok(payloads) => PageOutcome {
            page,
            payloads,
            warning: None,
            duration_ms,
        },
        Err(detail) => PageOutcome {
            page,
            payloads: vec![],
            warning: Some(PageWarning::DecodeFailed { page, detail }),
            duration_ms,
        },
    }
}

/// Assemble the final output and statistics from per-page outcomes.
fn assemble_output(
    outcomes: Vec<PageOutcome>,
    metadata: Option<DocumentMetadata>,
    total_pages: usize,
    total_start: Instant,
    render_duration_ms: u64,
    detect_duration_ms: u64,
) -> DecodeOutput {
    let payloads: Vec<String> = outcomes
        .iter()
        .flat_map(|o| o.payloads.iter().cloned())
        .collect();

    let decoded = outcomes.iter().filter(|o| o.warning.is_none()).count();
    let empty = outcomes
        .iter()
        .filter(|o| matches!(o.warning, Some(PageWarning::Empty { .. })))
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| {
            matches!(
                o.warning,
                Some(PageWarning::RenderFailed { .. }) | Some(PageWarning::DecodeFailed { .. })
            )
        })
        .count();

    let stats = DecodeStats {
        total_pages,
        selected_pages: outcomes.len(),
        decoded_pages: decoded,
        empty_pages: empty,
        failed_pages: failed,
        total_payloads: payloads.len(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms,
        detect_duration_ms,
    };

    DecodeOutput {
        payloads,
        pages: outcomes,
        metadata,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BatchConfig {
        BatchConfig::default()
    }

    #[test]
    fn encode_skips_blank_lines_but_keeps_numbering() {
        let store = LineStore::from_text("first\n\nthird\n   \nfifth");
        let entries = encode_lines(&store, &config()).unwrap();

        let numbers: Vec<usize> = entries.iter().map(|e| e.line_number).collect();
        assert_eq!(numbers, vec![1, 3, 5]);
        assert_eq!(entries[1].text, "third");
    }

    #[test]
    fn encode_of_empty_store_is_rejected() {
        let err = encode_lines(&LineStore::new(), &config()).unwrap_err();
        assert!(matches!(err, DmBatchError::EmptyBatch));
    }

    #[test]
    fn encode_of_all_blank_store_is_rejected() {
        let mut blank = LineStore::new();
        blank.push_line("   ");
        blank.push_line("");
        let err = encode_lines(&blank, &config()).unwrap_err();
        assert!(matches!(err, DmBatchError::EmptyBatch));
    }

    #[test]
    fn encode_produces_one_entry_per_non_blank_line() {
        let store = LineStore::from_text("a\nb\n\nc");
        let entries = encode_lines(&store, &config()).unwrap();
        assert_eq!(entries.len(), store.non_blank_count());
    }

    #[test]
    fn page_outcome_classification() {
        let ok = page_outcome(1, Ok(vec!["x".into()]), 5);
        assert!(ok.warning.is_none());

        let empty = page_outcome(2, Ok(vec![]), 5);
        assert!(matches!(empty.warning, Some(PageWarning::Empty { page: 2 })));

        let failed = page_outcome(3, Err("binarizer".into()), 5);
        assert!(matches!(
            failed.warning,
            Some(PageWarning::DecodeFailed { page: 3, .. })
        ));
    }

    #[test]
    fn stats_count_outcome_kinds() {
        let outcomes = vec![
            page_outcome(1, Ok(vec!["a".into(), "b".into()]), 1),
            page_outcome(2, Ok(vec![]), 1),
            page_outcome(3, Err("boom".into()), 1),
        ];
        let out = assemble_output(outcomes, None, 3, Instant::now(), 10, 20);

        assert_eq!(out.stats.decoded_pages, 1);
        assert_eq!(out.stats.empty_pages, 1);
        assert_eq!(out.stats.failed_pages, 1);
        assert_eq!(out.stats.total_payloads, 2);
        assert_eq!(out.payloads, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn decode_image_rejects_missing_file() {
        let err = decode_image("/no/such/image.png", &config())
            .await
            .unwrap_err();
        assert!(matches!(err, DmBatchError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn decode_pdf_rejects_non_pdf_input() {
        use std::io::Write as _;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&[0x89, b'P', b'N', b'G', 0, 0]).unwrap();
        f.flush().unwrap();

        let err = decode_pdf(f.path(), &config()).await.unwrap_err();
        assert!(matches!(err, DmBatchError::UnsupportedInput { .. }));
    }
}
