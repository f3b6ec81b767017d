//! Streaming decode API: emit page outcomes as they complete.
//!
//! ## Why stream?
//!
//! Large documents take a while. A streams-based API lets callers display
//! partial results immediately, wire up progress reporting, or append
//! payloads to the line store incrementally instead of waiting for the whole
//! document.
//!
//! Unlike the eager [`crate::batch::decode_pdf`] which returns only after
//! all pages finish, [`decode_pdf_stream`] yields one [`PageOutcome`] per
//! page, strictly in page order. Warnings travel inside the outcomes, so a
//! page without a recoverable symbol never terminates the stream.

use crate::batch;
use crate::config::BatchConfig;
use crate::error::{DmBatchError, PageWarning};
use crate::output::PageOutcome;
use crate::pipeline::{input, render};
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::Path;
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-page decode outcomes.
pub type PageOutcomeStream = Pin<Box<dyn Stream<Item = PageOutcome> + Send>>;

/// Decode a PDF, streaming page outcomes as they are ready.
///
/// Pages are processed sequentially and emitted in page order.
///
/// # Returns
/// - `Ok(PageOutcomeStream)` — one [`PageOutcome`] per selected page
/// - `Err(DmBatchError)` — fatal error (file not found, not a PDF, etc.)
pub async fn decode_pdf_stream(
    path: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<PageOutcomeStream, DmBatchError> {
    let path = path.as_ref();
    info!("Starting streaming decode: {}", path.display());

    input::require_pdf(path)?;

    // ── Extract metadata for page count ──────────────────────────────────
    let metadata = render::extract_metadata(path, config.password.as_deref()).await?;
    let total_pages = metadata.page_count;

    // ── Compute page indices ─────────────────────────────────────────────
    let page_indices = config.pages.to_indices(total_pages);
    if page_indices.is_empty() {
        return Err(DmBatchError::PageOutOfRange {
            page: 0,
            total: total_pages,
        });
    }

    // ── Render all selected pages ────────────────────────────────────────
    let rendered = render::render_pages(path, config, &page_indices).await?;

    // ── Build the stream: sequential, page order ─────────────────────────
    let s = stream::iter(rendered.into_iter()).then(|(idx, page_render)| async move {
        let page = idx + 1;
        match page_render {
            Ok(img) => batch::decode_page(page, img).await,
            Err(detail) => PageOutcome {
                page,
                payloads: vec![],
                warning: Some(PageWarning::RenderFailed { page, detail }),
                duration_ms: 0,
            },
        }
    });

    Ok(Box::pin(s))
}

/// Decode PDF bytes in memory, streaming page outcomes as they complete.
///
/// This is the streaming equivalent of [`crate::batch::decode_pdf_from_bytes`].
/// The bytes are written to a temporary file internally; because the stream
/// is fully materialised (pages rendered) before this function returns, the
/// tempfile can be deleted immediately.
pub async fn decode_pdf_stream_from_bytes(
    bytes: &[u8],
    config: &BatchConfig,
) -> Result<PageOutcomeStream, DmBatchError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| DmBatchError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| DmBatchError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_path_buf();
    let stream = decode_pdf_stream(&path, config).await?;
    drop(tmp);
    Ok(stream)
}
