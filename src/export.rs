//! Export: write generated entries as PNG files named by line number.
//!
//! Names are deterministic (`datamatrix_<line_number>.png`), so re-running
//! an export into the same directory overwrites the previous files — that
//! is the contract, not an accident.

use crate::error::DmBatchError;
use crate::output::CodeEntry;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Write one PNG per entry into `dir`, creating the directory if needed.
///
/// Returns the written paths in entry order.
///
/// # Errors
/// * [`DmBatchError::NothingToExport`] when `entries` is empty — the
///   "generate first" warning of the original tool.
/// * [`DmBatchError::OutputWriteFailed`] on any file-system failure.
pub async fn export_entries(
    entries: &[CodeEntry],
    dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, DmBatchError> {
    if entries.is_empty() {
        return Err(DmBatchError::NothingToExport);
    }

    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DmBatchError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let mut written = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = dir.join(entry.file_name());

        let mut buf = Vec::new();
        entry
            .image
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| DmBatchError::Internal(format!("PNG encoding failed: {e}")))?;

        tokio::fs::write(&path, &buf)
            .await
            .map_err(|e| DmBatchError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        debug!("Wrote {} ({} bytes)", path.display(), buf.len());
        written.push(path);
    }

    info!("Exported {} file(s) to {}", written.len(), dir.display());
    Ok(written)
}

/// Synchronous wrapper around [`export_entries`].
pub fn export_entries_sync(
    entries: &[CodeEntry],
    dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, DmBatchError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DmBatchError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(export_entries(entries, dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    fn entry(line_number: usize) -> CodeEntry {
        CodeEntry {
            line_number,
            text: format!("code-{line_number}"),
            image: GrayImage::from_pixel(8, 8, image::Luma([0])),
        }
    }

    #[tokio::test]
    async fn export_without_entries_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_entries(&[], dir.path()).await.unwrap_err();
        assert!(matches!(err, DmBatchError::NothingToExport));
    }

    #[tokio::test]
    async fn export_writes_one_file_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![entry(1), entry(3), entry(7)];

        let written = export_entries(&entries, dir.path()).await.unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(
            written[1].file_name().unwrap().to_str().unwrap(),
            "datamatrix_3.png"
        );
        for path in &written {
            assert!(path.exists(), "missing {}", path.display());
        }
    }

    #[tokio::test]
    async fn re_export_overwrites_same_names() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![entry(2)];

        let first = export_entries(&entries, dir.path()).await.unwrap();
        let second = export_entries(&entries, dir.path()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn export_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let written = export_entries(&[entry(1)], &nested).await.unwrap();
        assert!(written[0].starts_with(&nested));
    }
}
