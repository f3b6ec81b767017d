//! Input classification: decide whether a path names a PDF or an image.
//!
//! ## Why sniff magic bytes?
//!
//! File extensions lie, and handing a JPEG to pdfium (or a PDF to the image
//! codecs) produces an opaque library error deep inside the pipeline. Reading
//! the first four bytes up front lets us route the file to the right decoder
//! and give the user a meaningful error for anything else.

use crate::error::DmBatchError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What kind of input a file turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A PDF document (`%PDF` magic).
    Pdf,
    /// A PNG, JPEG, or BMP image.
    Image,
}

/// Classify a local file by its magic bytes.
///
/// Recognised signatures:
/// * `%PDF`        — PDF
/// * `\x89PNG`     — PNG
/// * `\xFF\xD8`    — JPEG
/// * `BM`          — BMP
pub fn classify(path: &Path) -> Result<InputKind, DmBatchError> {
    let path_buf = PathBuf::from(path);

    if !path.exists() {
        return Err(DmBatchError::FileNotFound { path: path_buf });
    }

    let mut magic = [0u8; 4];
    match std::fs::File::open(path) {
        Ok(mut f) => {
            if f.read_exact(&mut magic).is_err() {
                // Shorter than four bytes cannot be any supported format.
                return Err(DmBatchError::UnsupportedInput {
                    path: path_buf,
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DmBatchError::PermissionDenied { path: path_buf });
        }
        Err(_) => {
            return Err(DmBatchError::FileNotFound { path: path_buf });
        }
    }

    let kind = match &magic {
        b"%PDF" => InputKind::Pdf,
        [0x89, b'P', b'N', b'G'] => InputKind::Image,
        [0xFF, 0xD8, ..] => InputKind::Image,
        [b'B', b'M', ..] => InputKind::Image,
        _ => {
            return Err(DmBatchError::UnsupportedInput {
                path: path_buf,
                magic,
            })
        }
    };

    debug!("Classified {} as {:?}", path.display(), kind);
    Ok(kind)
}

/// Classify and require a PDF, for entry points that only accept one.
pub fn require_pdf(path: &Path) -> Result<(), DmBatchError> {
    match classify(path)? {
        InputKind::Pdf => Ok(()),
        InputKind::Image => {
            let mut magic = [0u8; 4];
            if let Ok(mut f) = std::fs::File::open(path) {
                let _ = f.read_exact(&mut magic);
            }
            Err(DmBatchError::UnsupportedInput {
                path: path.to_path_buf(),
                magic,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file_with(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn classifies_pdf_magic() {
        let f = file_with(b"%PDF-1.7\n");
        assert_eq!(classify(f.path()).unwrap(), InputKind::Pdf);
    }

    #[test]
    fn classifies_image_magics() {
        let png = file_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]);
        assert_eq!(classify(png.path()).unwrap(), InputKind::Image);

        let jpeg = file_with(&[0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(classify(jpeg.path()).unwrap(), InputKind::Image);

        let bmp = file_with(b"BM\x00\x00\x00\x00");
        assert_eq!(classify(bmp.path()).unwrap(), InputKind::Image);
    }

    #[test]
    fn rejects_unknown_magic() {
        let f = file_with(b"GIF89a");
        let err = classify(f.path()).unwrap_err();
        assert!(matches!(err, DmBatchError::UnsupportedInput { .. }));
    }

    #[test]
    fn rejects_tiny_file() {
        let f = file_with(b"ab");
        let err = classify(f.path()).unwrap_err();
        assert!(matches!(err, DmBatchError::UnsupportedInput { .. }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = classify(Path::new("/no/such/file.pdf")).unwrap_err();
        assert!(matches!(err, DmBatchError::FileNotFound { .. }));
    }

    #[test]
    fn require_pdf_rejects_images() {
        let png = file_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]);
        let err = require_pdf(png.path()).unwrap_err();
        assert!(matches!(err, DmBatchError::UnsupportedInput { .. }));
    }
}
