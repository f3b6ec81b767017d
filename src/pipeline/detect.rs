//! DataMatrix detection: find and decode symbols in a grayscale image.
//!
//! Detection is delegated entirely to `rxing` (a ZXing port): symbol
//! location, perspective correction, sampling, and Reed-Solomon error
//! correction all happen inside the library. This stage hands it raw luma
//! pixels and filters the results down to DataMatrix hits — the multi-format
//! detector may also report QR or linear codes present in a page, and those
//! are not this tool's business.

use image::GrayImage;
use rxing::BarcodeFormat;
use tracing::debug;

/// Run the detector over a grayscale image and return every DataMatrix
/// payload found, in detector-report order.
///
/// An image with no recoverable symbol returns `Ok(vec![])`; `Err` is
/// reserved for the detector aborting on the pixel data itself.
pub fn detect_payloads(gray: &GrayImage) -> Result<Vec<String>, String> {
    let (width, height) = gray.dimensions();

    match rxing::helpers::detect_multiple_in_luma(gray.as_raw().clone(), width, height) {
        Ok(results) => {
            let payloads: Vec<String> = results
                .iter()
                .filter(|r| r.getBarcodeFormat() == &BarcodeFormat::DATA_MATRIX)
                .map(|r| r.getText().to_string())
                .collect();
            debug!(
                "Detector reported {} symbol(s), {} DataMatrix",
                results.len(),
                payloads.len()
            );
            Ok(payloads)
        }
        Err(e) => {
            // The detector signals "nothing found" through its error channel;
            // that is an empty page, not a failure.
            let msg = e.to_string();
            if msg.to_lowercase().contains("not") && msg.to_lowercase().contains("found") {
                Ok(Vec::new())
            } else {
                Err(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::symbol;
    use image::Luma;

    #[test]
    fn blank_image_yields_no_payloads() {
        let blank = GrayImage::from_pixel(64, 64, Luma([255]));
        let payloads = detect_payloads(&blank).unwrap();
        assert!(payloads.is_empty());
    }

    #[test]
    fn detects_a_rendered_symbol() {
        let img = symbol::render_symbol("ROUND-TRIP-01", 5, 2).unwrap();
        let payloads = detect_payloads(&img).unwrap();
        assert_eq!(payloads, vec!["ROUND-TRIP-01".to_string()]);
    }

    #[test]
    fn detects_symbol_placed_on_larger_page() {
        let sym = symbol::render_symbol("PAGE-CORNER", 5, 2).unwrap();
        let mut page = GrayImage::from_pixel(sym.width() * 3, sym.height() * 3, Luma([255]));
        image::imageops::overlay(&mut page, &sym, sym.width() as i64, sym.height() as i64);

        let payloads = detect_payloads(&page).unwrap();
        assert_eq!(payloads, vec!["PAGE-CORNER".to_string()]);
    }
}
