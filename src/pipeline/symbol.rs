//! Symbol rendering: payload text → DataMatrix module bitmap → grayscale image.
//!
//! The `datamatrix` crate does all the symbology work (codeword encoding,
//! Reed-Solomon parity, module placement); this stage only draws the module
//! bitmap as black squares on a white canvas with a quiet zone around it.

use datamatrix::data::DataEncodingError;
use datamatrix::{DataMatrix, SymbolList};
use image::{GrayImage, Luma};

const BLACK: Luma<u8> = Luma([0]);
const WHITE: Luma<u8> = Luma([255]);

/// Render a payload as a DataMatrix symbol image.
///
/// The smallest square symbol that fits the payload is chosen, each module
/// is drawn as a `module_px` × `module_px` black square, and the symbol is
/// surrounded by `quiet_zone` modules of white on every side.
pub fn render_symbol(
    payload: &str,
    module_px: u32,
    quiet_zone: u32,
) -> Result<GrayImage, DataEncodingError> {
    let bitmap =
        DataMatrix::encode(payload.as_bytes(), SymbolList::default().enforce_square())?.bitmap();

    let n = module_px as usize;
    let qz = quiet_zone as usize;
    let width = ((bitmap.width() + 2 * qz) * n) as u32;
    let height = ((bitmap.height() + 2 * qz) * n) as u32;

    let mut image = GrayImage::from_pixel(width, height, WHITE);
    for (x, y) in bitmap.pixels() {
        for i in 0..n {
            for j in 0..n {
                let px = ((x + qz) * n + j) as u32;
                let py = ((y + qz) * n + i) as u32;
                image.put_pixel(px, py, BLACK);
            }
        }
    }

    Ok(pad_to_square(image))
}

/// Pad a symbol image onto a centred square white canvas.
///
/// `SymbolSize::MinSquare` already guarantees square symbols today, but the
/// gallery and export layers rely on uniform dimensions, so the invariant is
/// enforced here rather than assumed.
fn pad_to_square(image: GrayImage) -> GrayImage {
    let (w, h) = image.dimensions();
    if w == h {
        return image;
    }
    let side = w.max(h);
    let mut canvas = GrayImage::from_pixel(side, side, WHITE);
    let dx = (side - w) / 2;
    let dy = (side - h) / 2;
    image::imageops::overlay(&mut canvas, &image, dx as i64, dy as i64);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_symbol_is_square() {
        let img = render_symbol("HELLO-42", 5, 2).unwrap();
        assert_eq!(img.width(), img.height());
    }

    #[test]
    fn dimensions_scale_with_module_size() {
        let small = render_symbol("abc", 2, 1).unwrap();
        let big = render_symbol("abc", 4, 1).unwrap();
        assert_eq!(big.width(), small.width() * 2);
    }

    #[test]
    fn quiet_zone_border_is_white() {
        let qz_px = 2 * 5; // quiet_zone modules × module_px
        let img = render_symbol("payload", 5, 2).unwrap();
        for x in 0..img.width() {
            for y in 0..qz_px {
                assert_eq!(img.get_pixel(x, y), &WHITE, "top border at ({x},{y})");
                let bottom = img.height() - 1 - y;
                assert_eq!(img.get_pixel(x, bottom), &WHITE);
            }
        }
    }

    #[test]
    fn symbol_contains_black_modules() {
        let img = render_symbol("x", 3, 1).unwrap();
        assert!(img.pixels().any(|p| p == &BLACK));
    }

    #[test]
    fn distinct_payloads_render_distinct_symbols() {
        let a = render_symbol("payload-a", 4, 1).unwrap();
        let b = render_symbol("payload-b", 4, 1).unwrap();
        assert_ne!(a.as_raw(), b.as_raw());
    }
}
