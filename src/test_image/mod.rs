//! Synthetic test images.
//!
//! Small deterministic RGB patterns for exercising rendering and the session
//! without fixture files.

use image::{ImageFormat, Rgb, RgbImage};

/// Pattern drawn by [`generate_test_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// One flat colour
    Solid([u8; 3]),
    /// Red ramps with x, green with y
    Gradient,
    /// Alternating black and white cells of the given size
    Checkerboard(u32),
}

/// Generate a `width`×`height` image filled with `pattern`.
pub fn generate_test_image(width: u32, height: u32, pattern: Pattern) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| match pattern {
        Pattern::Solid(color) => Rgb(color),
        Pattern::Gradient => Rgb([
            scale(x, width),
            scale(y, height),
            128,
        ]),
        Pattern::Checkerboard(cell) => {
            let cell = cell.max(1);
            if ((x / cell) + (y / cell)) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        }
    })
}

/// Encode a generated image as PNG bytes.
pub fn png_bytes(width: u32, height: u32, pattern: Pattern) -> Vec<u8> {
    let image = generate_test_image(width, height, pattern);
    let mut out = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("encoding a PNG in memory");
    out.into_inner()
}

fn scale(value: u32, extent: u32) -> u8 {
    if extent <= 1 {
        return 0;
    }
    (value * 255 / (extent - 1)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_corners() {
        let image = generate_test_image(10, 5, Pattern::Gradient);
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 128]));
        assert_eq!(image.get_pixel(9, 4), &Rgb([255, 255, 128]));
    }

    #[test]
    fn test_checkerboard_cells() {
        let image = generate_test_image(8, 8, Pattern::Checkerboard(4));
        assert_eq!(image.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(image.get_pixel(4, 0), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(4, 4), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_png_bytes_decode() {
        let bytes = png_bytes(3, 2, Pattern::Solid([1, 2, 3]));
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1), &Rgb([1, 2, 3]));
    }
}
