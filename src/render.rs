//! Composite rendering: crop, draw overlays, scale.
//!
//! The viewport crops the source image, hands the crop to each
//! [`OverlayProducer`] in order, and scales the result to the display
//! surface. Overlays draw in viewport-relative coordinates: pixel `(0, 0)`
//! of the canvas is image pixel `(view.x, view.y)`.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing;
use imageproc::rect::Rect;

use crate::model::ViewRect;

/// Something that draws on top of the cropped viewport image.
pub trait OverlayProducer {
    /// Draw onto `canvas`, which holds the image region described by `view`.
    fn draw(&self, canvas: &mut RgbImage, view: ViewRect);
}

/// Errors that can occur while producing a frame.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The display surface has no area
    #[error("Display surface is empty ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    /// The image does not have the extent the viewport was built for
    #[error("Image is {actual:?} but the viewport expects {expected:?}")]
    ImageMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Crop `image` to `view`, run the overlays, and scale to the surface size.
///
/// Returns a fresh buffer; `image` is never modified.
pub fn compose(
    image: &RgbImage,
    view: ViewRect,
    surface: (u32, u32),
    overlays: &[&dyn OverlayProducer],
    filter: FilterType,
) -> Result<RgbImage, RenderError> {
    let (width, height) = surface;
    if width == 0 || height == 0 {
        return Err(RenderError::EmptySurface { width, height });
    }

    let mut canvas = imageops::crop_imm(image, view.x, view.y, view.width, view.height).to_image();
    for overlay in overlays {
        overlay.draw(&mut canvas, view);
    }

    if canvas.dimensions() == surface {
        return Ok(canvas);
    }
    log::trace!(
        "Scaling {}x{} crop to {}x{}",
        canvas.width(),
        canvas.height(),
        width,
        height
    );
    Ok(imageops::resize(&canvas, width, height, filter))
}

/// Draw a straight segment with a square brush of the given thickness.
pub fn draw_thick_line(
    canvas: &mut RgbImage,
    start: (f32, f32),
    end: (f32, f32),
    thickness: u32,
    color: Rgb<u8>,
) {
    let t = thickness.max(1) as i32;
    let lo = -(t / 2);
    let hi = lo + t;
    for oy in lo..hi {
        for ox in lo..hi {
            let (ox, oy) = (ox as f32, oy as f32);
            drawing::draw_line_segment_mut(
                canvas,
                (start.0 + ox, start.1 + oy),
                (end.0 + ox, end.1 + oy),
                color,
            );
        }
    }
}

/// Outline the pixels `[x1, x2) × [y1, y2)`, growing inwards with thickness.
///
/// The box is clipped to just outside the canvas first, so any `i32` corners
/// are accepted.
pub fn draw_box_outline(
    canvas: &mut RgbImage,
    (x1, y1, x2, y2): (i32, i32, i32, i32),
    thickness: u32,
    color: Rgb<u8>,
) {
    let t = i64::from(thickness.max(1));
    let (max_x, max_y) = (
        i64::from(canvas.width()) + t + 1,
        i64::from(canvas.height()) + t + 1,
    );
    let (x1, x2) = (i64::from(x1).clamp(-t - 1, max_x), i64::from(x2).clamp(-t - 1, max_x));
    let (y1, y2) = (i64::from(y1).clamp(-t - 1, max_y), i64::from(y2).clamp(-t - 1, max_y));
    for k in 0..t {
        let w = x2 - x1 - 2 * k;
        let h = y2 - y1 - 2 * k;
        if w <= 0 || h <= 0 {
            break;
        }
        let rect = Rect::at((x1 + k) as i32, (y1 + k) as i32).of_size(w as u32, h as u32);
        drawing::draw_hollow_rect_mut(canvas, rect, color);
    }
}

/// Draw a ring marker of the given radius and thickness.
pub fn draw_marker(
    canvas: &mut RgbImage,
    center: (i32, i32),
    radius: i32,
    thickness: u32,
    color: Rgb<u8>,
) {
    for k in 0..thickness.max(1) as i32 {
        drawing::draw_hollow_circle_mut(canvas, center, radius + k, color);
    }
}

/// Blend `color` 50/50 into a single pixel, rounding half up.
pub fn blend_half(pixel: &mut Rgb<u8>, color: [u8; 3]) {
    for (channel, overlay) in pixel.0.iter_mut().zip(color) {
        *channel = ((u16::from(*channel) + u16::from(overlay) + 1) / 2) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_image::{Pattern, generate_test_image};

    struct Fill([u8; 3]);

    impl OverlayProducer for Fill {
        fn draw(&self, canvas: &mut RgbImage, _view: ViewRect) {
            for p in canvas.pixels_mut() {
                *p = Rgb(self.0);
            }
        }
    }

    struct Corner;

    impl OverlayProducer for Corner {
        fn draw(&self, canvas: &mut RgbImage, _view: ViewRect) {
            canvas.put_pixel(0, 0, Rgb([1, 2, 3]));
        }
    }

    #[test]
    fn test_compose_leaves_source_untouched() {
        let image = RgbImage::from_pixel(8, 8, Rgb([10, 10, 10]));
        let before = image.clone();
        let out = compose(
            &image,
            ViewRect::new(2, 2, 4, 4),
            (4, 4),
            &[&Fill([200, 0, 0])],
            FilterType::Nearest,
        )
        .unwrap();
        assert_eq!(image, before);
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out.get_pixel(0, 0), &Rgb([200, 0, 0]));
    }

    #[test]
    fn test_compose_crop_starts_at_view_origin() {
        let image = generate_test_image(20, 20, Pattern::Gradient);
        let out = compose(&image, ViewRect::new(10, 5, 4, 4), (4, 4), &[], FilterType::Nearest)
            .unwrap();
        assert_eq!(out.get_pixel(0, 0), image.get_pixel(10, 5));
        assert_eq!(out.get_pixel(3, 3), image.get_pixel(13, 8));
        assert_ne!(out.get_pixel(0, 0), out.get_pixel(3, 3));
    }

    #[test]
    fn test_overlays_run_in_order() {
        let image = RgbImage::new(4, 4);
        let out = compose(
            &image,
            ViewRect::new(0, 0, 4, 4),
            (4, 4),
            &[&Fill([9, 9, 9]), &Corner],
            FilterType::Nearest,
        )
        .unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgb([1, 2, 3]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([9, 9, 9]));
    }

    #[test]
    fn test_compose_scales_to_surface() {
        let image = RgbImage::new(10, 10);
        let out = compose(
            &image,
            ViewRect::new(0, 0, 5, 5),
            (20, 15),
            &[],
            FilterType::Triangle,
        )
        .unwrap();
        assert_eq!(out.dimensions(), (20, 15));
    }

    #[test]
    fn test_empty_surface_is_an_error() {
        let image = RgbImage::new(4, 4);
        let err = compose(&image, ViewRect::new(0, 0, 4, 4), (0, 3), &[], FilterType::Nearest);
        assert!(matches!(err, Err(RenderError::EmptySurface { width: 0, height: 3 })));
    }

    #[test]
    fn test_box_outline_is_inset_on_last_pixel() {
        let mut canvas = RgbImage::new(100, 100);
        let green = Rgb([0, 255, 0]);
        draw_box_outline(&mut canvas, (10, 10, 90, 90), 1, green);
        assert_eq!(canvas.get_pixel(10, 10), &green);
        assert_eq!(canvas.get_pixel(89, 89), &green);
        assert_eq!(canvas.get_pixel(89, 50), &green);
        assert_eq!(canvas.get_pixel(90, 90), &Rgb([0, 0, 0]));
        assert_eq!(canvas.get_pixel(50, 50), &Rgb([0, 0, 0]));
        assert_eq!(canvas.get_pixel(9, 10), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_box_outline_clips_outside_canvas() {
        let mut canvas = RgbImage::new(10, 10);
        let white = Rgb([255, 255, 255]);
        draw_box_outline(&mut canvas, (-5, -5, 5, 5), 1, white);
        assert_eq!(canvas.get_pixel(4, 0), &white);
        assert_eq!(canvas.get_pixel(0, 4), &white);
        assert_eq!(canvas.get_pixel(3, 3), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_box_outline_accepts_extreme_corners() {
        let mut canvas = RgbImage::new(10, 10);
        let white = Rgb([255, 255, 255]);
        draw_box_outline(&mut canvas, (i32::MIN, i32::MIN, i32::MAX, i32::MAX), 3, white);
        assert!(canvas.pixels().all(|p| *p == Rgb([0, 0, 0])));

        draw_box_outline(&mut canvas, (-1_000_000_000, 2, 1_000_000_000, 6), 1, white);
        for x in 0..10 {
            assert_eq!(canvas.get_pixel(x, 2), &white);
            assert_eq!(canvas.get_pixel(x, 5), &white);
            assert_eq!(canvas.get_pixel(x, 3), &Rgb([0, 0, 0]));
        }
    }

    #[test]
    fn test_blend_half_rounds() {
        let mut p = Rgb([0, 255, 100]);
        blend_half(&mut p, [255, 255, 0]);
        assert_eq!(p, Rgb([128, 255, 50]));
    }
}
