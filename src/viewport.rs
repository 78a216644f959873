//! Pan/zoom viewport over the source image.
//!
//! The viewport is the visible sub-rectangle `(x, y, dx, dy)` of the image, in
//! image pixels. Its extent follows an integer `ratio` (percent of the full
//! image). Every mutation ends with [`ViewportTransform::clamp`], so the
//! rectangle always lies inside the image.

use image::RgbImage;
use image::imageops::FilterType;

use crate::constants::viewport::{
    DEFAULT_PAN_SENSITIVITY, DEFAULT_WHEEL_SENSITIVITY, MAX_RATIO, MIN_RATIO,
};
use crate::model::ViewRect;
use crate::render::{self, OverlayProducer, RenderError};

/// Input sensitivities, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    /// Ratio change per unit of wheel delta.
    pub wheel_sensitivity: f32,
    /// Image pixels per widget pixel of drag.
    pub pan_sensitivity: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            wheel_sensitivity: DEFAULT_WHEEL_SENSITIVITY,
            pan_sensitivity: DEFAULT_PAN_SENSITIVITY,
        }
    }
}

/// Maps between widget space and image space under pan and zoom.
#[derive(Debug, Clone)]
pub struct ViewportTransform {
    image_width: u32,
    image_height: u32,
    x: u32,
    y: u32,
    dx: u32,
    dy: u32,
    ratio: i32,
    config: ViewportConfig,
    filter: FilterType,
}

impl ViewportTransform {
    /// Create a viewport covering the whole image.
    ///
    /// Zero image dimensions are treated as 1 so the extent stays non-empty.
    pub fn new(image_width: u32, image_height: u32, config: ViewportConfig) -> Self {
        let image_width = image_width.max(1);
        let image_height = image_height.max(1);
        Self {
            image_width,
            image_height,
            x: 0,
            y: 0,
            dx: image_width,
            dy: image_height,
            ratio: MAX_RATIO,
            config,
            filter: FilterType::Triangle,
        }
    }

    /// Use a different resampling filter when scaling to the surface.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// The visible region in image coordinates.
    pub fn view(&self) -> ViewRect {
        ViewRect::new(self.x, self.y, self.dx, self.dy)
    }

    /// Current extent ratio in percent.
    pub fn ratio(&self) -> i32 {
        self.ratio
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    pub fn config(&self) -> ViewportConfig {
        self.config
    }

    /// Show the whole image again.
    pub fn reset(&mut self) {
        self.ratio = MAX_RATIO;
        self.dx = self.image_width;
        self.dy = self.image_height;
        self.x = 0;
        self.y = 0;
    }

    /// Zoom at the cursor, keeping the image pixel under it in place.
    ///
    /// Positive `wheel_delta` grows the ratio (shows more of the image).
    pub fn zoom(
        &mut self,
        cursor_x: f32,
        cursor_y: f32,
        widget_width: u32,
        widget_height: u32,
        wheel_delta: f32,
    ) {
        let (px, py) = self.to_image_pixel(cursor_x, cursor_y, widget_width, widget_height);

        let step = (wheel_delta * self.config.wheel_sensitivity).round() as i32;
        let ratio = self.ratio.saturating_add(step).clamp(MIN_RATIO, MAX_RATIO);
        let new_dx = rounded_extent(self.image_width, ratio);
        let new_dy = rounded_extent(self.image_height, ratio);

        let (fx, fy) = if widget_width == 0 || widget_height == 0 {
            (0.0, 0.0)
        } else {
            (
                (f64::from(cursor_x) / f64::from(widget_width)).clamp(0.0, 1.0),
                (f64::from(cursor_y) / f64::from(widget_height)).clamp(0.0, 1.0),
            )
        };
        let new_x = anchored_origin(self.x, fx, self.dx, new_dx);
        let new_y = anchored_origin(self.y, fy, self.dy, new_dy);

        log::debug!(
            "Zoom at ({}, {}): ratio {} -> {}, extent {}x{} -> {}x{}",
            px,
            py,
            self.ratio,
            ratio,
            self.dx,
            self.dy,
            new_dx,
            new_dy
        );

        self.ratio = ratio;
        self.dx = new_dx;
        self.dy = new_dy;
        self.set_origin(new_x, new_y);
    }

    /// Translate the viewport by an incremental widget-space delta.
    pub fn pan(&mut self, dx_widget: f32, dy_widget: f32) {
        let sx = (dx_widget * self.config.pan_sensitivity).round() as i64;
        let sy = (dy_widget * self.config.pan_sensitivity).round() as i64;
        if sx == 0 && sy == 0 {
            return;
        }
        self.set_origin(i64::from(self.x) + sx, i64::from(self.y) + sy);
        log::trace!("Pan by ({}, {}) -> origin ({}, {})", sx, sy, self.x, self.y);
    }

    /// Zoom and move so that `target` (image coordinates) fills the view.
    ///
    /// The limiting axis starts at the target's edge; the other axis is centred.
    pub fn set_viewport_to_cover(&mut self, target: ViewRect) {
        let (w_img, h_img) = (u64::from(self.image_width), u64::from(self.image_height));
        let (w, h) = (u64::from(target.width), u64::from(target.height));

        let ratio_w = (100 * w).div_ceil(w_img);
        let ratio_h = (100 * h).div_ceil(h_img);
        let ratio = ratio_w.max(ratio_h).clamp(MIN_RATIO as u64, MAX_RATIO as u64) as i32;

        self.ratio = ratio;
        self.dx = ceiled_extent(self.image_width, ratio);
        self.dy = ceiled_extent(self.image_height, ratio);

        // Compare w/W against h/H without rounding.
        let width_limits = w * h_img >= h * w_img;
        let (x, y) = if width_limits {
            let slack = i64::from(self.dy) - h as i64;
            (i64::from(target.x), i64::from(target.y) - slack / 2)
        } else {
            let slack = i64::from(self.dx) - w as i64;
            (i64::from(target.x) - slack / 2, i64::from(target.y))
        };
        self.set_origin(x, y);

        log::debug!(
            "Cover {:?}: ratio {}, view {:?}",
            target,
            self.ratio,
            self.view()
        );
    }

    /// Map a widget position to the image pixel beneath it.
    ///
    /// The result is clamped to the image. A zero-sized widget maps to the
    /// viewport origin.
    pub fn to_image_pixel(
        &self,
        widget_x: f32,
        widget_y: f32,
        widget_width: u32,
        widget_height: u32,
    ) -> (u32, u32) {
        if widget_width == 0 || widget_height == 0 {
            return (self.x, self.y);
        }
        let px = f64::from(self.x) + f64::from(widget_x) * f64::from(self.dx) / f64::from(widget_width);
        let py =
            f64::from(self.y) + f64::from(widget_y) * f64::from(self.dy) / f64::from(widget_height);
        (
            (px.trunc() as i64).clamp(0, i64::from(self.image_width) - 1) as u32,
            (py.trunc() as i64).clamp(0, i64::from(self.image_height) - 1) as u32,
        )
    }

    /// Restore `0 ≤ x ≤ W - dx` and `0 ≤ y ≤ H - dy`.
    pub fn clamp(&mut self) {
        self.set_origin(i64::from(self.x), i64::from(self.y));
    }

    /// Render the visible region with overlays, scaled to the widget size.
    ///
    /// Overlays run in slice order on the cropped image. The returned buffer
    /// is owned by the caller.
    pub fn render(
        &self,
        image: &RgbImage,
        widget_width: u32,
        widget_height: u32,
        overlays: &[&dyn OverlayProducer],
    ) -> Result<RgbImage, RenderError> {
        let actual = image.dimensions();
        let expected = self.image_size();
        if actual != expected {
            return Err(RenderError::ImageMismatch { expected, actual });
        }
        render::compose(
            image,
            self.view(),
            (widget_width, widget_height),
            overlays,
            self.filter,
        )
    }

    fn set_origin(&mut self, x: i64, y: i64) {
        self.dx = self.dx.clamp(1, self.image_width);
        self.dy = self.dy.clamp(1, self.image_height);
        let max_x = i64::from(self.image_width - self.dx);
        let max_y = i64::from(self.image_height - self.dy);
        self.x = x.clamp(0, max_x) as u32;
        self.y = y.clamp(0, max_y) as u32;
    }
}

/// `max(1, round(extent * ratio / 100))`
fn rounded_extent(extent: u32, ratio: i32) -> u32 {
    let scaled = (f64::from(extent) * f64::from(ratio) / 100.0).round() as u32;
    scaled.clamp(1, extent)
}

/// `max(1, ceil(extent * ratio / 100))`
fn ceiled_extent(extent: u32, ratio: i32) -> u32 {
    let scaled = (u64::from(extent) * ratio as u64).div_ceil(100) as u32;
    scaled.clamp(1, extent)
}

/// New origin keeping the point at `fraction` of the extent fixed in image
/// space: `round(origin + fraction * (old_extent - new_extent))`.
fn anchored_origin(origin: u32, fraction: f64, old_extent: u32, new_extent: u32) -> i64 {
    let shift = fraction * (f64::from(old_extent) - f64::from(new_extent));
    (f64::from(origin) + shift).round() as i64
}
