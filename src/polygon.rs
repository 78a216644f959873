//! Editable polygon and its conversion into a raster mask.
//!
//! Points are kept in image coordinates in the order they were placed. The
//! polygon is only ever persisted in rasterized form, see
//! [`PolygonEditor::to_mask`].
//!
//! # Fill convention
//!
//! The bounding box is `(min_x, min_y, max_x, max_y)` read half-open, so a
//! vertex on the right or bottom edge lies on the box boundary rather than
//! inside it. Pixel `(c, r)` of the raster is set when its centre
//! `(c + 0.5, r + 0.5)` is inside the polygon under the even-odd rule. Since
//! vertices are integers, a scan line through pixel centres never passes
//! through a vertex.

use image::{Rgb, RgbImage};
use ndarray::Array2;

use crate::constants::render::{MARKER_RADIUS_FACTOR, POLYGON_EDGE_COLOR, POLYGON_POINT_COLOR};
use crate::model::{BBox, MASK_SET, Point, ViewRect};
use crate::render::{self, OverlayProducer};

/// Minimum number of vertices required for a mask.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Largest raster `to_mask` will allocate, in pixels.
pub const MAX_MASK_PIXELS: u64 = 1 << 28;

/// Errors from converting a polygon into a mask.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolygonError {
    /// Not enough points to enclose an area
    #[error("At least {MIN_POLYGON_VERTICES} points are needed, the polygon has {count}")]
    InsufficientPoints { count: usize },

    /// All points lie on one horizontal or vertical line
    #[error("Polygon has no area (bounding box {width}x{height})")]
    Degenerate { width: u32, height: u32 },

    /// Bounding box holds more than `MAX_MASK_PIXELS` pixels
    #[error("Polygon bounding box {width}x{height} is too large to rasterize")]
    TooLarge { width: u32, height: u32 },
}

/// Ordered, mutable list of polygon vertices in image coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolygonEditor {
    points: Vec<Point>,
}

impl PolygonEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex.
    pub fn add_point(&mut self, x: i32, y: i32) {
        self.points.push(Point::new(x, y));
        log::trace!("Polygon: added ({}, {}), {} points", x, y, self.points.len());
    }

    /// Remove the most recent vertex. Does nothing when empty.
    pub fn pop_point(&mut self) -> Option<Point> {
        let popped = self.points.pop();
        if let Some(p) = popped {
            log::trace!("Polygon: removed ({}, {})", p.x, p.y);
        }
        popped
    }

    /// Remove all vertices.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Draw the polygon outline and point markers onto a viewport crop.
    ///
    /// `view` is the image region `canvas` shows. With `close` the last point
    /// is joined back to the first.
    pub fn render(&self, canvas: &mut RgbImage, view: ViewRect, close: bool) {
        if self.points.is_empty() {
            return;
        }
        let thickness = view.line_thickness();
        let (ox, oy) = (view.x as i32, view.y as i32);
        let local: Vec<(i32, i32)> = self
            .points
            .iter()
            .map(|p| (p.x.saturating_sub(ox), p.y.saturating_sub(oy)))
            .collect();

        let edge = Rgb(POLYGON_EDGE_COLOR);
        for pair in local.windows(2) {
            render::draw_thick_line(canvas, as_f32(pair[0]), as_f32(pair[1]), thickness, edge);
        }
        if close && local.len() > 2 {
            let (first, last) = (local[0], local[local.len() - 1]);
            render::draw_thick_line(canvas, as_f32(last), as_f32(first), thickness, edge);
        }

        let radius = (thickness * MARKER_RADIUS_FACTOR) as i32;
        for &p in &local {
            render::draw_marker(canvas, p, radius, thickness, Rgb(POLYGON_POINT_COLOR));
        }
    }

    /// Axis-aligned bounds of all points, half-open. `None` when empty.
    pub fn bounds(&self) -> Option<BBox> {
        let first = self.points.first()?;
        let init = BBox::new(first.x, first.y, first.x, first.y);
        Some(self.points.iter().fold(init, |b, p| {
            BBox::new(b.x1.min(p.x), b.y1.min(p.y), b.x2.max(p.x), b.y2.max(p.y))
        }))
    }

    /// Rasterize the polygon into a bounding box and a binary mask.
    ///
    /// The polygon itself is left untouched, also on failure.
    pub fn to_mask(&self) -> Result<(BBox, Array2<u8>), PolygonError> {
        let count = self.points.len();
        if count < MIN_POLYGON_VERTICES {
            return Err(PolygonError::InsufficientPoints { count });
        }
        let Some(bbox) = self.bounds() else {
            return Err(PolygonError::InsufficientPoints { count });
        };
        let (width, height) = (bbox.width(), bbox.height());
        if bbox.is_empty() {
            return Err(PolygonError::Degenerate { width, height });
        }
        if u64::from(width) * u64::from(height) > MAX_MASK_PIXELS {
            return Err(PolygonError::TooLarge { width, height });
        }

        let local: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|p| {
                (
                    f64::from(p.x) - f64::from(bbox.x1),
                    f64::from(p.y) - f64::from(bbox.y1),
                )
            })
            .collect();
        let mask = fill_even_odd(&local, bbox.width() as usize, bbox.height() as usize);

        log::debug!(
            "Rasterized {} points into {:?} ({} pixels set)",
            count,
            bbox,
            mask.iter().filter(|&&v| v != 0).count()
        );
        Ok((bbox, mask))
    }
}

/// Polygon overlay as seen by the renderer.
#[derive(Debug, Clone, Copy)]
pub struct PolygonOverlay<'a> {
    pub polygon: &'a PolygonEditor,
    /// Join the last point back to the first.
    pub close: bool,
}

impl OverlayProducer for PolygonOverlay<'_> {
    fn draw(&self, canvas: &mut RgbImage, view: ViewRect) {
        self.polygon.render(canvas, view, self.close);
    }
}

fn as_f32((x, y): (i32, i32)) -> (f32, f32) {
    (x as f32, y as f32)
}

/// Scan-line fill sampling pixel centres, even-odd rule.
///
/// `vertices` are relative to the raster origin; the closing edge is implied.
fn fill_even_odd(vertices: &[(f64, f64)], width: usize, height: usize) -> Array2<u8> {
    let mut mask = Array2::zeros((height, width));
    let mut crossings: Vec<f64> = Vec::with_capacity(vertices.len());

    for row in 0..height {
        let sy = row as f64 + 0.5;
        crossings.clear();

        let mut prev = vertices[vertices.len() - 1];
        for &curr in vertices {
            let (x0, y0) = prev;
            let (x1, y1) = curr;
            if (y0 > sy) != (y1 > sy) {
                crossings.push(x0 + (sy - y0) * (x1 - x0) / (y1 - y0));
            }
            prev = curr;
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            // Pixel centre c + 0.5 in [start, end)
            let first = (span[0] - 0.5).ceil().max(0.0) as usize;
            let last = ((span[1] - 0.5).ceil().max(0.0) as usize).min(width);
            for col in first..last {
                mask[[row, col]] = MASK_SET;
            }
        }
    }
    mask
}
