//! Integer geometry shared by the viewport, the polygon editor and the mask store.

use serde::{Deserialize, Serialize};

/// A point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// An origin + extent rectangle in image pixel coordinates.
///
/// Used for the visible viewport region and for focus targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewRect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ViewRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Outline thickness that stays visually constant across zoom levels.
    pub fn line_thickness(&self) -> u32 {
        let longest = self.width.max(self.height) as f32;
        ((longest * crate::constants::render::THICKNESS_FACTOR) as u32).max(1)
    }
}

/// Axis-aligned bounding box with half-open extent `[x1, x2) × [y1, y2)`.
///
/// Serialized as the `[x1, y1, x2, y2]` array used by the mask files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width of the box (`x2 - x1`), zero for inverted boxes.
    pub fn width(&self) -> u32 {
        extent(self.x1, self.x2)
    }

    /// Height of the box (`y2 - y1`), zero for inverted boxes.
    pub fn height(&self) -> u32 {
        extent(self.y1, self.y2)
    }

    /// Whether `x1 <= x2` and `y1 <= y2`.
    pub fn is_ordered(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Whether pixel `(px, py)` lies inside the half-open box.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        self.x1 <= px && px < self.x2 && self.y1 <= py && py < self.y2
    }

    /// Translate by `(-dx, -dy)`, e.g. into viewport-relative coordinates.
    ///
    /// Saturates at the `i32` range.
    pub fn offset_by(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x1.saturating_sub(dx),
            self.y1.saturating_sub(dy),
            self.x2.saturating_sub(dx),
            self.y2.saturating_sub(dy),
        )
    }

    /// The origin + extent form used as a focus target.
    ///
    /// Negative origins are clipped to zero.
    pub fn to_view_rect(&self) -> ViewRect {
        ViewRect::new(
            self.x1.max(0) as u32,
            self.y1.max(0) as u32,
            self.width(),
            self.height(),
        )
    }
}

/// `hi - lo` without overflow; the difference of two `i32` always fits `u32`.
fn extent(lo: i32, hi: i32) -> u32 {
    (i64::from(hi) - i64::from(lo)).max(0) as u32
}

impl From<[i32; 4]> for BBox {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BBox> for [i32; 4] {
    fn from(b: BBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}
