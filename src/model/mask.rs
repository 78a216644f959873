//! Committed mask entries.

use ndarray::Array2;

use crate::model::geometry::BBox;

/// Raster value written for pixels inside a mask.
pub const MASK_SET: u8 = 255;

/// A labelled binary raster covering a bounding box.
///
/// The raster has shape `(bbox.height(), bbox.width())` in row-major order:
/// `mask[[row, col]]` is image pixel `(bbox.x1 + col, bbox.y1 + row)`.
/// Any non-zero value counts as set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskEntry {
    /// Half-open bounding box in image coordinates.
    pub bbox: BBox,
    /// Label chosen when the mask was committed.
    pub label: String,
    /// Binary raster of the covered region.
    pub mask: Array2<u8>,
}

impl MaskEntry {
    pub fn new(bbox: BBox, label: impl Into<String>, mask: Array2<u8>) -> Self {
        Self {
            bbox,
            label: label.into(),
            mask,
        }
    }

    /// Check that the raster extent matches the bounding box.
    pub fn is_consistent(&self) -> bool {
        let (rows, cols) = self.mask.dim();
        rows == self.bbox.height() as usize && cols == self.bbox.width() as usize
    }

    /// Number of set pixels.
    pub fn area(&self) -> usize {
        self.mask.iter().filter(|&&v| v != 0).count()
    }

    /// Whether image pixel `(px, py)` belongs to this mask.
    pub fn covers(&self, px: i32, py: i32) -> bool {
        if !self.bbox.contains(px, py) {
            return false;
        }
        let row = (py - self.bbox.y1) as usize;
        let col = (px - self.bbox.x1) as usize;
        self.mask.get([row, col]).is_some_and(|&v| v != 0)
    }
}
