//! Data models for polymask.

mod geometry;
mod mask;

pub use geometry::{BBox, Point, ViewRect};
pub use mask::{MASK_SET, MaskEntry};
