//! polymask - Polygon Mask Annotation
//!
//! Annotate regions of a raster image with polygon-bounded masks, each tagged
//! with a label, and persist them as one JSON file per image. The library
//! holds the geometric and raster core: a pan/zoom viewport, a polygon editor
//! with scan-line rasterization, and a mask store with outline and highlight
//! compositing. [`AnnotationSession`] ties them together behind pointer events.

pub mod config;
pub mod constants;
pub mod data;
pub mod format;
pub mod mask_store;
pub mod model;
pub mod polygon;
pub mod render;
pub mod session;
pub mod viewport;

#[cfg(test)]
mod test_image;

pub use config::{AppConfig, ConfigError, LogLevel};
pub use data::{ImageLoadError, SourceImage};
pub use format::PersistenceError;
pub use mask_store::{MaskStore, StoreError};
pub use model::{BBox, MaskEntry, Point, ViewRect};
pub use polygon::{PolygonEditor, PolygonError, PolygonOverlay};
pub use render::{OverlayProducer, RenderError};
pub use session::{AnnotationSession, MouseButton, PointerEvent, SessionError};
pub use viewport::{ViewportConfig, ViewportTransform};
