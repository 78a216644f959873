//! Source image loading.
//!
//! This module provides:
//! - `SourceImage`: the decoded, read-only RGB image being annotated
//! - `ImageLoadError`: why an image could not be opened
//!
//! ```rust,ignore
//! use polymask::data::SourceImage;
//!
//! let image = SourceImage::open("workspace/leaf_01.jpg")?;
//! println!("{} is {}x{}", image.name(), image.width(), image.height());
//! ```

mod loader;

pub use loader::{ImageLoadError, SUPPORTED_EXTENSIONS, SourceImage, is_supported_file};
