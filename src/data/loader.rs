//! Loading the source raster image.
//!
//! ## Supported Formats
//!
//! PNG, JPEG, TIFF, BMP and WebP, decoded with the `image` crate and
//! converted to 8-bit RGB. The image is read once per session and never
//! modified afterwards.

use std::path::{Path, PathBuf};

use image::RgbImage;

/// File extensions offered when picking an image (lowercase, without dots).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp", "webp"];

/// Errors that can occur while loading the source image.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    /// File does not exist
    #[error("Image not found: {path:?}")]
    NotFound { path: PathBuf },

    /// File exists but could not be read
    #[error("Failed to read image {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes could not be decoded as an image
    #[error("Failed to decode image '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    /// Decoded image has no pixels
    #[error("Image '{name}' is empty")]
    Empty { name: String },
}

/// The immutable image being annotated.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbImage,
    name: String,
    path: Option<PathBuf>,
}

impl SourceImage {
    /// Read and decode an image file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageLoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ImageLoadError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ImageLoadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let name = file_name(path);
        let mut image = Self::from_bytes(&bytes, name)?;
        image.path = Some(path.to_path_buf());
        Ok(image)
    }

    /// Decode an image from memory. `name` keys the mask file.
    pub fn from_bytes(bytes: &[u8], name: impl Into<String>) -> Result<Self, ImageLoadError> {
        let name = name.into();
        if !looks_like_image(bytes) {
            log::debug!("No known magic bytes in '{}', trying to decode anyway", name);
        }
        let decoded = image::load_from_memory(bytes).map_err(|source| ImageLoadError::Decode {
            name: name.clone(),
            source,
        })?;
        Self::from_rgb(decoded.to_rgb8(), name)
    }

    /// Wrap an already decoded image.
    pub fn from_rgb(pixels: RgbImage, name: impl Into<String>) -> Result<Self, ImageLoadError> {
        let name = name.into();
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(ImageLoadError::Empty { name });
        }
        log::info!(
            "Loaded image '{}' ({}x{})",
            name,
            pixels.width(),
            pixels.height()
        );
        Ok(Self {
            pixels,
            name,
            path: None,
        })
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Base file name, used as the top-level key of the mask file.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Check if a file name has a supported image extension.
pub fn is_supported_file(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Check common image magic bytes.
fn looks_like_image(data: &[u8]) -> bool {
    if data.len() < 8 {
        return false;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
        // JPEG: FF D8 FF
        || data.starts_with(&[0xFF, 0xD8, 0xFF])
        // BMP: BM
        || data.starts_with(b"BM")
        // TIFF, little and big endian
        || data.starts_with(&[0x49, 0x49, 0x2A, 0x00])
        || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        // WebP: RIFF....WEBP
        || (data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_image::{self, Pattern};
    use image::Rgb;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        test_image::png_bytes(width, height, Pattern::Solid([12, 34, 56]))
    }

    #[test]
    fn test_decode_png_from_memory() {
        let image = SourceImage::from_bytes(&png_bytes(7, 5), "leaf.png").unwrap();
        assert_eq!((image.width(), image.height()), (7, 5));
        assert_eq!(image.name(), "leaf.png");
        assert_eq!(image.pixels().get_pixel(3, 3), &Rgb([12, 34, 56]));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let err = SourceImage::from_bytes(b"definitely not an image", "x.png").unwrap_err();
        assert!(matches!(err, ImageLoadError::Decode { .. }));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let path = std::env::temp_dir().join("polymask-no-such-image.png");
        let err = SourceImage::open(&path).unwrap_err();
        assert!(matches!(err, ImageLoadError::NotFound { .. }));
    }

    #[test]
    fn test_open_keeps_file_name() {
        let dir = std::env::temp_dir().join("polymask-loader-open");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tile_03.png");
        std::fs::write(&path, png_bytes(4, 4)).unwrap();

        let image = SourceImage::open(&path).unwrap();
        assert_eq!(image.name(), "tile_03.png");
        assert_eq!(image.path(), Some(path.as_path()));
    }

    #[test]
    fn test_magic_detection() {
        assert!(looks_like_image(&png_bytes(1, 1)));
        assert!(looks_like_image(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0]));
        assert!(!looks_like_image(b"short"));
        assert!(!looks_like_image(b"plain text file"));
    }

    #[test]
    fn test_is_supported_file() {
        assert!(is_supported_file("image.png"));
        assert!(is_supported_file("SCAN.TIF"));
        assert!(!is_supported_file("document.pdf"));
    }
}
