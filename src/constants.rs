//! Global constants for polymask

/// Viewport zoom limits and defaults.
pub mod viewport {
    /// Smallest viewport extent, in percent of the image.
    pub const MIN_RATIO: i32 = 1;

    /// Largest viewport extent (the whole image).
    pub const MAX_RATIO: i32 = 100;

    /// Ratio change per wheel notch.
    pub const DEFAULT_WHEEL_SENSITIVITY: f32 = 5.0;

    /// Image pixels moved per widget pixel dragged.
    pub const DEFAULT_PAN_SENSITIVITY: f32 = 1.0;
}

/// Overlay drawing parameters.
pub mod render {
    /// Outline thickness as a fraction of the longest viewport side.
    pub const THICKNESS_FACTOR: f32 = 0.001;

    /// Polygon point marker radius, in multiples of the line thickness.
    pub const MARKER_RADIUS_FACTOR: u32 = 3;

    /// Polygon edge color
    pub const POLYGON_EDGE_COLOR: [u8; 3] = [255, 0, 0];

    /// Polygon point marker color
    pub const POLYGON_POINT_COLOR: [u8; 3] = [0, 0, 255];

    /// Mask bounding box outline color
    pub const MASK_BOX_COLOR: [u8; 3] = [0, 255, 0];

    /// Fill color blended over the highlighted mask
    pub const HIGHLIGHT_COLOR: [u8; 3] = [0, 255, 255];
}

/// File naming and locations.
pub mod files {
    /// Directory used for settings and mask files when nothing else is configured.
    pub const DEFAULT_WORKSPACE_DIR: &str = "./workspace";

    /// Settings file name inside the workspace or config directory.
    pub const SETTINGS_FILE_NAME: &str = "setting.json";

    /// Extension appended to the image file name for its mask file.
    pub const MASK_FILE_EXTENSION: &str = "json";
}
