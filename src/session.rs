//! Annotation session: one image, its viewport, the polygon being drawn and
//! the committed masks.
//!
//! The session turns normalized pointer events into viewport and polygon
//! mutations and applies the load/save policy for the mask file. Every event
//! produces at most one mutation; callers re-render when
//! [`AnnotationSession::handle_event`] returns `true`.

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::config::AppConfig;
use crate::data::{ImageLoadError, SourceImage};
use crate::format::{self, PersistenceError};
use crate::mask_store::{MaskStore, StoreError};
use crate::model::MaskEntry;
use crate::polygon::{PolygonEditor, PolygonError, PolygonOverlay};
use crate::render::{OverlayProducer, RenderError};
use crate::viewport::ViewportTransform;

/// Mouse buttons the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Pointer input in widget coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press { x: f32, y: f32, button: MouseButton },
    Release { x: f32, y: f32, button: MouseButton },
    Move { x: f32, y: f32 },
    /// Positive `delta` zooms out.
    Wheel { x: f32, y: f32, delta: f32 },
}

/// An in-progress pan drag.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    button: MouseButton,
    last: (f32, f32),
}

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Image(#[from] ImageLoadError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Polygon(#[from] PolygonError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Controller owning all per-image state.
#[derive(Debug)]
pub struct AnnotationSession {
    image: SourceImage,
    viewport: ViewportTransform,
    polygon: PolygonEditor,
    store: MaskStore,
    surface: (u32, u32),
    drag: Option<DragState>,
    close_polygon: bool,
    draw_mask_boxes: bool,
    active_label: String,
    workspace_dir: PathBuf,
}

impl AnnotationSession {
    /// Start a session on an already loaded image. No masks are loaded.
    ///
    /// The surface starts at the image size.
    pub fn new(image: SourceImage, config: &AppConfig) -> Self {
        let viewport =
            ViewportTransform::new(image.width(), image.height(), config.viewport_config());
        let surface = (image.width(), image.height());
        Self {
            image,
            viewport,
            polygon: PolygonEditor::new(),
            store: MaskStore::new(),
            surface,
            drag: None,
            close_polygon: false,
            draw_mask_boxes: true,
            active_label: config.default_label().to_string(),
            workspace_dir: config.workspace_dir.clone(),
        }
    }

    /// Load the image at `path` and any masks saved for it.
    ///
    /// An image that cannot be loaded is fatal; the mask file follows the
    /// policy of [`AnnotationSession::load_masks`].
    pub fn open(path: impl AsRef<Path>, config: &AppConfig) -> Result<Self, SessionError> {
        let image = SourceImage::open(path)?;
        let mut session = Self::new(image, config);
        session.load_masks()?;
        Ok(session)
    }

    pub fn image(&self) -> &SourceImage {
        &self.image
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportTransform {
        &mut self.viewport
    }

    pub fn polygon(&self) -> &PolygonEditor {
        &self.polygon
    }

    pub fn store(&self) -> &MaskStore {
        &self.store
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    /// Set the size of the display surface in widget pixels.
    pub fn set_surface_size(&mut self, width: u32, height: u32) {
        self.surface = (width, height);
    }

    pub fn active_label(&self) -> &str {
        &self.active_label
    }

    pub fn set_active_label(&mut self, label: impl Into<String>) {
        self.active_label = label.into();
    }

    pub fn close_polygon(&self) -> bool {
        self.close_polygon
    }

    pub fn set_close_polygon(&mut self, close: bool) {
        self.close_polygon = close;
    }

    pub fn draw_mask_boxes(&self) -> bool {
        self.draw_mask_boxes
    }

    pub fn set_draw_mask_boxes(&mut self, draw: bool) {
        self.draw_mask_boxes = draw;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Where masks for the current image are persisted.
    pub fn mask_file_path(&self) -> PathBuf {
        format::mask_file_path(&self.workspace_dir, self.image.name())
    }

    /// Apply one pointer event. Returns whether the view needs a redraw.
    pub fn handle_event(&mut self, event: PointerEvent) -> bool {
        let (width, height) = self.surface;
        match event {
            PointerEvent::Press {
                x,
                y,
                button: MouseButton::Left,
            } => {
                let (px, py) = self.viewport.to_image_pixel(x, y, width, height);
                self.polygon.add_point(px as i32, py as i32);
                true
            }
            PointerEvent::Press { x, y, button } => {
                self.drag = Some(DragState {
                    button,
                    last: (x, y),
                });
                log::trace!("Drag started with {:?} at ({}, {})", button, x, y);
                false
            }
            PointerEvent::Move { x, y } => {
                let Some(drag) = self.drag.as_mut() else {
                    return false;
                };
                let (sx, sy) = drag.last;
                drag.last = (x, y);

                let before = self.viewport.view();
                self.viewport.pan(sx - x, sy - y);
                self.viewport.view() != before
            }
            PointerEvent::Release { button, .. } => {
                if self.drag.is_some_and(|d| d.button == button) {
                    self.drag = None;
                    log::trace!("Drag ended");
                }
                false
            }
            PointerEvent::Wheel { x, y, delta } => {
                let before = (self.viewport.view(), self.viewport.ratio());
                self.viewport.zoom(x, y, width, height, delta);
                (self.viewport.view(), self.viewport.ratio()) != before
            }
        }
    }

    /// Append a polygon vertex given in image coordinates.
    pub fn add_point(&mut self, x: i32, y: i32) {
        self.polygon.add_point(x, y);
    }

    /// Remove the last polygon point. Returns whether a point was removed.
    pub fn pop_point(&mut self) -> bool {
        self.polygon.pop_point().is_some()
    }

    pub fn clear_polygon(&mut self) {
        self.polygon.clear();
    }

    /// Rasterize the polygon into a new mask with the active label.
    ///
    /// The new entry is highlighted and the polygon cleared. On failure the
    /// polygon and the store are left as they were.
    pub fn commit_polygon(&mut self) -> Result<usize, SessionError> {
        let (bbox, mask) = self.polygon.to_mask()?;
        let index = self.store.append(bbox, self.active_label.clone(), mask);
        self.store.set_highlight(index);
        self.polygon.clear();
        log::info!("Committed mask {} '{}' at {:?}", index, self.active_label, bbox);
        Ok(index)
    }

    pub fn delete_mask(&mut self, index: usize) -> Result<MaskEntry, SessionError> {
        Ok(self.store.delete(index)?)
    }

    /// Highlight a mask without moving the view.
    pub fn highlight_mask(&mut self, index: usize) -> Result<(), SessionError> {
        self.store.query(index)?;
        self.store.set_highlight(index);
        Ok(())
    }

    /// Zoom to a mask's bounding box and highlight it.
    pub fn focus_mask(&mut self, index: usize) -> Result<(), SessionError> {
        let target = self.store.query(index)?.bbox.to_view_rect();
        self.viewport.set_viewport_to_cover(target);
        self.store.set_highlight(index);
        Ok(())
    }

    /// Replace the store with the masks saved for this image.
    ///
    /// A missing file starts empty; a malformed one is discarded with a
    /// warning. Returns the number of masks loaded.
    pub fn load_masks(&mut self) -> Result<usize, SessionError> {
        let path = self.mask_file_path();
        match format::load(&path, self.image.name()) {
            Ok(entries) => {
                let count = entries.len();
                self.store.replace(entries);
                Ok(count)
            }
            Err(PersistenceError::Missing { .. }) => {
                log::info!("No saved masks for '{}', starting empty", self.image.name());
                self.store.clear();
                Ok(0)
            }
            Err(PersistenceError::Malformed { reason }) => {
                log::warn!("Discarding masks from {:?}: {}", path, reason);
                self.store.clear();
                Ok(0)
            }
            Err(e) => {
                log::error!("Failed to read {:?}: {}", path, e);
                Err(e.into())
            }
        }
    }

    /// Write the store to the mask file. The store is unchanged on failure.
    pub fn save_masks(&self) -> Result<PathBuf, SessionError> {
        let path = self.mask_file_path();
        if let Err(e) = format::save(&path, self.image.name(), self.store.entries()) {
            log::error!("Failed to save masks to {:?}: {}", path, e);
            return Err(e.into());
        }
        Ok(path)
    }

    /// Render the current view at the surface size.
    ///
    /// The polygon is drawn first, then mask outlines and the highlight when
    /// mask boxes are enabled.
    pub fn render(&self) -> Result<RgbImage, SessionError> {
        let polygon = PolygonOverlay {
            polygon: &self.polygon,
            close: self.close_polygon,
        };
        let mut overlays: Vec<&dyn OverlayProducer> = vec![&polygon];
        if self.draw_mask_boxes {
            overlays.push(&self.store);
        }
        let (width, height) = self.surface;
        Ok(self
            .viewport
            .render(self.image.pixels(), width, height, &overlays)?)
    }
}
