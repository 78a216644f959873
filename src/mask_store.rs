//! Ordered collection of committed masks.
//!
//! Insertion order is display order and persisted key order. The store also
//! caches one highlighted entry as a silhouette: the set pixels of its raster,
//! relative to the bbox origin. Compositing the highlight then only needs one
//! pass over that list. The cache is dropped on every delete, clear or replace,
//! so a cached index always names a live entry.

use image::RgbImage;
use ndarray::Array2;

use crate::constants::render::{HIGHLIGHT_COLOR, MASK_BOX_COLOR};
use crate::model::{BBox, MaskEntry, ViewRect};
use crate::render::{self, OverlayProducer};

/// Errors from indexing into the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The index does not name an entry
    #[error("Mask index {index} is out of range (store holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone)]
struct Highlight {
    index: usize,
    origin: (i32, i32),
    silhouette: Vec<(i32, i32)>,
}

impl Highlight {
    fn from_entry(index: usize, entry: &MaskEntry) -> Self {
        let silhouette = entry
            .mask
            .indexed_iter()
            .filter(|&(_, &v)| v != 0)
            .map(|((row, col), _)| (col as i32, row as i32))
            .collect();
        Self {
            index,
            origin: (entry.bbox.x1, entry.bbox.y1),
            silhouette,
        }
    }
}

/// Ordered mask entries plus the highlight cache.
#[derive(Debug, Clone, Default)]
pub struct MaskStore {
    entries: Vec<MaskEntry>,
    highlight: Option<Highlight>,
}

impl MaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new entry built from a rasterized polygon.
    pub fn append(&mut self, bbox: BBox, label: impl Into<String>, mask: Array2<u8>) -> usize {
        self.push(MaskEntry::new(bbox, label, mask))
    }

    /// Append an entry and return its index.
    pub fn push(&mut self, entry: MaskEntry) -> usize {
        log::debug!("Store: appended '{}' at {:?}", entry.label, entry.bbox);
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Remove the entry at `index`. The highlight is always dropped.
    pub fn delete(&mut self, index: usize) -> Result<MaskEntry, StoreError> {
        self.check_index(index)?;
        self.highlight = None;
        let removed = self.entries.remove(index);
        log::debug!("Store: deleted '{}' (index {})", removed.label, index);
        Ok(removed)
    }

    /// Borrow the entry at `index`.
    pub fn query(&self, index: usize) -> Result<&MaskEntry, StoreError> {
        self.check_index(index)?;
        Ok(&self.entries[index])
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.highlight = None;
        self.entries.clear();
    }

    /// Swap in a freshly loaded list of entries.
    pub fn replace(&mut self, entries: Vec<MaskEntry>) {
        self.highlight = None;
        self.entries = entries;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MaskEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaskEntry> {
        self.entries.iter()
    }

    /// Labels in display order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Highlight `index`, or clear the highlight if it is out of range.
    ///
    /// Requesting the already cached index reuses the cached silhouette.
    pub fn set_highlight(&mut self, index: usize) {
        if self.highlighted() == Some(index) {
            return;
        }
        self.highlight = self
            .entries
            .get(index)
            .map(|entry| Highlight::from_entry(index, entry));
        match &self.highlight {
            Some(h) => log::trace!(
                "Store: highlight {} ({} pixels)",
                index,
                h.silhouette.len()
            ),
            None => log::trace!("Store: highlight cleared (index {} out of range)", index),
        }
    }

    pub fn clear_highlight(&mut self) {
        self.highlight = None;
    }

    /// Index of the highlighted entry, if any.
    pub fn highlighted(&self) -> Option<usize> {
        self.highlight.as_ref().map(|h| h.index)
    }

    /// Draw bbox outlines for all entries, then blend the highlight.
    ///
    /// `canvas` shows the image region `view`. Only pixels covered by the
    /// highlighted silhouette change during blending.
    pub fn render(&self, canvas: &mut RgbImage, view: ViewRect) {
        let thickness = view.line_thickness();
        let (vx, vy) = (view.x as i32, view.y as i32);
        let color = image::Rgb(MASK_BOX_COLOR);

        for entry in &self.entries {
            let b = entry.bbox.offset_by(vx, vy);
            render::draw_box_outline(canvas, (b.x1, b.y1, b.x2, b.y2), thickness, color);
        }

        let Some(highlight) = &self.highlight else {
            return;
        };
        let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
        let ox = i64::from(highlight.origin.0) - i64::from(vx);
        let oy = i64::from(highlight.origin.1) - i64::from(vy);
        for &(dx, dy) in &highlight.silhouette {
            let (x, y) = (ox + i64::from(dx), oy + i64::from(dy));
            if (0..width).contains(&x) && (0..height).contains(&y) {
                render::blend_half(canvas.get_pixel_mut(x as u32, y as u32), HIGHLIGHT_COLOR);
            }
        }
    }

    fn check_index(&self, index: usize) -> Result<(), StoreError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            let err = StoreError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            };
            log::error!("{}", err);
            Err(err)
        }
    }
}

impl OverlayProducer for MaskStore {
    fn draw(&self, canvas: &mut RgbImage, view: ViewRect) {
        self.render(canvas, view);
    }
}
