//! Per-image JSON mask files.
//!
//! One file per source image, named `<image_filename>.json`:
//!
//! ```json
//! {
//!   "leaf_01.jpg": {
//!     "0": {"bbox": [x1, y1, x2, y2], "label": "lesion", "Mask": [[0, 255, ...], ...]},
//!     "1": { ... }
//!   }
//! }
//! ```
//!
//! Entry keys are the decimal insertion index. Loading is all-or-nothing: any
//! schema violation rejects the whole file.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::constants::files::MASK_FILE_EXTENSION;
use crate::format::error::PersistenceError;
use crate::model::{BBox, MaskEntry};

/// One mask as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskRecord {
    pub bbox: BBox,
    pub label: String,
    #[serde(rename = "Mask")]
    pub mask: Vec<Vec<u8>>,
}

/// Entries of one image, keyed by their decimal index.
pub type ImageSection = BTreeMap<String, MaskRecord>;

/// A whole mask file: image file name → entries.
///
/// Per-image files hold a single key; merged files may hold several.
pub type MaskDocument = BTreeMap<String, ImageSection>;

impl MaskRecord {
    /// Convert into an in-memory entry, checking the raster shape.
    pub fn into_entry(self) -> Result<MaskEntry, PersistenceError> {
        let rows = self.mask.len();
        let cols = self.mask.first().map_or(0, Vec::len);
        if let Some(bad) = self.mask.iter().position(|row| row.len() != cols) {
            return Err(PersistenceError::malformed(format!(
                "mask of '{}' is ragged: row {} has {} values, expected {}",
                self.label,
                bad,
                self.mask[bad].len(),
                cols
            )));
        }
        if !self.bbox.is_ordered() {
            return Err(PersistenceError::malformed(format!(
                "bbox {:?} of '{}' is inverted",
                <[i32; 4]>::from(self.bbox),
                self.label
            )));
        }

        let flat: Vec<u8> = self.mask.into_iter().flatten().collect();
        let mask = Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| PersistenceError::malformed(e.to_string()))?;
        let entry = MaskEntry::new(self.bbox, self.label, mask);
        if !entry.is_consistent() {
            return Err(PersistenceError::malformed(format!(
                "mask of '{}' is {}x{} but bbox {:?} is {}x{}",
                entry.label,
                cols,
                rows,
                <[i32; 4]>::from(entry.bbox),
                entry.bbox.width(),
                entry.bbox.height()
            )));
        }
        Ok(entry)
    }

    pub fn from_entry(entry: &MaskEntry) -> Self {
        Self {
            bbox: entry.bbox,
            label: entry.label.clone(),
            mask: entry.mask.rows().into_iter().map(|r| r.to_vec()).collect(),
        }
    }
}

/// Path of the mask file for `image_name` inside `dir`.
pub fn mask_file_path(dir: impl AsRef<Path>, image_name: &str) -> PathBuf {
    dir.as_ref()
        .join(format!("{}.{}", image_name, MASK_FILE_EXTENSION))
}

/// Read the entries stored for `image_name`.
///
/// A missing file is [`PersistenceError::Missing`]; every schema violation is
/// [`PersistenceError::Malformed`].
pub fn load(path: impl AsRef<Path>, image_name: &str) -> Result<Vec<MaskEntry>, PersistenceError> {
    let path = path.as_ref();
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PersistenceError::Missing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let entries = parse(&json, image_name)?;
    log::info!("Loaded {} masks from {:?}", entries.len(), path);
    Ok(entries)
}

/// Parse a mask file held in memory.
pub fn parse(json: &str, image_name: &str) -> Result<Vec<MaskEntry>, PersistenceError> {
    let mut document = parse_document(json)?;
    if document.len() != 1 || !document.contains_key(image_name) {
        let keys: Vec<&String> = document.keys().collect();
        return Err(PersistenceError::malformed(format!(
            "expected the single top-level key '{}', found {:?}",
            image_name, keys
        )));
    }
    let section = document.remove(image_name).unwrap_or_default();
    section_to_entries(section)
}

/// Parse any mask document, single- or multi-image.
///
/// A key repeated within one JSON object is rejected.
pub fn parse_document(json: &str) -> Result<MaskDocument, PersistenceError> {
    let document: UniqueKeys<UniqueKeys<MaskRecord>> =
        serde_json::from_str(json).map_err(|e| PersistenceError::malformed(e.to_string()))?;
    Ok(document
        .0
        .into_iter()
        .map(|(image, section)| (image, section.0))
        .collect())
}

/// String-keyed map that fails to deserialize on a repeated key.
struct UniqueKeys<V>(BTreeMap<String, V>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for UniqueKeys<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UniqueKeysVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueKeysVisitor<V> {
            type Value = UniqueKeys<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object without repeated keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = BTreeMap::new();
                while let Some(key) = access.next_key::<String>()? {
                    if map.contains_key(&key) {
                        let msg = format!("key '{}' appears more than once", key);
                        return Err(de::Error::custom(msg));
                    }
                    let value = access.next_value()?;
                    map.insert(key, value);
                }
                Ok(UniqueKeys(map))
            }
        }

        deserializer.deserialize_map(UniqueKeysVisitor(PhantomData))
    }
}

/// Order a section by numeric key and convert every record.
pub fn section_to_entries(section: ImageSection) -> Result<Vec<MaskEntry>, PersistenceError> {
    let mut numbered = Vec::with_capacity(section.len());
    for (key, record) in section {
        let index: usize = key
            .parse()
            .map_err(|_| PersistenceError::malformed(format!("entry key '{}' is not a number", key)))?;
        numbered.push((index, record));
    }
    numbered.sort_by_key(|(index, _)| *index);
    if let Some(pair) = numbered.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(PersistenceError::malformed(format!(
            "entry index {} appears more than once",
            pair[0].0
        )));
    }

    numbered
        .into_iter()
        .map(|(_, record)| record.into_entry())
        .collect()
}

/// Serialize entries as a mask file, numbered `"0".."N-1"` in order.
pub fn to_json(image_name: &str, entries: &[MaskEntry]) -> Result<String, PersistenceError> {
    let document = BTreeMap::from([(image_name, NumberedEntries(entries))]);
    Ok(serde_json::to_string(&document)?)
}

/// Write entries to `path`, replacing any previous file.
pub fn save(
    path: impl AsRef<Path>,
    image_name: &str,
    entries: &[MaskEntry],
) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let json = to_json(image_name, entries)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;

    log::info!("Saved {} masks to {:?}", entries.len(), path);
    Ok(())
}

/// Serializes entries as a map in insertion order with index keys.
struct NumberedEntries<'a>(&'a [MaskEntry]);

impl Serialize for NumberedEntries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (i, entry) in self.0.iter().enumerate() {
            map.serialize_entry(&i.to_string(), &MaskRecord::from_entry(entry))?;
        }
        map.end()
    }
}
