//! Batch utilities for mask files.
//!
//! - [`convert_mask_values`]: rewrite every set mask value to a new number
//!   (e.g. `255` → `1` for training pipelines that expect `{0, 1}`).
//! - [`split_document`]: break a merged file into one file per image.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::constants::files::MASK_FILE_EXTENSION;
use crate::format::error::PersistenceError;
use crate::format::mask_json::{self, MaskDocument};

/// Set every non-zero mask value in `document` to `value`.
///
/// Returns the number of values rewritten.
pub fn threshold_document(document: &mut MaskDocument, value: u8) -> usize {
    let mut changed = 0;
    for record in document.values_mut().flat_map(|section| section.values_mut()) {
        for v in record.mask.iter_mut().flatten() {
            if *v != 0 && *v != value {
                *v = value;
                changed += 1;
            }
        }
    }
    changed
}

/// Output path used by [`convert_mask_values`]: `mask{value}_{filename}` next to the input.
pub fn converted_path(input: &Path, value: u8) -> PathBuf {
    let filename = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("mask{}_{}", value, filename))
}

/// Rewrite set mask values in the file at `input` and write the result
/// alongside it. Returns the path written.
pub fn convert_mask_values(input: impl AsRef<Path>, value: u8) -> Result<PathBuf, PersistenceError> {
    let input = input.as_ref();
    let mut document = read_document(input)?;
    let changed = threshold_document(&mut document, value);

    let output = converted_path(input, value);
    log::info!(
        "Writing {:?} ({} mask values set to {})",
        output,
        changed,
        value
    );
    std::fs::write(&output, serde_json::to_string(&document)?)?;
    Ok(output)
}

/// Write each top-level image key of `input` to `<dir>/<key>.json`.
///
/// Path separators in a key are replaced with `_`, so every output lands in
/// the input's directory. Output is indented with four spaces. Returns the
/// paths written, in key order.
pub fn split_document(input: impl AsRef<Path>) -> Result<Vec<PathBuf>, PersistenceError> {
    let input = input.as_ref();
    let document = read_document(input)?;
    let dir = input.parent().unwrap_or_else(|| Path::new(""));

    let mut written = Vec::with_capacity(document.len());
    for (key, section) in document {
        let path = dir.join(split_file_name(&key));
        log::info!("Writing {:?}", path);

        let single: MaskDocument = MaskDocument::from([(key, section)]);
        std::fs::write(&path, to_pretty_json(&single)?)?;
        written.push(path);
    }
    Ok(written)
}

/// `<key>.json` with path separators in `key` replaced.
pub fn split_file_name(key: &str) -> String {
    let safe: String = key
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    if safe != key {
        log::warn!("Image key '{}' contains path separators, writing '{}'", key, safe);
    }
    format!("{}.{}", safe, MASK_FILE_EXTENSION)
}

fn read_document(path: &Path) -> Result<MaskDocument, PersistenceError> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PersistenceError::Missing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };
    mask_json::parse_document(&json)
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, PersistenceError> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(out)
}
