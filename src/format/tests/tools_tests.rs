//! Tests for mask value conversion and file splitting.

use super::scratch_dir;
use crate::format::mask_json::{self, MaskDocument};
use crate::format::tools::{self, converted_path};

const MERGED: &str = r#"{
    "a.png": {"0": {"bbox": [0, 0, 2, 1], "label": "x", "Mask": [[255, 0]]}},
    "b.png": {
        "0": {"bbox": [1, 1, 2, 3], "label": "y", "Mask": [[255], [7]]},
        "1": {"bbox": [0, 0, 1, 1], "label": "z", "Mask": [[0]]}
    }
}"#;

#[test]
fn test_threshold_sets_nonzero_values() {
    let mut document: MaskDocument = mask_json::parse_document(MERGED).unwrap();
    let changed = tools::threshold_document(&mut document, 1);
    assert_eq!(changed, 3);
    assert_eq!(document["a.png"]["0"].mask, vec![vec![1, 0]]);
    assert_eq!(document["b.png"]["0"].mask, vec![vec![1], vec![1]]);
    assert_eq!(document["b.png"]["1"].mask, vec![vec![0]]);
}

#[test]
fn test_converted_path_prefixes_file_name() {
    let path = std::path::Path::new("out").join("all.json");
    assert_eq!(
        converted_path(&path, 1),
        std::path::Path::new("out").join("mask1_all.json")
    );
}

#[test]
fn test_convert_mask_values_writes_new_file() {
    let dir = scratch_dir("convert");
    let input = dir.join("all.json");
    std::fs::write(&input, MERGED).unwrap();

    let output = tools::convert_mask_values(&input, 1).unwrap();
    assert_eq!(output, dir.join("mask1_all.json"));

    // Input is left as it was
    let original = std::fs::read_to_string(&input).unwrap();
    assert_eq!(original, MERGED);

    let converted = mask_json::parse_document(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(converted["b.png"]["0"].mask, vec![vec![1], vec![1]]);
}

#[test]
fn test_split_document_writes_one_file_per_image() {
    let dir = scratch_dir("split");
    let input = dir.join("merged.json");
    std::fs::write(&input, MERGED).unwrap();

    let written = tools::split_document(&input).unwrap();
    assert_eq!(written, vec![dir.join("a.png.json"), dir.join("b.png.json")]);

    // Each output is a valid per-image mask file
    let b = mask_json::load(&written[1], "b.png").unwrap();
    assert_eq!(b.len(), 2);
    assert_eq!(b[0].label, "y");

    // Four-space indentation
    let text = std::fs::read_to_string(&written[0]).unwrap();
    assert!(text.contains("\n    \"a.png\""));
}

#[test]
fn test_tools_report_missing_input() {
    let dir = scratch_dir("tools-missing");
    let err = tools::split_document(dir.join("nope.json")).unwrap_err();
    assert!(err.is_missing());
}

#[test]
fn test_split_keeps_outputs_next_to_input() {
    let dir = scratch_dir("split-escape");
    let input = dir.join("merged.json");
    std::fs::write(
        &input,
        r#"{"../escape.png": {}, "sub\\dir.png": {}, "plain.png": {}}"#,
    )
    .unwrap();

    let written = tools::split_document(&input).unwrap();
    assert_eq!(
        written,
        vec![
            dir.join(".._escape.png.json"),
            dir.join("plain.png.json"),
            dir.join("sub_dir.png.json"),
        ]
    );
    assert!(written.iter().all(|p| p.parent() == Some(dir.as_path())));
    assert!(!dir.parent().unwrap().join("escape.png.json").exists());
}

#[test]
fn test_split_file_name_replaces_separators() {
    assert_eq!(tools::split_file_name("a.png"), "a.png.json");
    assert_eq!(tools::split_file_name("x/y\\z.png"), "x_y_z.png.json");
}
