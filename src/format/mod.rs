//! Mask file persistence.
//!
//! Masks are stored as one JSON file per source image, keyed by the image's
//! file name. See [`mask_json`] for the layout and validation rules and
//! [`tools`] for batch conversion helpers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use polymask::format::{self, PersistenceError};
//!
//! let path = format::mask_file_path("./workspace", "leaf_01.jpg");
//! match format::load(&path, "leaf_01.jpg") {
//!     Ok(entries) => println!("{} masks", entries.len()),
//!     Err(PersistenceError::Missing { .. }) => println!("nothing saved yet"),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

mod error;
pub mod mask_json;
pub mod tools;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use mask_json::{
    ImageSection, MaskDocument, MaskRecord, load, mask_file_path, parse, parse_document, save,
    to_json,
};
pub use tools::{convert_mask_values, split_document};
