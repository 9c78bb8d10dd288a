//! COCO JSON reader and writer.
//!
//! Documents are read and written as-is: no sorting, no id remapping and no
//! schema migration. Lists keep the order they had in the input so that the
//! dense category slots and the sample order stay stable across a
//! filter-then-load round trip.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::model::AnnotationDocument;
use crate::error::FlexCocoError;

/// Reads a document from a COCO JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use flexcoco::coco::io_coco_json::read_coco_json;
///
/// let document = read_coco_json(Path::new("annotations.json"))?;
/// # Ok::<(), flexcoco::FlexCocoError>(())
/// ```
pub fn read_coco_json(path: &Path) -> Result<AnnotationDocument, FlexCocoError> {
    let file = File::open(path).map_err(FlexCocoError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| FlexCocoError::CocoJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a document to a COCO JSON file, replacing any existing file.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_coco_json(path: &Path, document: &AnnotationDocument) -> Result<(), FlexCocoError> {
    let file = File::create(path).map_err(FlexCocoError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, document).map_err(|source| {
        FlexCocoError::CocoJsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(FlexCocoError::Io)
}

/// Reads a document from a COCO JSON string.
///
/// Useful for testing without file I/O.
pub fn from_coco_str(json: &str) -> Result<AnnotationDocument, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a document from a COCO JSON byte slice.
pub fn from_coco_slice(bytes: &[u8]) -> Result<AnnotationDocument, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Writes a document to a pretty-printed COCO JSON string.
pub fn to_coco_string(document: &AnnotationDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}
