//! Read-annotate-write over files on disk.

use std::fs;
use std::path::Path;

use dbus_xml::Document;
use tracing::debug;

use crate::annotate::{annotate_document, check_structure};
use crate::mapping::TypeMapping;
use crate::AnnotateError;

/// Outcome of a [`run`] over a list of files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files processed.
    pub files: usize,
    /// Files written back because at least one annotation was added.
    pub rewritten: usize,
}

fn load(path: &Path) -> Result<Document, AnnotateError> {
    let xml = fs::read_to_string(path).map_err(|source| AnnotateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    dbus_xml::parse(&xml).map_err(|source| AnnotateError::Xml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse `path` and check that it is an interface description, without
/// touching the file.
pub fn validate_file(path: impl AsRef<Path>) -> Result<(), AnnotateError> {
    let path = path.as_ref();
    let document = load(path)?;
    check_structure(&document).map_err(|source| AnnotateError::Structure {
        path: path.to_path_buf(),
        source,
    })
}

/// Annotate one file in place.
///
/// The file is only rewritten when an annotation was added; returns whether
/// that happened.
pub fn process_file(path: impl AsRef<Path>, mapping: &TypeMapping) -> Result<bool, AnnotateError> {
    let path = path.as_ref();
    let mut document = load(path)?;
    let modified =
        annotate_document(&mut document, mapping).map_err(|source| AnnotateError::Structure {
            path: path.to_path_buf(),
            source,
        })?;

    if !modified {
        debug!(path = %path.display(), "already annotated, leaving untouched");
        return Ok(false);
    }

    let xml = dbus_xml::to_string(&document).map_err(|source| AnnotateError::Xml {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, xml).map_err(|source| AnnotateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "rewrote annotated file");
    Ok(true)
}

/// Annotate every file in order.
///
/// All files are validated before the first one is modified, so a malformed
/// input anywhere in the list aborts the run with every file left as it was.
pub fn run<P: AsRef<Path>>(paths: &[P], mapping: &TypeMapping) -> Result<RunSummary, AnnotateError> {
    for path in paths {
        validate_file(path)?;
    }

    let mut summary = RunSummary::default();
    for path in paths {
        summary.files += 1;
        if process_file(path, mapping)? {
            summary.rewritten += 1;
        }
    }
    Ok(summary)
}
