#![cfg_attr(docsrs, feature(doc_cfg))]
//! Annotate D-Bus introspection XML with the QtDBus type names that
//! `qdbusxml2cpp` needs for complex signatures.
//!
//! ```rust,no_run
//! use qtdbus_annotate::{run, TypeMapping};
//!
//! # fn main() -> Result<(), qtdbus_annotate::AnnotateError> {
//! let summary = run(&["org.mpris.MediaPlayer2.Playlists.xml"], &TypeMapping::mpris())?;
//! println!("{} of {} files rewritten", summary.rewritten, summary.files);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use thiserror::Error;

pub mod annotate;
pub mod mapping;
mod process;

pub use annotate::{
    annotate_arg_container, annotate_document, annotate_interface, annotate_property, Direction,
};
pub use mapping::{TypeMapping, QT_TYPE_NAME};
pub use process::{process_file, run, validate_file, RunSummary};

/// The document root does not start with an `interface` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("XML file is missing interface node")]
pub struct MissingInterface;

#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("{}: {source}", .path.display())]
    Structure {
        path: PathBuf,
        #[source]
        source: MissingInterface,
    },
    #[error("{}: {source}", .path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: dbus_xml::XmlError,
    },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
