//! Error types for coursemd operations.

use thiserror::Error;

/// Errors that can occur while unpacking or converting a courseware archive.
///
/// Only missing required inputs abort a run. Structural problems in chapter
/// content (malformed markup, missing body elements, no matching chapter)
/// degrade locally with a logged warning instead of surfacing here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Invalid markup: {0}")]
    InvalidMarkup(String),

    #[error("Decoding error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
