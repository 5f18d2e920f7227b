//! Error types for segmentation and reassembly.
//!
//! Every failure surfaced by an adapter falls in one of three classes:
//! the container or one of its parts does not have the expected shape
//! ([`Error::Structure`]), the document is well formed but has nothing to
//! translate ([`Error::Content`]), or the caller did not provide what an
//! operation needs ([`Error::Precondition`]).
use thiserror::Error;

use crate::xml::XmlError;

/// Part name used for failures that concern the archive as a whole.
pub const ARCHIVE_PART: &str = "<archive>";

/// Result type for segmentation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for segmentation operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The container or an XML part violates the expected schema
    #[error("Structure error in {part}: {message}")]
    Structure { part: String, message: String },

    /// The document is structurally valid but semantically empty
    #[error("Content error: {0}")]
    Content(String),

    /// The caller did not satisfy an operation's precondition
    #[error("Precondition failed: {0}")]
    Precondition(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Structure,
    Content,
    Precondition,
}

impl Error {
    /// Build a structure error for the given part.
    pub fn structure(part: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Error::Structure {
            part: part.into(),
            message: message.to_string(),
        }
    }

    /// Build a structure error for a part that is required but absent.
    pub fn missing_part(part: impl Into<String>) -> Self {
        Error::Structure {
            part: part.into(),
            message: "mandatory part is missing".to_string(),
        }
    }

    /// Wrap an XML decoding failure with the part it came from.
    pub fn xml(part: impl Into<String>, err: XmlError) -> Self {
        Error::Structure {
            part: part.into(),
            message: err.to_string(),
        }
    }

    /// Get the class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Structure { .. } => ErrorKind::Structure,
            Error::Content(_) => ErrorKind::Content,
            Error::Precondition(_) => ErrorKind::Precondition,
        }
    }

    /// Name of the offending part for structure errors.
    pub fn part(&self) -> Option<&str> {
        match self {
            Error::Structure { part, .. } => Some(part),
            _ => None,
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::structure(ARCHIVE_PART, err)
    }
}
