//! Format adapters and their common interface.
//!
//! Each supported format implements [`SegmentAdapter`]; an
//! [`AdapterRegistry`] picks the adapter for an uploaded file by MIME type
//! or extension.
mod registry;

pub use registry::AdapterRegistry;

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{ExportRequest, ParsedDocument};

/// MIME type of word-processing documents.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// MIME type of spreadsheet workbooks.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
/// MIME types of localization interchange files.
pub const XLIFF_MIMES: &[&str] = &["application/x-xliff+xml", "application/xliff+xml"];

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Office Open XML word-processing document (.docx)
    Docx,
    /// Office Open XML spreadsheet workbook (.xlsx)
    Xlsx,
    /// XML Localization Interchange File Format (.xlf, .xliff)
    Xliff,
}

static EXTENSIONS: phf::Map<&'static str, DocumentFormat> = phf_map! {
    "docx" => DocumentFormat::Docx,
    "xlsx" => DocumentFormat::Xlsx,
    "xlf" => DocumentFormat::Xliff,
    "xliff" => DocumentFormat::Xliff,
};

impl DocumentFormat {
    /// Short lowercase name of the format.
    pub fn name(self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Xlsx => "xlsx",
            DocumentFormat::Xliff => "xliff",
        }
    }

    /// MIME types that identify the format.
    pub fn mime_types(self) -> &'static [&'static str] {
        match self {
            DocumentFormat::Docx => &[DOCX_MIME],
            DocumentFormat::Xlsx => &[XLSX_MIME],
            DocumentFormat::Xliff => XLIFF_MIMES,
        }
    }

    /// Look up a format by file extension.
    ///
    /// Matching ignores ASCII case and an optional leading dot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use longan::adapter::DocumentFormat;
    ///
    /// assert_eq!(DocumentFormat::from_extension(".XLF"), Some(DocumentFormat::Xliff));
    /// assert_eq!(DocumentFormat::from_extension("pdf"), None);
    /// ```
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.strip_prefix('.').unwrap_or(extension);
        if extension.bytes().any(|b| b.is_ascii_uppercase()) {
            EXTENSIONS.get(extension.to_ascii_lowercase().as_str()).copied()
        } else {
            EXTENSIONS.get(extension).copied()
        }
    }

    /// Look up a format by MIME type, ignoring parameters such as `charset`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        [DocumentFormat::Docx, DocumentFormat::Xlsx, DocumentFormat::Xliff]
            .into_iter()
            .find(|f| f.mime_types().iter().any(|m| m.eq_ignore_ascii_case(essence)))
    }

    /// Check whether a MIME type or extension names this format.
    pub fn matches(self, mime: Option<&str>, extension: &str) -> bool {
        mime.and_then(Self::from_mime) == Some(self)
            || Self::from_extension(extension) == Some(self)
    }
}

/// Interface every format adapter implements.
///
/// Adapters hold only immutable options so one instance can serve
/// concurrent calls for different documents.
pub trait SegmentAdapter: Send + Sync {
    /// The format this adapter handles.
    fn format(&self) -> DocumentFormat;

    /// Check whether the adapter handles a file with this MIME type or extension.
    fn supports(&self, mime: Option<&str>, extension: &str) -> bool {
        self.format().matches(mime, extension)
    }

    /// Extract the translatable segments of a document.
    fn parse(&self, bytes: &[u8]) -> Result<ParsedDocument>;

    /// Rebuild the original document with translations substituted.
    ///
    /// Segments without a target, and segments whose target is blank, keep
    /// their source text, so re-parsing the output yields the same indices.
    fn export(&self, request: &ExportRequest) -> Result<Vec<u8>>;
}
