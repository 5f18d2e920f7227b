//! Longan - segmentation and reassembly for translatable office documents
//!
//! This library takes a Word document (.docx), an Excel workbook (.xlsx)
//! or a localization interchange file (.xlf, .xliff), breaks it into an
//! ordered list of translatable [`Segment`]s, and later writes translations
//! back into a copy of the original so that everything not translated is
//! left as it was.
//!
//! # Features
//!
//! - **Word documents**: one segment per paragraph, body and table cells in
//!   document order, with run formatting kept on export
//! - **Workbooks**: one segment per text cell, with shared strings split
//!   when cells that share an entry receive different translations
//! - **XLIFF 1.x and 2.x**: one segment per unit segment, inline markup
//!   replaced by `{N}` placeholders and restored on export
//! - **Placeholder QA**: compare the placeholders of a source and its
//!   translation before exporting
//!
//! # Example
//!
//! ```no_run
//! use longan::{AdapterRegistry, ExportRequest, SegmentOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = AdapterRegistry::with_default_adapters(SegmentOptions::default());
//! let bytes = std::fs::read("report.docx")?;
//! let adapter = registry
//!     .for_file_name("report.docx", None)
//!     .ok_or("unsupported file")?;
//!
//! let parsed = adapter.parse(&bytes)?;
//! let mut request = ExportRequest::new(bytes.clone());
//! for segment in &parsed.segments {
//!     request = request.with_target(segment.index, segment.source_text.to_uppercase());
//! }
//! std::fs::write("report.upper.docx", adapter.export(&request)?)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`adapter`]: the adapter contract, format detection and registry
//! - [`docx`], [`xlsx`], [`xliff`]: the format adapters
//! - [`container`]: ZIP package access and relationship resolution
//! - [`xml`]: lossless XML tree decoding and encoding
//! - [`tags`]: inline markup extraction, restoration and checks
//! - [`model`]: segments, parse results and export requests

pub mod adapter;
pub mod config;
pub mod container;
pub mod docx;
pub mod error;
pub mod model;
pub mod tags;
pub mod xliff;
pub mod xlsx;
pub mod xml;

#[cfg(test)]
mod testing;

pub use adapter::{AdapterRegistry, DocumentFormat, SegmentAdapter};
pub use config::{SegmentOptions, XmlOptions};
pub use error::{Error, ErrorKind, Result};
pub use model::{
    DocumentMetadata, ExportRequest, OriginalStructure, ParsedDocument, Segment, SegmentMetadata,
    SegmentTarget, SegmentType,
};
pub use tags::{Tag, TagKind};
