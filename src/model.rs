//! Segment data model.
//!
//! Everything here derives `Serialize`/`Deserialize` so an external store
//! can persist parse results and build export requests.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::adapter::DocumentFormat;
use crate::error::{Error, Result};
use crate::tags::Tag;

/// Kind of translatable unit a segment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    /// A body paragraph of a word-processing document
    Paragraph,
    /// A paragraph inside a table cell
    TableCell,
    /// A spreadsheet cell
    Cell,
    /// A whole worksheet treated as one unit
    SheetUnit,
    /// A translation unit of a localization file
    LocalizationUnit,
}

/// Position of a word-processing paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocxLocation {
    /// Paragraph directly in the body; `paragraph_index` counts all body paragraphs
    Body { paragraph_index: usize },
    /// Paragraph inside a table cell
    TableCell {
        table_index: usize,
        row_index: usize,
        cell_index: usize,
        paragraph_index: usize,
    },
}

/// Formatting of one run of a paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFormat {
    /// Serialized `w:rPr` element, if the run has one
    pub properties: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Character style ID (`w:rStyle`)
    pub style: Option<String>,
}

/// Format-specific information about where a segment lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum SegmentMetadata {
    Docx {
        location: DocxLocation,
        /// Serialized `w:pPr` element, if the paragraph has one
        paragraph_properties: Option<String>,
        runs: Vec<RunFormat>,
    },
    Xlsx {
        sheet_name: String,
        sheet_index: usize,
        /// A1-style reference
        cell_ref: String,
        /// 1-based row number
        row: u32,
        /// 1-based column number
        column: u32,
        /// Value of the cell's `t` attribute (`n` when absent)
        cell_type: String,
        shared_string_index: Option<usize>,
    },
    Xliff {
        version: String,
        file_index: usize,
        file_original: Option<String>,
        unit_id: Option<String>,
        segment_id: Option<String>,
        resname: Option<String>,
        notes: Vec<String>,
        source_language: Option<String>,
        target_language: Option<String>,
    },
}

/// One translatable text unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Zero-based position in traversal order
    pub index: usize,
    /// Non-empty source text, with placeholders for tag-bearing formats
    pub source_text: String,
    pub segment_type: SegmentType,
    /// Inline markup lifted out of `source_text`
    pub tags: Vec<Tag>,
    /// Translation already present in the source file
    pub target_mt: Option<String>,
    pub metadata: SegmentMetadata,
}

impl Segment {
    /// Number of whitespace-separated words in the source text.
    #[inline]
    pub fn word_count(&self) -> usize {
        count_words(&self.source_text)
    }
}

/// Count whitespace-separated words.
#[inline]
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Document-level information gathered during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub format: DocumentFormat,
    pub segment_count: usize,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
}

/// A worksheet seen while parsing a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSummary {
    pub name: String,
    pub index: usize,
    /// Resolved worksheet part name
    pub part: String,
    pub segment_count: usize,
}

/// A `<file>` seen while parsing a localization file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub index: usize,
    pub original: Option<String>,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
    pub unit_count: usize,
}

/// Snapshot of the container's shape at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum OriginalStructure {
    Docx {
        paragraph_count: usize,
        table_count: usize,
    },
    Xlsx {
        sheets: Vec<SheetSummary>,
        shared_string_count: usize,
    },
    Xliff {
        version: String,
        files: Vec<FileSummary>,
    },
}

/// Result of parsing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub segments: Vec<Segment>,
    pub metadata: DocumentMetadata,
    pub total_words: usize,
    pub original_structure: OriginalStructure,
}

impl ParsedDocument {
    /// Assemble a parse result, failing when nothing was extracted.
    pub fn new(
        format: DocumentFormat,
        segments: Vec<Segment>,
        languages: (Option<String>, Option<String>),
        original_structure: OriginalStructure,
    ) -> Result<Self> {
        if segments.is_empty() {
            return Err(Error::Content(format!(
                "no translatable text found in {} document",
                format.name()
            )));
        }

        let total_words = segments.iter().map(Segment::word_count).sum();
        let (source_language, target_language) = languages;
        log::debug!(
            "parsed {} document: {} segments, {} words",
            format.name(),
            segments.len(),
            total_words
        );

        Ok(Self {
            metadata: DocumentMetadata {
                format,
                segment_count: segments.len(),
                source_language,
                target_language,
            },
            segments,
            total_words,
            original_structure,
        })
    }
}

/// Translated text for one segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentTarget {
    pub index: usize,
    pub target_text: String,
}

/// Everything an export needs: the original bytes and the translations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub segments: Vec<SegmentTarget>,
    pub original_buffer: Option<Vec<u8>>,
}

impl ExportRequest {
    /// Create a request for the given original container.
    pub fn new(original: impl Into<Vec<u8>>) -> Self {
        Self {
            segments: Vec::new(),
            original_buffer: Some(original.into()),
        }
    }

    /// Builder: add a translation.
    pub fn with_target(mut self, index: usize, target_text: impl Into<String>) -> Self {
        self.segments.push(SegmentTarget {
            index,
            target_text: target_text.into(),
        });
        self
    }

    /// The original container bytes, which must be present and non-empty.
    pub fn original(&self) -> Result<&[u8]> {
        match self.original_buffer.as_deref() {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            Some(_) => Err(Error::Precondition("original buffer is empty".to_string())),
            None => Err(Error::Precondition(
                "export requires the original document buffer".to_string(),
            )),
        }
    }

    /// Translations keyed by segment index; a later entry for the same index wins.
    ///
    /// Blank targets are left out and the source text stays in place.
    pub fn targets(&self) -> HashMap<usize, &str> {
        let mut targets: HashMap<usize, &str> = self
            .segments
            .iter()
            .map(|s| (s.index, s.target_text.as_str()))
            .collect();
        targets.retain(|index, text| {
            let keep = !text.trim().is_empty();
            if !keep {
                log::warn!("blank target for segment {} ignored, source text kept", index);
            }
            keep
        });
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn segment(index: usize, text: &str) -> Segment {
        Segment {
            index,
            source_text: text.to_string(),
            segment_type: SegmentType::Paragraph,
            tags: Vec::new(),
            target_mt: None,
            metadata: SegmentMetadata::Docx {
                location: DocxLocation::Body { paragraph_index: index },
                paragraph_properties: None,
                runs: Vec::new(),
            },
        }
    }

    #[test]
    fn test_parsed_document_counts_words() {
        let doc = ParsedDocument::new(
            DocumentFormat::Docx,
            vec![segment(0, "Hello  world"), segment(1, " one\ttwo three ")],
            (None, None),
            OriginalStructure::Docx {
                paragraph_count: 2,
                table_count: 0,
            },
        )
        .unwrap();
        assert_eq!(doc.total_words, 5);
        assert_eq!(doc.metadata.segment_count, 2);
    }

    #[test]
    fn test_empty_document_is_content_error() {
        let err = ParsedDocument::new(
            DocumentFormat::Xlsx,
            Vec::new(),
            (None, None),
            OriginalStructure::Xlsx {
                sheets: Vec::new(),
                shared_string_count: 0,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Content);
        assert!(err.to_string().contains("xlsx"));
    }

    #[test]
    fn test_export_request_preconditions() {
        assert_eq!(
            ExportRequest::default().original().unwrap_err().kind(),
            ErrorKind::Precondition
        );
        assert_eq!(
            ExportRequest::new(Vec::new()).original().unwrap_err().kind(),
            ErrorKind::Precondition
        );

        let request = ExportRequest::new(b"PK".to_vec())
            .with_target(0, "a")
            .with_target(0, "b");
        assert_eq!(request.original().unwrap(), b"PK");
        assert_eq!(request.targets().get(&0), Some(&"b"));
    }

    #[test]
    fn test_blank_targets_are_ignored() {
        let request = ExportRequest::new(b"PK".to_vec())
            .with_target(0, " ")
            .with_target(1, "ok")
            .with_target(2, "later")
            .with_target(2, "\t\n");
        let targets = request.targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets.get(&1), Some(&"ok"));
    }
}
