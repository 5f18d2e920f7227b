//! Localization interchange files (.xlf, .xliff).
//!
//! XLIFF is a bare XML document rather than a package. Each translation
//! unit (1.x) or unit segment (2.x) with non-blank source text becomes one
//! segment. Inline markup in the source is lifted out with the tag codec,
//! so segment text carries `{N}` placeholders and the markup travels in
//! [`Segment::tags`](crate::model::Segment::tags).
mod units;
mod version;

use crate::adapter::{DocumentFormat, SegmentAdapter};
use crate::config::SegmentOptions;
use crate::error::{Error, Result};
use crate::model::{
    ExportRequest, FileSummary, OriginalStructure, ParsedDocument, Segment, SegmentMetadata,
    SegmentType,
};
use crate::tags::{self, Extracted};
use crate::xml::{self, Element, XmlDocument, XmlNode};

use units::{UnitLayout, UnitSlot, walk_units};
pub use version::XliffVersion;

/// Name used for the document in errors; XLIFF has no parts.
const DOCUMENT_PART: &str = "<xliff>";

/// Adapter for XLIFF 1.x and 2.x files.
#[derive(Debug, Clone, Default)]
pub struct XliffAdapter {
    options: SegmentOptions,
}

struct Loaded {
    doc: XmlDocument,
    version: XliffVersion,
    raw_version: String,
    layout: UnitLayout,
}

/// A unit that yields a segment.
struct Candidate {
    unit: usize,
    source: Extracted,
    target: Option<String>,
}

impl XliffAdapter {
    pub fn new(options: SegmentOptions) -> Self {
        Self { options }
    }

    fn load(&self, bytes: &[u8]) -> Result<Loaded> {
        let doc = xml::decode(bytes, &self.options.xml).map_err(|e| Error::xml(DOCUMENT_PART, e))?;
        let (version, raw_version) = version::detect(&doc.root, DOCUMENT_PART)?;
        let layout = walk_units(&doc.root, version);
        Ok(Loaded {
            doc,
            version,
            raw_version,
            layout,
        })
    }

    /// Units with non-blank source text, in segment order.
    fn candidates(&self, loaded: &Loaded) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for (unit_idx, unit) in loaded.layout.units.iter().enumerate() {
            if !unit.translatable && self.options.skip_untranslatable_units {
                continue;
            }
            let Some(holder) = loaded.doc.root.descend(&unit.path) else {
                continue;
            };
            let Some(source) = holder.child("source") else {
                log::debug!("xliff unit {:?} has no source, skipped", unit.unit_id);
                continue;
            };
            let source = tags::extract_tags(&source.children, &self.options.xml);
            if source.plain_text.trim().is_empty() {
                continue;
            }
            let target = holder
                .child("target")
                .map(|t| tags::extract_tags(&t.children, &self.options.xml).plain_text)
                .filter(|t| !t.trim().is_empty());
            candidates.push(Candidate {
                unit: unit_idx,
                source,
                target,
            });
        }
        candidates
    }

    fn metadata(&self, loaded: &Loaded, unit: &UnitSlot) -> SegmentMetadata {
        let file = &loaded.layout.files[unit.file];
        SegmentMetadata::Xliff {
            version: loaded.raw_version.clone(),
            file_index: unit.file,
            file_original: file.original.clone(),
            unit_id: unit.unit_id.clone(),
            segment_id: unit.segment_id.clone(),
            resname: unit.resname.clone(),
            notes: unit.notes.clone(),
            source_language: file.source_language.clone(),
            target_language: file.target_language.clone(),
        }
    }
}

impl SegmentAdapter for XliffAdapter {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Xliff
    }

    fn parse(&self, bytes: &[u8]) -> Result<ParsedDocument> {
        let loaded = self.load(bytes)?;
        let candidates = self.candidates(&loaded);

        let mut per_file = vec![0usize; loaded.layout.files.len()];
        let segments: Vec<Segment> = candidates
            .into_iter()
            .enumerate()
            .map(|(index, c)| {
                let unit = &loaded.layout.units[c.unit];
                per_file[unit.file] += 1;
                Segment {
                    index,
                    source_text: c.source.plain_text,
                    segment_type: SegmentType::LocalizationUnit,
                    tags: c.source.tags,
                    target_mt: c.target,
                    metadata: self.metadata(&loaded, unit),
                }
            })
            .collect();

        let files: Vec<FileSummary> = loaded
            .layout
            .files
            .iter()
            .zip(per_file)
            .enumerate()
            .map(|(index, (f, unit_count))| FileSummary {
                index,
                original: f.original.clone(),
                source_language: f.source_language.clone(),
                target_language: f.target_language.clone(),
                unit_count,
            })
            .collect();
        let languages = files
            .first()
            .map(|f| (f.source_language.clone(), f.target_language.clone()))
            .unwrap_or_default();

        ParsedDocument::new(
            DocumentFormat::Xliff,
            segments,
            languages,
            OriginalStructure::Xliff {
                version: loaded.raw_version,
                files,
            },
        )
    }

    fn export(&self, request: &ExportRequest) -> Result<Vec<u8>> {
        let original = request.original()?;
        let mut loaded = self.load(original)?;
        let candidates = self.candidates(&loaded);
        let targets = request.targets();

        for &index in targets.keys() {
            if index >= candidates.len() {
                log::warn!("xliff export: segment index {} matches no unit, ignored", index);
            }
        }

        let mut written = 0usize;
        for (index, candidate) in candidates.iter().enumerate() {
            let Some(text) = targets.get(&index) else {
                continue;
            };
            let unit = &loaded.layout.units[candidate.unit];
            let language = match loaded.version {
                XliffVersion::V1 => loaded.layout.files[unit.file].target_language.clone(),
                XliffVersion::V2 => None,
            };
            let Some(holder) = loaded.doc.root.descend_mut(&unit.path) else {
                continue;
            };

            let content = tags::restore_tags(text, &candidate.source.tags, &self.options.xml);
            let Some(target) = target_element(holder, language) else {
                continue;
            };
            target.children = content;
            match loaded.version {
                XliffVersion::V1 => target.set_attr("state", "translated"),
                XliffVersion::V2 => holder.set_attr("state", "translated"),
            }
            written += 1;
        }

        log::debug!(
            "xliff export: {} targets, {} units written",
            targets.len(),
            written
        );
        Ok(xml::encode(&loaded.doc, &self.options.xml))
    }
}

/// The holder's `target`, created right after `source` when absent.
fn target_element(holder: &mut Element, language: Option<String>) -> Option<&mut Element> {
    let pos = match holder.child_position("target") {
        Some(pos) => pos,
        None => {
            let prefix = holder.child("source").and_then(Element::prefix);
            let mut target = Element::new(match prefix {
                Some(p) => format!("{}:target", p),
                None => "target".to_string(),
            });
            if let Some(lang) = language {
                target.set_attr("xml:lang", lang);
            }
            let at = holder.child_position("source").map_or(holder.children.len(), |p| p + 1);
            holder.children.insert(at, XmlNode::Element(target));
            at
        },
    };
    holder.children.get_mut(pos)?.as_element_mut()
}
