//! Word-processing documents (.docx).
//!
//! Every paragraph of the main document part with visible run text becomes
//! one segment, body paragraphs and table-cell paragraphs interleaved in
//! document order. Export replaces a translated paragraph's runs with a
//! single run that keeps the first run's formatting.
mod body;
mod run;

use smallvec::SmallVec;

use crate::adapter::{DocumentFormat, SegmentAdapter};
use crate::config::SegmentOptions;
use crate::container::rels::{self, OFFICE_DOCUMENT};
use crate::container::{Container, Relationships};
use crate::error::{Error, Result};
use crate::model::{
    ExportRequest, OriginalStructure, ParsedDocument, RunFormat, Segment, SegmentMetadata,
    SegmentType,
};
use crate::xml::{self, Element, Namespace, XmlDocument, XmlNode};

use body::{ParagraphSlot, walk_body};
use run::RunPath;

/// WordprocessingML main namespace.
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// Adapter for word-processing documents.
#[derive(Debug, Clone, Default)]
pub struct DocxAdapter {
    options: SegmentOptions,
}

/// A paragraph that yields a segment.
struct Candidate<'a> {
    slot: &'a ParagraphSlot,
    text: String,
    runs: SmallVec<[RunPath; 8]>,
}

impl DocxAdapter {
    pub fn new(options: SegmentOptions) -> Self {
        Self { options }
    }

    /// Name of the main document part.
    fn main_part(&self, container: &Container) -> Result<String> {
        let rels = Relationships::load(container, "", &self.options.xml)?;
        let part = rels
            .by_type(OFFICE_DOCUMENT)
            .filter(|r| !r.external)
            .map(|r| rels::resolve_target("", &r.target))
            .filter(|p| container.has_part(p))
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());
        Ok(part)
    }

    fn load(&self, bytes: &[u8]) -> Result<(Container, String, XmlDocument)> {
        let container = Container::open(bytes)?;
        let part = self.main_part(&container)?;
        let doc = container.read_xml(&part, &self.options.xml)?;
        Ok((container, part, doc))
    }

    /// Paragraphs with non-empty text, in segment order.
    fn candidates<'a>(
        &self,
        root: &Element,
        ns: &Namespace,
        slots: &'a [ParagraphSlot],
    ) -> Vec<Candidate<'a>> {
        slots
            .iter()
            .filter_map(|slot| {
                let paragraph = root.descend(&slot.path)?;
                let runs = run::find_runs(paragraph, ns);
                let text = self.paragraph_text(paragraph, &runs, ns);
                if text.is_empty() {
                    return None;
                }
                Some(Candidate { slot, text, runs })
            })
            .collect()
    }

    /// Join the trimmed, non-empty run texts of a paragraph.
    fn paragraph_text(&self, paragraph: &Element, runs: &[RunPath], ns: &Namespace) -> String {
        let mut text = String::new();
        for path in runs {
            let Some(run) = paragraph.descend(path) else {
                continue;
            };
            let run_text = run::run_text(run, ns);
            let trimmed = run_text.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !text.is_empty() {
                text.push_str(&self.options.run_separator);
            }
            text.push_str(trimmed);
        }
        text
    }

    fn metadata(
        &self,
        paragraph: &Element,
        candidate: &Candidate<'_>,
        ns: &Namespace,
    ) -> SegmentMetadata {
        let runs: Vec<RunFormat> = candidate
            .runs
            .iter()
            .filter_map(|path| paragraph.descend(path))
            .map(|r| run::run_format(r, ns, &self.options.xml))
            .collect();

        SegmentMetadata::Docx {
            location: candidate.slot.location.clone(),
            paragraph_properties: ns
                .child(paragraph, "pPr")
                .map(|p| xml::encode_element(p, &self.options.xml)),
            runs,
        }
    }
}

impl SegmentAdapter for DocxAdapter {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn parse(&self, bytes: &[u8]) -> Result<ParsedDocument> {
        let (_, part, doc) = self.load(bytes)?;
        let ns = doc.namespace(W_NS, "w");
        let layout = walk_body(&doc.root, &ns)
            .ok_or_else(|| Error::structure(part.clone(), "document has no body"))?;

        let segments: Vec<Segment> = self
            .candidates(&doc.root, &ns, &layout.paragraphs)
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let paragraph = doc.root.descend(&candidate.slot.path)?;
                Some(Segment {
                    index,
                    source_text: candidate.text.clone(),
                    segment_type: if candidate.slot.in_table() {
                        SegmentType::TableCell
                    } else {
                        SegmentType::Paragraph
                    },
                    tags: Vec::new(),
                    target_mt: None,
                    metadata: self.metadata(paragraph, candidate, &ns),
                })
            })
            .collect();

        ParsedDocument::new(
            DocumentFormat::Docx,
            segments,
            (None, None),
            OriginalStructure::Docx {
                paragraph_count: layout.body_paragraphs,
                table_count: layout.tables,
            },
        )
    }

    fn export(&self, request: &ExportRequest) -> Result<Vec<u8>> {
        let original = request.original()?;
        let (mut container, part, mut doc) = self.load(original)?;
        let ns = doc.namespace(W_NS, "w");
        let layout = walk_body(&doc.root, &ns)
            .ok_or_else(|| Error::structure(part.clone(), "document has no body"))?;

        // (paragraph path, run paths) per segment index
        let plan: Vec<(Vec<usize>, SmallVec<[RunPath; 8]>)> = self
            .candidates(&doc.root, &ns, &layout.paragraphs)
            .into_iter()
            .map(|c| (c.slot.path.clone(), c.runs))
            .collect();

        let targets = request.targets();
        let mut replaced = 0;
        for (&index, &text) in &targets {
            let Some((path, runs)) = plan.get(index) else {
                log::warn!("docx export: segment index {} matches no paragraph, ignored", index);
                continue;
            };
            let Some(paragraph) = doc.root.descend_mut(path) else {
                continue;
            };
            replace_runs(paragraph, runs, text, &ns);
            replaced += 1;
        }

        log::debug!("docx export: replaced {} of {} paragraphs", replaced, plan.len());
        container.write_xml(&part, &doc, &self.options.xml);
        container.serialize()
    }
}

/// Replace every run of a paragraph with one run holding `text`.
///
/// The new run carries the first run's `w:rPr` and takes its place.
fn replace_runs(paragraph: &mut Element, runs: &[RunPath], text: &str, ns: &Namespace) {
    let Some(first) = runs.first() else {
        return;
    };
    let properties = paragraph
        .descend(first)
        .and_then(|r| ns.child(r, "rPr"))
        .cloned();

    // Later runs first so earlier paths stay valid.
    for path in runs.iter().rev() {
        let Some((&pos, parent_path)) = path.split_last() else {
            continue;
        };
        if let Some(parent) = paragraph.descend_mut(parent_path) {
            if pos < parent.children.len() {
                parent.children.remove(pos);
            }
        }
    }

    let Some((&pos, parent_path)) = first.split_last() else {
        return;
    };
    if let Some(parent) = paragraph.descend_mut(parent_path) {
        let pos = pos.min(parent.children.len());
        parent
            .children
            .insert(pos, XmlNode::Element(run::build_run(text, properties, ns)));
    }
}
