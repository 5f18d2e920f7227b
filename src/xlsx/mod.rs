//! Spreadsheet workbooks (.xlsx).
//!
//! Every cell whose text is not blank becomes one segment, sheet by sheet
//! in workbook order, rows top to bottom and cells left to right.
//! Shared-string cells are translated through the shared string table;
//! inline-string cells are rewritten in place; other cell types are
//! read-only.
pub mod cell;
mod shared_strings;
mod workbook;
mod worksheet;

use std::collections::{BTreeMap, HashMap};

use crate::adapter::{DocumentFormat, SegmentAdapter};
use crate::config::SegmentOptions;
use crate::container::rels::SHARED_STRINGS;
use crate::container::{Container, Relationships};
use crate::error::Result;
use crate::model::{
    ExportRequest, OriginalStructure, ParsedDocument, Segment, SegmentMetadata, SegmentType,
    SheetSummary,
};
use crate::xml::{Namespace, XmlDocument};

use shared_strings::SharedStrings;
use workbook::SheetRef;
use worksheet::{CellContent, CellSlot, set_inline_text, set_shared_index, walk_cells};

/// SpreadsheetML main namespace.
pub const S_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

const DEFAULT_SHARED_STRINGS: &str = "xl/sharedStrings.xml";

/// Adapter for spreadsheet workbooks.
#[derive(Debug, Clone, Default)]
pub struct XlsxAdapter {
    options: SegmentOptions,
}

/// A worksheet that was found and decoded.
struct LoadedSheet {
    sheet: SheetRef,
    part: String,
    doc: XmlDocument,
    ns: Namespace,
    cells: Vec<CellSlot>,
}

/// A decoded workbook ready for traversal.
struct Workbook {
    container: Container,
    shared: Option<(String, SharedStrings)>,
    sheets: Vec<LoadedSheet>,
}

/// A cell that yields a segment.
struct Candidate {
    sheet: usize,
    cell: usize,
    text: String,
}

impl XlsxAdapter {
    pub fn new(options: SegmentOptions) -> Self {
        Self { options }
    }

    fn load(&self, bytes: &[u8]) -> Result<Workbook> {
        let xml = &self.options.xml;
        let container = Container::open(bytes)?;
        let list = workbook::sheet_list(&container, xml)?;

        let rels = Relationships::load(&container, &list.workbook_part, xml)?;
        let shared_part = rels
            .by_type(SHARED_STRINGS)
            .and_then(|r| rels.target_part(&r.id))
            .filter(|p| container.has_part(p))
            .unwrap_or_else(|| DEFAULT_SHARED_STRINGS.to_string());
        let shared = container.read_optional_xml(&shared_part, xml)?.map(|doc| {
            let ns = doc.namespace(S_NS, "");
            (shared_part, SharedStrings::new(doc, ns))
        });

        let mut sheets = Vec::with_capacity(list.sheets.len());
        for sheet in list.sheets {
            let Some(part) = sheet.part.clone() else {
                log::warn!("worksheet {:?} has no part, skipped", sheet.name);
                continue;
            };
            let doc = match container.read_xml(&part, xml) {
                Ok(doc) => doc,
                Err(e) => {
                    log::warn!("worksheet {:?} skipped: {}", sheet.name, e);
                    continue;
                },
            };
            let ns = doc.namespace(S_NS, "");
            let cells = walk_cells(&doc.root, &ns);
            sheets.push(LoadedSheet {
                sheet,
                part,
                doc,
                ns,
                cells,
            });
        }

        Ok(Workbook {
            container,
            shared,
            sheets,
        })
    }

    /// Cells with non-blank text, in segment order.
    fn candidates(&self, workbook: &Workbook) -> Vec<Candidate> {
        let shared = workbook.shared.as_ref().map(|(_, s)| s);
        let mut candidates = Vec::new();

        for (sheet_idx, sheet) in workbook.sheets.iter().enumerate() {
            for (cell_idx, cell) in sheet.cells.iter().enumerate() {
                let text = match &cell.content {
                    CellContent::Shared(index) => match shared.and_then(|s| s.get(*index)) {
                        Some(text) => text.to_string(),
                        None => {
                            log::warn!(
                                "{}!{} references missing shared string {}, skipped",
                                sheet.sheet.name,
                                cell.reference,
                                index
                            );
                            continue;
                        },
                    },
                    CellContent::Inline(text) => text.clone(),
                    CellContent::Value(text) if self.options.include_non_string_cells => {
                        text.clone()
                    },
                    CellContent::Value(_) => continue,
                };
                if text.trim().is_empty() {
                    continue;
                }
                candidates.push(Candidate {
                    sheet: sheet_idx,
                    cell: cell_idx,
                    text,
                });
            }
        }
        candidates
    }
}

impl SegmentAdapter for XlsxAdapter {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Xlsx
    }

    fn parse(&self, bytes: &[u8]) -> Result<ParsedDocument> {
        let workbook = self.load(bytes)?;
        let candidates = self.candidates(&workbook);

        let mut per_sheet = vec![0usize; workbook.sheets.len()];
        let segments: Vec<Segment> = candidates
            .into_iter()
            .enumerate()
            .map(|(index, c)| {
                let sheet = &workbook.sheets[c.sheet];
                let cell = &sheet.cells[c.cell];
                per_sheet[c.sheet] += 1;
                Segment {
                    index,
                    source_text: c.text,
                    segment_type: SegmentType::Cell,
                    tags: Vec::new(),
                    target_mt: None,
                    metadata: SegmentMetadata::Xlsx {
                        sheet_name: sheet.sheet.name.clone(),
                        sheet_index: sheet.sheet.index,
                        cell_ref: cell.reference.clone(),
                        row: cell.row,
                        column: cell.column,
                        cell_type: cell.cell_type.clone(),
                        shared_string_index: match cell.content {
                            CellContent::Shared(i) => Some(i),
                            _ => None,
                        },
                    },
                }
            })
            .collect();

        let sheets = workbook
            .sheets
            .iter()
            .zip(per_sheet)
            .map(|(s, segment_count)| SheetSummary {
                name: s.sheet.name.clone(),
                index: s.sheet.index,
                part: s.part.clone(),
                segment_count,
            })
            .collect();

        ParsedDocument::new(
            DocumentFormat::Xlsx,
            segments,
            (None, None),
            OriginalStructure::Xlsx {
                sheets,
                shared_string_count: workbook.shared.as_ref().map_or(0, |(_, s)| s.len()),
            },
        )
    }

    fn export(&self, request: &ExportRequest) -> Result<Vec<u8>> {
        let original = request.original()?;
        let mut workbook = self.load(original)?;
        let candidates = self.candidates(&workbook);
        let targets = request.targets();

        for &index in targets.keys() {
            if index >= candidates.len() {
                log::warn!("xlsx export: segment index {} matches no cell, ignored", index);
            }
        }

        let mut dirty = vec![false; workbook.sheets.len()];
        // Shared entry -> every referencing cell with the text it should show
        let mut references: BTreeMap<usize, Vec<(usize, usize, Option<&str>)>> = BTreeMap::new();

        for (index, candidate) in candidates.iter().enumerate() {
            let target = targets.get(&index).copied();
            let sheet = &mut workbook.sheets[candidate.sheet];
            let cell = &sheet.cells[candidate.cell];

            match &cell.content {
                CellContent::Shared(entry) => {
                    references
                        .entry(*entry)
                        .or_default()
                        .push((candidate.sheet, candidate.cell, target));
                },
                CellContent::Inline(_) => {
                    let Some(text) = target else {
                        continue;
                    };
                    if let Some(c) = sheet.doc.root.descend_mut(&cell.path) {
                        set_inline_text(c, text, &sheet.ns);
                        dirty[candidate.sheet] = true;
                    }
                },
                CellContent::Value(_) => {
                    if target.is_some() {
                        log::warn!(
                            "xlsx export: {}!{} holds a {:?} value and is not writable, skipped",
                            sheet.sheet.name,
                            cell.reference,
                            cell.cell_type
                        );
                    }
                },
            }
        }

        let mut shared_changed = false;
        if let Some((_, shared)) = workbook.shared.as_mut() {
            let mut appended: HashMap<String, usize> = HashMap::new();

            for (entry, refs) in &references {
                if refs.iter().all(|(_, _, t)| t.is_none()) {
                    continue;
                }
                let Some(current) = shared.get(*entry).map(str::to_string) else {
                    continue;
                };
                let wanted: Vec<&str> = refs
                    .iter()
                    .map(|(_, _, t)| t.unwrap_or(current.as_str()))
                    .collect();
                let first = wanted[0];

                if first != current {
                    shared.set(*entry, first);
                    shared_changed = true;
                }

                for ((sheet_idx, cell_idx, _), text) in refs.iter().zip(&wanted).skip(1) {
                    if *text == first {
                        continue;
                    }
                    let new_entry = match appended.get(*text) {
                        Some(&i) => i,
                        None => {
                            let i = shared.push(text);
                            appended.insert(text.to_string(), i);
                            i
                        },
                    };
                    shared_changed = true;

                    let sheet = &mut workbook.sheets[*sheet_idx];
                    let path = &sheet.cells[*cell_idx].path;
                    if let Some(c) = sheet.doc.root.descend_mut(path) {
                        set_shared_index(c, new_entry, &sheet.ns);
                        dirty[*sheet_idx] = true;
                    }
                }
            }

            if shared_changed {
                shared.update_counts();
            }
        }

        let xml = &self.options.xml;
        if shared_changed {
            if let Some((part, shared)) = &workbook.shared {
                workbook.container.write_xml(part, &shared.doc, xml);
            }
        }
        for (sheet, _) in workbook.sheets.iter().zip(&dirty).filter(|(_, d)| **d) {
            workbook.container.write_xml(&sheet.part, &sheet.doc, xml);
        }

        log::debug!(
            "xlsx export: {} targets, {} worksheets rewritten, shared strings {}",
            targets.len(),
            dirty.iter().filter(|d| **d).count(),
            if shared_changed { "rewritten" } else { "unchanged" }
        );
        workbook.container.serialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{build_zip, s_cell, xlsx};
    use proptest::prelude::*;

    fn adapter() -> XlsxAdapter {
        XlsxAdapter::new(SegmentOptions::default())
    }

    fn texts(doc: &ParsedDocument) -> Vec<&str> {
        doc.segments.iter().map(|s| s.source_text.as_str()).collect()
    }

    fn shared_texts(bytes: &[u8]) -> Vec<String> {
        let container = Container::open(bytes).unwrap();
        let doc = container
            .read_xml("xl/sharedStrings.xml", &Default::default())
            .unwrap();
        let ns = doc.namespace(S_NS, "");
        SharedStrings::new(doc, ns).texts
    }

    fn row(r: u32, cells: &[String]) -> String {
        format!(r#"<row r="{}">{}</row>"#, r, cells.concat())
    }

    #[test]
    fn test_shared_strings_scenario() {
        let data = row(1, &[s_cell("A1", 0), s_cell("B1", 1)]);
        let original = xlsx(Some(&["Hello", "World"]), &[("Sheet1", data.as_str())]);

        let doc = adapter().parse(&original).unwrap();
        assert_eq!(texts(&doc), ["Hello", "World"]);
        assert!(doc.segments.iter().all(|s| s.segment_type == SegmentType::Cell));
        match &doc.segments[1].metadata {
            SegmentMetadata::Xlsx {
                sheet_name,
                cell_ref,
                row,
                column,
                cell_type,
                shared_string_index,
                ..
            } => {
                assert_eq!(sheet_name, "Sheet1");
                assert_eq!(cell_ref, "B1");
                assert_eq!((*row, *column), (1, 2));
                assert_eq!(cell_type, "s");
                assert_eq!(*shared_string_index, Some(1));
            },
            other => panic!("unexpected metadata {:?}", other),
        }

        let exported = adapter()
            .export(&ExportRequest::new(original).with_target(0, "Bonjour"))
            .unwrap();
        assert_eq!(shared_texts(&exported), ["Bonjour", "World"]);
        assert_eq!(texts(&adapter().parse(&exported).unwrap()), ["Bonjour", "World"]);
    }

    #[test]
    fn test_diverging_shared_entry_is_split() {
        let data = row(1, &[s_cell("A1", 0), s_cell("A2", 0), s_cell("A3", 0)]);
        let original = xlsx(Some(&["Yes"]), &[("S", data.as_str())]);

        let exported = adapter()
            .export(
                &ExportRequest::new(original)
                    .with_target(0, "Oui")
                    .with_target(1, "Si")
                    .with_target(2, "Si"),
            )
            .unwrap();
        assert_eq!(shared_texts(&exported), ["Oui", "Si"]);
        assert_eq!(texts(&adapter().parse(&exported).unwrap()), ["Oui", "Si", "Si"]);

        let container = Container::open(&exported).unwrap();
        let sst = container.read_xml("xl/sharedStrings.xml", &Default::default()).unwrap();
        assert_eq!(sst.root.attr("uniqueCount"), Some("2"));
        assert_eq!(sst.root.attr("count"), Some("1"));
    }

    #[test]
    fn test_partial_translation_of_shared_entry() {
        let data = row(1, &[s_cell("A1", 0), s_cell("B1", 0)]);
        let original = xlsx(Some(&["Total"]), &[("S", data.as_str())]);
        let exported = adapter()
            .export(&ExportRequest::new(original).with_target(1, "Somme"))
            .unwrap();
        assert_eq!(texts(&adapter().parse(&exported).unwrap()), ["Total", "Somme"]);
    }

    #[test]
    fn test_blank_target_keeps_shared_entry() {
        let data = row(1, &[s_cell("A1", 0), s_cell("B1", 1)]);
        let original = xlsx(Some(&["Hello", "World"]), &[("Sheet1", data.as_str())]);
        let request = ExportRequest::new(original)
            .with_target(0, "   ")
            .with_target(1, "Monde");
        let exported = adapter().export(&request).unwrap();
        assert_eq!(texts(&adapter().parse(&exported).unwrap()), ["Hello", "Monde"]);
    }

    #[test]
    fn test_inline_and_value_cells() {
        let data = row(
            1,
            &[
                r#"<c r="A1" t="inlineStr"><is><t>Inline</t></is></c>"#.to_string(),
                r#"<c r="B1"><v>3.5</v></c>"#.to_string(),
                r#"<c r="C1" t="s"><v>0</v></c>"#.to_string(),
            ],
        );
        let original = xlsx(Some(&["   "]), &[("S", data.as_str())]);

        let doc = adapter().parse(&original).unwrap();
        assert_eq!(texts(&doc), ["Inline", "3.5"]);

        let strings_only =
            XlsxAdapter::new(SegmentOptions::new().with_include_non_string_cells(false));
        assert_eq!(texts(&strings_only.parse(&original).unwrap()), ["Inline"]);

        let exported = adapter()
            .export(&ExportRequest::new(original).with_target(0, "En ligne").with_target(1, "4"))
            .unwrap();
        assert_eq!(texts(&adapter().parse(&exported).unwrap()), ["En ligne", "3.5"]);
    }

    #[test]
    fn test_multiple_sheets_in_workbook_order() {
        let first = row(1, &[s_cell("A1", 1)]);
        let second = row(2, &[s_cell("B2", 0)]);
        let original = xlsx(
            Some(&["Second", "First"]),
            &[("One", first.as_str()), ("Two", second.as_str())],
        );
        let doc = adapter().parse(&original).unwrap();
        assert_eq!(texts(&doc), ["First", "Second"]);
        match &doc.original_structure {
            OriginalStructure::Xlsx {
                sheets,
                shared_string_count,
            } => {
                assert_eq!(*shared_string_count, 2);
                let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
                assert_eq!(names, ["One", "Two"]);
                assert_eq!(sheets[1].segment_count, 1);
            },
            other => panic!("unexpected structure {:?}", other),
        }
    }

    #[test]
    fn test_broken_sheet_is_skipped() {
        let good = row(1, &[s_cell("A1", 0)]);
        let mut bytes = xlsx(Some(&["Kept"]), &[("Good", good.as_str()), ("Bad", "")]);
        let mut container = Container::open(&bytes).unwrap();
        container.set_part("xl/worksheets/sheet2.xml", b"<worksheet><sheetData>".to_vec());
        bytes = container.serialize().unwrap();

        let doc = adapter().parse(&bytes).unwrap();
        assert_eq!(texts(&doc), ["Kept"]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            adapter().export(&ExportRequest::default()).unwrap_err().kind(),
            ErrorKind::Precondition
        );
        assert_eq!(adapter().parse(b"\x00\x01").unwrap_err().kind(), ErrorKind::Structure);
        let empty = xlsx(Some(&[""]), &[("S", row(1, &[s_cell("A1", 0)]).as_str())]);
        assert_eq!(adapter().parse(&empty).unwrap_err().kind(), ErrorKind::Content);
        let malformed_sst = build_zip(&[
            ("xl/workbook.xml", "<workbook/>"),
            ("xl/sharedStrings.xml", "<sst><si></sst>"),
        ]);
        assert_eq!(
            adapter().parse(&malformed_sst).unwrap_err().part(),
            Some("xl/sharedStrings.xml")
        );
    }

    proptest! {
        #[test]
        fn prop_round_trip_substitution(
            words in prop::collection::vec("[A-Za-z]{1,8}", 1..6),
            pick in any::<prop::sample::Index>(),
            replacement in "[A-Za-z]{1,8}",
        ) {
            let strings: Vec<&str> = words.iter().map(String::as_str).collect();
            let cells: Vec<String> = (0..words.len())
                .map(|i| s_cell(&cell::coords_to_reference(1, i as u32 + 1), i))
                .collect();
            let original = xlsx(Some(strings.as_slice()), &[("S", row(1, &cells).as_str())]);
            let target = pick.index(words.len());

            let request =
                ExportRequest::new(original.clone()).with_target(target, replacement.clone());
            let exported = adapter().export(&request).unwrap();
            let before = adapter().parse(&original).unwrap();
            let after = adapter().parse(&exported).unwrap();

            prop_assert_eq!(before.segments.len(), after.segments.len());
            for (b, a) in before.segments.iter().zip(&after.segments) {
                if a.index == target {
                    prop_assert_eq!(&a.source_text, &replacement);
                } else {
                    prop_assert_eq!(&a.source_text, &b.source_text);
                }
            }
        }
    }
}
