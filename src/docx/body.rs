//! Document body traversal.
//!
//! Parse and export both walk the body through [`walk_body`], so the
//! paragraph a segment index names is the same in both passes.
use crate::model::DocxLocation;
use crate::xml::{Element, Namespace};

/// A paragraph reached by the traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParagraphSlot {
    /// Child positions from the document root to the `w:p`
    pub path: Vec<usize>,
    pub location: DocxLocation,
}

impl ParagraphSlot {
    #[inline]
    pub fn in_table(&self) -> bool {
        matches!(self.location, DocxLocation::TableCell { .. })
    }
}

/// Every paragraph of the body in document order.
#[derive(Debug, Default)]
pub(crate) struct BodyLayout {
    pub paragraphs: Vec<ParagraphSlot>,
    /// Paragraphs directly in the body (outside tables)
    pub body_paragraphs: usize,
    pub tables: usize,
}

#[derive(Debug, Clone, Copy)]
enum Scope {
    Body,
    Cell {
        table_index: usize,
        row_index: usize,
        cell_index: usize,
    },
}

/// Walk `w:body` in document order.
///
/// Paragraphs and tables are visited interleaved exactly as they appear;
/// `w:sdt` and `w:customXml` block wrappers are entered in place. Returns
/// `None` when the root has no body.
pub(crate) fn walk_body(root: &Element, ns: &Namespace) -> Option<BodyLayout> {
    let body_pos = root
        .children
        .iter()
        .position(|n| n.as_element().is_some_and(|e| ns.matches(e, "body")))?;
    let body = root.children[body_pos].as_element()?;

    let mut walker = Walker {
        ns,
        layout: BodyLayout::default(),
    };
    let mut path = vec![body_pos];
    let mut cell_paragraphs = 0;
    walker.block(body, &mut path, Scope::Body, &mut cell_paragraphs);

    log::debug!(
        "body walk: {} paragraphs, {} tables",
        walker.layout.paragraphs.len(),
        walker.layout.tables
    );
    Some(walker.layout)
}

struct Walker<'a> {
    ns: &'a Namespace,
    layout: BodyLayout,
}

impl Walker<'_> {
    fn block(
        &mut self,
        parent: &Element,
        path: &mut Vec<usize>,
        scope: Scope,
        cell_paragraphs: &mut usize,
    ) {
        for (i, node) in parent.children.iter().enumerate() {
            let Some(child) = node.as_element() else {
                continue;
            };
            path.push(i);

            if self.ns.matches(child, "p") {
                let location = match scope {
                    Scope::Body => {
                        self.layout.body_paragraphs += 1;
                        DocxLocation::Body {
                            paragraph_index: self.layout.body_paragraphs - 1,
                        }
                    },
                    Scope::Cell {
                        table_index,
                        row_index,
                        cell_index,
                    } => {
                        *cell_paragraphs += 1;
                        DocxLocation::TableCell {
                            table_index,
                            row_index,
                            cell_index,
                            paragraph_index: *cell_paragraphs - 1,
                        }
                    },
                };
                self.layout.paragraphs.push(ParagraphSlot {
                    path: path.clone(),
                    location,
                });
            } else if self.ns.matches(child, "tbl") {
                self.table(child, path);
            } else if self.ns.matches(child, "customXml") {
                self.block(child, path, scope, cell_paragraphs);
            } else if self.ns.matches(child, "sdt") {
                self.sdt_content(child, path, |w, content, path| {
                    w.block(content, path, scope, cell_paragraphs)
                });
            }

            path.pop();
        }
    }

    fn table(&mut self, table: &Element, path: &mut Vec<usize>) {
        let table_index = self.layout.tables;
        self.layout.tables += 1;
        let mut row_index = 0;
        self.rows(table, path, table_index, &mut row_index);
    }

    fn rows(
        &mut self,
        parent: &Element,
        path: &mut Vec<usize>,
        table_index: usize,
        row_index: &mut usize,
    ) {
        for (i, node) in parent.children.iter().enumerate() {
            let Some(child) = node.as_element() else {
                continue;
            };
            path.push(i);

            if self.ns.matches(child, "tr") {
                let mut cell_index = 0;
                self.cells(child, path, table_index, *row_index, &mut cell_index);
                *row_index += 1;
            } else if self.ns.matches(child, "customXml") {
                self.rows(child, path, table_index, row_index);
            } else if self.ns.matches(child, "sdt") {
                self.sdt_content(child, path, |w, content, path| {
                    w.rows(content, path, table_index, row_index)
                });
            }

            path.pop();
        }
    }

    fn cells(
        &mut self,
        parent: &Element,
        path: &mut Vec<usize>,
        table_index: usize,
        row_index: usize,
        cell_index: &mut usize,
    ) {
        for (i, node) in parent.children.iter().enumerate() {
            let Some(child) = node.as_element() else {
                continue;
            };
            path.push(i);

            if self.ns.matches(child, "tc") {
                let scope = Scope::Cell {
                    table_index,
                    row_index,
                    cell_index: *cell_index,
                };
                let mut cell_paragraphs = 0;
                self.block(child, path, scope, &mut cell_paragraphs);
                *cell_index += 1;
            } else if self.ns.matches(child, "customXml") {
                self.cells(child, path, table_index, row_index, cell_index);
            } else if self.ns.matches(child, "sdt") {
                self.sdt_content(child, path, |w, content, path| {
                    w.cells(content, path, table_index, row_index, cell_index)
                });
            }

            path.pop();
        }
    }

    /// Enter the `w:sdtContent` of a structured document tag.
    fn sdt_content<F>(&mut self, sdt: &Element, path: &mut Vec<usize>, mut visit: F)
    where
        F: FnMut(&mut Self, &Element, &mut Vec<usize>),
    {
        let ns = self.ns;
        let found = sdt
            .children
            .iter()
            .enumerate()
            .find_map(|(i, n)| {
                n.as_element()
                    .filter(|e| ns.matches(e, "sdtContent"))
                    .map(|e| (i, e))
            });
        if let Some((i, content)) = found {
            path.push(i);
            visit(self, content, path);
            path.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{XmlOptions, decode};

    fn layout(body: &str) -> (Element, BodyLayout) {
        let xml = format!(r#"<w:document xmlns:w="urn:w"><w:body>{}</w:body></w:document>"#, body);
        let root = decode(xml.as_bytes(), &XmlOptions::default()).unwrap().root;
        let layout = walk_body(&root, &Namespace::with_prefix(Some("w"))).unwrap();
        (root, layout)
    }

    #[test]
    fn test_interleaved_order() {
        let (root, layout) = layout(
            "<w:p/><w:tbl><w:tr><w:tc><w:p/></w:tc><w:tc><w:p/><w:p/></w:tc></w:tr></w:tbl><w:p/>",
        );
        let locations: Vec<&DocxLocation> = layout.paragraphs.iter().map(|s| &s.location).collect();
        assert_eq!(
            locations,
            [
                &DocxLocation::Body { paragraph_index: 0 },
                &DocxLocation::TableCell {
                    table_index: 0,
                    row_index: 0,
                    cell_index: 0,
                    paragraph_index: 0,
                },
                &DocxLocation::TableCell {
                    table_index: 0,
                    row_index: 0,
                    cell_index: 1,
                    paragraph_index: 0,
                },
                &DocxLocation::TableCell {
                    table_index: 0,
                    row_index: 0,
                    cell_index: 1,
                    paragraph_index: 1,
                },
                &DocxLocation::Body { paragraph_index: 1 },
            ]
        );
        assert_eq!(layout.body_paragraphs, 2);
        assert_eq!(layout.tables, 1);
        for slot in &layout.paragraphs {
            assert_eq!(root.descend(&slot.path).map(|e| e.name.as_str()), Some("w:p"));
        }
    }

    #[test]
    fn test_nested_tables_and_wrappers() {
        let (_, layout) = layout(
            "<w:sdt><w:sdtContent><w:p/></w:sdtContent></w:sdt>\
             <w:tbl><w:tr><w:tc><w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl><w:p/></w:tc></w:tr></w:tbl>\
             <w:customXml><w:p/></w:customXml>",
        );
        let locations: Vec<&DocxLocation> = layout.paragraphs.iter().map(|s| &s.location).collect();
        assert_eq!(
            locations,
            [
                &DocxLocation::Body { paragraph_index: 0 },
                &DocxLocation::TableCell {
                    table_index: 1,
                    row_index: 0,
                    cell_index: 0,
                    paragraph_index: 0,
                },
                &DocxLocation::TableCell {
                    table_index: 0,
                    row_index: 0,
                    cell_index: 0,
                    paragraph_index: 0,
                },
                &DocxLocation::Body { paragraph_index: 1 },
            ]
        );
        assert_eq!(layout.tables, 2);
        assert!(layout.paragraphs[1].in_table());
    }

    #[test]
    fn test_missing_body() {
        let root = decode(b"<w:document xmlns:w=\"urn:w\"/>", &XmlOptions::default()).unwrap().root;
        assert!(walk_body(&root, &Namespace::with_prefix(Some("w"))).is_none());
    }
}
