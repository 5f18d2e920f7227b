//! Worksheet cell traversal.
//!
//! Cells are visited row by row (`sheetData/row`) and left to right
//! (`c`), in document order. Rows and cells without an `r` attribute
//! continue from the previous one.
use crate::xml::{Element, Namespace, XmlNode};

use super::cell::{coords_to_reference, reference_to_coords};
use super::shared_strings::{entry_text, set_entry_text};

/// Where a cell's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CellContent {
    /// Index into the shared string table (`t="s"`)
    Shared(usize),
    /// Inline rich text (`t="inlineStr"`)
    Inline(String),
    /// Stringified value of any other type
    Value(String),
}

/// A cell reached by the traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CellSlot {
    /// Child positions from the worksheet root to the `c` element
    pub path: Vec<usize>,
    pub row: u32,
    pub column: u32,
    pub reference: String,
    /// The cell's `t` attribute, `n` when absent
    pub cell_type: String,
    pub content: CellContent,
}

/// Walk every cell with content, in document order.
pub(crate) fn walk_cells(root: &Element, ns: &Namespace) -> Vec<CellSlot> {
    let mut slots = Vec::new();
    let Some(data_pos) = root
        .children
        .iter()
        .position(|n| n.as_element().is_some_and(|e| ns.matches(e, "sheetData")))
    else {
        return slots;
    };
    let Some(sheet_data) = root.children[data_pos].as_element() else {
        return slots;
    };

    let mut row_number = 0u32;
    for (row_pos, row_node) in sheet_data.children.iter().enumerate() {
        let Some(row) = row_node.as_element().filter(|e| ns.matches(e, "row")) else {
            continue;
        };
        row_number = row
            .attr("r")
            .and_then(|r| atoi_simd::parse_pos::<u32, false>(r.as_bytes()).ok())
            .unwrap_or(row_number + 1);

        let mut column = 0u32;
        for (cell_pos, cell_node) in row.children.iter().enumerate() {
            let Some(cell) = cell_node.as_element().filter(|e| ns.matches(e, "c")) else {
                continue;
            };
            let coords = cell.attr("r").and_then(reference_to_coords);
            let (row_index, col_index) = coords.unwrap_or((row_number, column + 1));
            column = col_index;

            let cell_type = cell.attr("t").unwrap_or("n").to_string();
            let Some(content) = cell_content(cell, &cell_type, ns) else {
                continue;
            };

            slots.push(CellSlot {
                path: vec![data_pos, row_pos, cell_pos],
                row: row_index,
                column: col_index,
                reference: cell
                    .attr("r")
                    .map(str::to_string)
                    .unwrap_or_else(|| coords_to_reference(row_index, col_index)),
                cell_type,
                content,
            });
        }
    }

    log::debug!("worksheet walk: {} cells with content", slots.len());
    slots
}

fn cell_content(cell: &Element, cell_type: &str, ns: &Namespace) -> Option<CellContent> {
    match cell_type {
        "s" => {
            let value = ns.child(cell, "v")?.text();
            match atoi_simd::parse_pos::<u32, false>(value.trim().as_bytes()) {
                Ok(index) => Some(CellContent::Shared(index as usize)),
                Err(_) => {
                    log::debug!("shared string cell with invalid index {:?} dropped", value);
                    None
                },
            }
        },
        "inlineStr" => ns
            .child(cell, "is")
            .map(|is| CellContent::Inline(entry_text(is, ns))),
        _ => ns.child(cell, "v").map(|v| CellContent::Value(v.text())),
    }
}

/// Point a shared-string cell at another table entry.
pub(crate) fn set_shared_index(cell: &mut Element, index: usize, ns: &Namespace) {
    let text = itoa::Buffer::new().format(index).to_string();
    let found = cell.elements_mut().find(|e| ns.matches(e, "v"));
    match found {
        Some(v) => {
            v.children.clear();
            v.children.push(XmlNode::Text(text));
        },
        None => {
            let v = Element::new(ns.qualify("v")).with_text(text);
            cell.children.push(XmlNode::Element(v));
        },
    }
}

/// Replace the text of an inline-string cell.
pub(crate) fn set_inline_text(cell: &mut Element, text: &str, ns: &Namespace) {
    let found = cell.elements_mut().find(|e| ns.matches(e, "is"));
    match found {
        Some(is) => set_entry_text(is, text, ns),
        None => {
            let mut is = Element::new(ns.qualify("is"));
            set_entry_text(&mut is, text, ns);
            cell.children.push(XmlNode::Element(is));
        },
    }
}
