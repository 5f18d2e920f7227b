//! Worksheet discovery.
//!
//! Sheets come from the workbook's `sheets/sheet` list when it has one,
//! from `sheet` elements directly under the workbook otherwise, and from
//! the `xl/worksheets/sheetN.xml` part names when the workbook part is
//! missing or unreadable.
use crate::container::rels::{self, OFFICE_DOCUMENT};
use crate::container::{Container, Relationships};
use crate::error::Result;
use crate::xml::{Element, XmlOptions};

use super::S_NS;

const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKSHEET_PREFIX: &str = "xl/worksheets/sheet";

/// A worksheet listed by the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetRef {
    pub name: String,
    /// Position in the workbook's sheet list
    pub index: usize,
    /// Resolved part name, `None` when no part could be found
    pub part: Option<String>,
}

/// The workbook part name and its sheets, in workbook order.
#[derive(Debug, Clone)]
pub(crate) struct SheetList {
    pub workbook_part: String,
    pub sheets: Vec<SheetRef>,
}

/// Locate the workbook part through the package relationships.
pub(crate) fn workbook_part(container: &Container, options: &XmlOptions) -> Result<String> {
    let rels = Relationships::load(container, "", options)?;
    Ok(rels
        .by_type(OFFICE_DOCUMENT)
        .filter(|r| !r.external)
        .map(|r| rels::resolve_target("", &r.target))
        .filter(|p| container.has_part(p))
        .unwrap_or_else(|| DEFAULT_WORKBOOK_PART.to_string()))
}

/// Resolve the worksheets of a workbook.
pub(crate) fn sheet_list(container: &Container, options: &XmlOptions) -> Result<SheetList> {
    let workbook_part = workbook_part(container, options)?;

    let workbook = match container.read_optional_xml(&workbook_part, options) {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            log::warn!("{} is missing, inferring sheets from part names", workbook_part);
            return Ok(inferred(container, workbook_part));
        },
        Err(e) => {
            log::warn!("{}, inferring sheets from part names", e);
            return Ok(inferred(container, workbook_part));
        },
    };

    let ns = workbook.namespace(S_NS, "");
    let listed: Vec<&Element> = match ns.child(&workbook.root, "sheets") {
        Some(sheets) => ns.children(sheets, "sheet").collect(),
        None => ns.children(&workbook.root, "sheet").collect(),
    };
    if listed.is_empty() {
        log::debug!("{} lists no sheets, inferring from part names", workbook_part);
        return Ok(inferred(container, workbook_part));
    }

    let rels = Relationships::load(container, &workbook_part, options)?;
    let sheets = listed
        .iter()
        .enumerate()
        .map(|(index, sheet)| SheetRef {
            name: sheet
                .attr("name")
                .map(str::to_string)
                .unwrap_or_else(|| format!("Sheet{}", index + 1)),
            index,
            part: locate(container, &rels, &workbook_part, sheet, index),
        })
        .collect();

    Ok(SheetList {
        workbook_part,
        sheets,
    })
}

/// Find a listed sheet's part: relationship first, then `sheetId`, then position.
fn locate(
    container: &Container,
    rels: &Relationships,
    workbook_part: &str,
    sheet: &Element,
    index: usize,
) -> Option<String> {
    let by_rel = sheet
        .attributes
        .iter()
        .find(|(k, _)| k.ends_with(":id") && !k.starts_with("xmlns"))
        .and_then(|(_, id)| rels.target_part(id));
    let by_id = sheet
        .attr("sheetId")
        .map(|id| rels::resolve_target(workbook_part, &format!("worksheets/sheet{}.xml", id)));
    let by_position = Some(rels::resolve_target(
        workbook_part,
        &format!("worksheets/sheet{}.xml", index + 1),
    ));

    [by_rel, by_id, by_position]
        .into_iter()
        .flatten()
        .find(|p| container.has_part(p))
}

/// Sheets inferred from `xl/worksheets/sheetN.xml` parts, sorted by `N`.
fn inferred(container: &Container, workbook_part: String) -> SheetList {
    let mut numbered: Vec<(u32, &str)> = container
        .part_names()
        .filter_map(|name| {
            let n = name.strip_prefix(WORKSHEET_PREFIX)?.strip_suffix(".xml")?;
            Some((atoi_simd::parse_pos::<u32, false>(n.as_bytes()).ok()?, name))
        })
        .collect();
    numbered.sort_by_key(|(n, _)| *n);

    let sheets = numbered
        .into_iter()
        .enumerate()
        .map(|(index, (n, part))| SheetRef {
            name: format!("Sheet{}", n),
            index,
            part: Some(part.to_string()),
        })
        .collect();

    SheetList {
        workbook_part,
        sheets,
    }
}
