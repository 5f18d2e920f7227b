//! Translation unit traversal.
//!
//! 1.x documents hold `trans-unit`s under `file/body`, optionally nested in
//! `group`s. 2.x documents hold `unit`s under `file`, optionally nested in
//! `group`s, each with one or more `segment`s. Structural elements are
//! matched by local name, so prefixed and default-namespace documents read
//! the same.
use crate::xml::Element;

use super::version::XliffVersion;

/// A `<file>` element of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileSlot {
    pub original: Option<String>,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
}

/// An element holding a `source` and optional `target`.
///
/// That is the `trans-unit` itself in 1.x and a `segment` in 2.x.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UnitSlot {
    /// Child positions from the root to the holder element
    pub path: Vec<usize>,
    pub file: usize,
    pub unit_id: Option<String>,
    pub segment_id: Option<String>,
    pub resname: Option<String>,
    pub notes: Vec<String>,
    /// False when the unit or an enclosing element says `translate="no"`
    pub translatable: bool,
}

/// Every file and unit of the document, in document order.
#[derive(Debug, Clone, Default)]
pub(crate) struct UnitLayout {
    pub files: Vec<FileSlot>,
    pub units: Vec<UnitSlot>,
}

pub(crate) fn walk_units(root: &Element, version: XliffVersion) -> UnitLayout {
    let mut layout = UnitLayout::default();

    for (pos, node) in root.children.iter().enumerate() {
        let Some(file) = node.as_element().filter(|e| e.local_name() == "file") else {
            continue;
        };
        let file_index = layout.files.len();
        let translatable = is_translatable(file, true);

        match version {
            XliffVersion::V1 => {
                layout.files.push(FileSlot {
                    original: file.attr("original").map(str::to_string),
                    source_language: file.attr("source-language").map(str::to_string),
                    target_language: file.attr("target-language").map(str::to_string),
                });
                let Some(body_pos) = file.child_position("body") else {
                    continue;
                };
                let Some(body) = file.children[body_pos].as_element() else {
                    continue;
                };
                let mut path = vec![pos, body_pos];
                walk_v1(body, &mut path, file_index, translatable, &mut layout.units);
            },
            XliffVersion::V2 => {
                layout.files.push(FileSlot {
                    original: file.attr("original").map(str::to_string),
                    source_language: root.attr("srcLang").map(str::to_string),
                    target_language: root.attr("trgLang").map(str::to_string),
                });
                let mut path = vec![pos];
                walk_v2(file, &mut path, file_index, translatable, &mut layout.units);
            },
        }
    }

    log::debug!(
        "xliff walk: {} files, {} units",
        layout.files.len(),
        layout.units.len()
    );
    layout
}

fn walk_v1(
    parent: &Element,
    path: &mut Vec<usize>,
    file: usize,
    inherited: bool,
    out: &mut Vec<UnitSlot>,
) {
    for (pos, node) in parent.children.iter().enumerate() {
        let Some(e) = node.as_element() else {
            continue;
        };
        path.push(pos);
        match e.local_name() {
            "group" => walk_v1(e, path, file, is_translatable(e, inherited), out),
            "trans-unit" => out.push(UnitSlot {
                path: path.clone(),
                file,
                unit_id: e.attr("id").map(str::to_string),
                segment_id: None,
                resname: e.attr("resname").map(str::to_string),
                notes: e.children_named("note").map(|n| n.text()).collect(),
                translatable: is_translatable(e, inherited),
            }),
            _ => {},
        }
        path.pop();
    }
}

fn walk_v2(
    parent: &Element,
    path: &mut Vec<usize>,
    file: usize,
    inherited: bool,
    out: &mut Vec<UnitSlot>,
) {
    for (pos, node) in parent.children.iter().enumerate() {
        let Some(e) = node.as_element() else {
            continue;
        };
        path.push(pos);
        match e.local_name() {
            "group" => walk_v2(e, path, file, is_translatable(e, inherited), out),
            "unit" => {
                let translatable = is_translatable(e, inherited);
                let notes: Vec<String> = e
                    .child("notes")
                    .map(|notes| notes.children_named("note").map(|n| n.text()).collect())
                    .unwrap_or_default();
                for (seg_pos, seg_node) in e.children.iter().enumerate() {
                    let Some(segment) =
                        seg_node.as_element().filter(|s| s.local_name() == "segment")
                    else {
                        continue;
                    };
                    let mut seg_path = path.clone();
                    seg_path.push(seg_pos);
                    out.push(UnitSlot {
                        path: seg_path,
                        file,
                        unit_id: e.attr("id").map(str::to_string),
                        segment_id: segment.attr("id").map(str::to_string),
                        resname: e.attr("name").map(str::to_string),
                        notes: notes.clone(),
                        translatable,
                    });
                }
            },
            _ => {},
        }
        path.pop();
    }
}

fn is_translatable(element: &Element, inherited: bool) -> bool {
    match element.attr("translate") {
        Some("no") => false,
        Some("yes") => true,
        _ => inherited,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{XmlOptions, decode};

    fn root(xml: &str) -> Element {
        decode(xml.as_bytes(), &XmlOptions::default()).unwrap().root
    }

    #[test]
    fn test_v1_groups_and_translate() {
        let root = root(
            r#"<xliff version="1.2"><file original="a.txt" source-language="en" target-language="fr"><header/><body>
                <trans-unit id="1"><source>One</source><note>hint</note></trans-unit>
                <group translate="no"><trans-unit id="2"><source>Two</source></trans-unit>
                  <trans-unit id="3" translate="yes"><source>Three</source></trans-unit></group>
               </body></file></xliff>"#,
        );
        let layout = walk_units(&root, XliffVersion::V1);
        assert_eq!(layout.files.len(), 1);
        assert_eq!(layout.files[0].target_language.as_deref(), Some("fr"));
        let ids: Vec<(Option<&str>, bool)> = layout
            .units
            .iter()
            .map(|u| (u.unit_id.as_deref(), u.translatable))
            .collect();
        assert_eq!(ids, [(Some("1"), true), (Some("2"), false), (Some("3"), true)]);
        assert_eq!(layout.units[0].notes, ["hint"]);
        let unit = root.descend(&layout.units[2].path).unwrap();
        assert_eq!(unit.attr("id"), Some("3"));
    }

    #[test]
    fn test_v2_segments() {
        let root = root(
            r#"<xliff version="2.0" srcLang="en" trgLang="de"><file id="f1" original="ui.json">
                <unit id="u1" name="greeting"><notes><note>Shown on start</note></notes>
                  <segment id="s1"><source>Hello.</source></segment><ignorable><source> </source></ignorable>
                  <segment id="s2"><source>Bye.</source></segment></unit>
                <group id="g"><unit id="u2"><segment><source>Nested</source></segment></unit></group>
               </file></xliff>"#,
        );
        let layout = walk_units(&root, XliffVersion::V2);
        assert_eq!(layout.files[0].source_language.as_deref(), Some("en"));
        assert_eq!(layout.files[0].original.as_deref(), Some("ui.json"));
        let ids: Vec<(Option<&str>, Option<&str>)> = layout
            .units
            .iter()
            .map(|u| (u.unit_id.as_deref(), u.segment_id.as_deref()))
            .collect();
        assert_eq!(ids, [(Some("u1"), Some("s1")), (Some("u1"), Some("s2")), (Some("u2"), None)]);
        assert_eq!(layout.units[1].resname.as_deref(), Some("greeting"));
        assert_eq!(layout.units[1].notes, ["Shown on start"]);
        assert_eq!(root.descend(&layout.units[1].path).unwrap().attr("id"), Some("s2"));
    }
}
