//! Runs inside a `w:p` paragraph.
use smallvec::SmallVec;

use crate::model::RunFormat;
use crate::xml::{self, Element, Namespace, XmlNode, XmlOptions};

/// Path from a paragraph down to one of its runs.
pub(crate) type RunPath = SmallVec<[usize; 2]>;

/// Inline wrappers whose `w:r` children still belong to the paragraph.
const INLINE_WRAPPERS: &[&str] = &["hyperlink", "ins", "smartTag", "customXml", "fldSimple"];

/// Find the runs of a paragraph in document order.
///
/// A run is a `w:r` directly under the paragraph or under an inline
/// wrapper. Math runs (`m:r`) and runs inside deletions are not matched.
pub(crate) fn find_runs(paragraph: &Element, ns: &Namespace) -> SmallVec<[RunPath; 8]> {
    let mut runs = SmallVec::new();
    let mut path = RunPath::new();
    collect_runs(paragraph, ns, &mut path, &mut runs);
    runs
}

fn collect_runs(
    parent: &Element,
    ns: &Namespace,
    path: &mut RunPath,
    runs: &mut SmallVec<[RunPath; 8]>,
) {
    for (i, node) in parent.children.iter().enumerate() {
        let Some(child) = node.as_element() else {
            continue;
        };
        path.push(i);
        if ns.matches(child, "r") {
            runs.push(path.clone());
        } else if INLINE_WRAPPERS.iter().any(|w| ns.matches(child, w)) {
            collect_runs(child, ns, path, runs);
        } else if ns.matches(child, "sdt") {
            if let Some(pos) = child
                .children
                .iter()
                .position(|n| n.as_element().is_some_and(|e| ns.matches(e, "sdtContent")))
            {
                path.push(pos);
                if let Some(content) = child.children[pos].as_element() {
                    collect_runs(content, ns, path, runs);
                }
                path.pop();
            }
        }
        path.pop();
    }
}

/// Text of a run: `w:t` text, `w:tab` as a tab, `w:br` and `w:cr` as newlines.
pub(crate) fn run_text(run: &Element, ns: &Namespace) -> String {
    let mut text = String::new();
    for child in run.elements() {
        if ns.matches(child, "t") {
            text.push_str(&child.text());
        } else if ns.matches(child, "tab") {
            text.push('\t');
        } else if ns.matches(child, "br") || ns.matches(child, "cr") {
            text.push('\n');
        }
    }
    text
}

/// Decode a run's formatting from its `w:rPr`.
pub(crate) fn run_format(run: &Element, ns: &Namespace, options: &XmlOptions) -> RunFormat {
    let Some(rpr) = ns.child(run, "rPr") else {
        return RunFormat::default();
    };

    RunFormat {
        properties: Some(xml::encode_element(rpr, options)),
        bold: toggle(rpr, ns, "b"),
        italic: toggle(rpr, ns, "i"),
        underline: ns
            .child(rpr, "u")
            .is_some_and(|u| u.attr_local("val").is_none_or(|v| v != "none")),
        style: ns
            .child(rpr, "rStyle")
            .and_then(|s| s.attr_local("val"))
            .map(str::to_string),
    }
}

/// An on/off property is on when present without a false `w:val`.
fn toggle(rpr: &Element, ns: &Namespace, local: &str) -> bool {
    ns.child(rpr, local).is_some_and(|e| {
        !matches!(e.attr_local("val"), Some("0" | "false" | "off"))
    })
}

/// Build a run holding `text` with the given run properties.
///
/// Newlines become `w:br` and tabs `w:tab`; text pieces keep their
/// whitespace through `xml:space="preserve"`.
pub(crate) fn build_run(text: &str, properties: Option<Element>, ns: &Namespace) -> Element {
    let mut run = Element::new(ns.qualify("r"));
    if let Some(rpr) = properties {
        run.children.push(XmlNode::Element(rpr));
    }

    let mut piece = String::new();
    for ch in text.chars() {
        match ch {
            '\n' | '\t' => {
                flush_text(&mut run, &mut piece, ns);
                let name = if ch == '\n' { "br" } else { "tab" };
                run.children.push(XmlNode::Element(Element::new(ns.qualify(name))));
            },
            '\r' => {},
            _ => piece.push(ch),
        }
    }
    flush_text(&mut run, &mut piece, ns);

    if !run.elements().any(|e| !ns.matches(e, "rPr")) {
        run.children.push(XmlNode::Element(
            Element::new(ns.qualify("t")).with_attr("xml:space", "preserve"),
        ));
    }
    run
}

fn flush_text(run: &mut Element, piece: &mut String, ns: &Namespace) {
    if piece.is_empty() {
        return;
    }
    let t = Element::new(ns.qualify("t"))
        .with_attr("xml:space", "preserve")
        .with_text(std::mem::take(piece));
    run.children.push(XmlNode::Element(t));
}
