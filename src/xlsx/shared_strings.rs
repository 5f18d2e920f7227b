//! Shared string table (`xl/sharedStrings.xml`).
//!
//! An `si` entry is either plain `t` text or a sequence of rich-text runs
//! (`r`), each with optional run properties and its own `t`. Phonetic runs
//! (`rPh`) carry reading hints and are not part of the text.
use crate::xml::{Element, Namespace, XmlDocument, XmlNode};

/// The decoded shared string table of a workbook.
#[derive(Debug, Clone)]
pub(crate) struct SharedStrings {
    pub doc: XmlDocument,
    pub ns: Namespace,
    /// Text of every entry, in table order
    pub texts: Vec<String>,
}

impl SharedStrings {
    pub fn new(doc: XmlDocument, ns: Namespace) -> Self {
        let texts = ns.children(&doc.root, "si").map(|si| entry_text(si, &ns)).collect();
        Self { doc, ns, texts }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.texts.get(index).map(String::as_str)
    }

    /// Replace the text of entry `index`.
    pub fn set(&mut self, index: usize, text: &str) {
        let ns = self.ns.clone();
        let Some(si) = self
            .doc
            .root
            .elements_mut()
            .filter(|e| ns.matches(e, "si"))
            .nth(index)
        else {
            return;
        };
        set_entry_text(si, text, &ns);
        if let Some(slot) = self.texts.get_mut(index) {
            *slot = text.to_string();
        }
    }

    /// Append a new plain entry and return its index.
    pub fn push(&mut self, text: &str) -> usize {
        let mut si = Element::new(self.ns.qualify("si"));
        set_entry_text(&mut si, text, &self.ns);
        self.doc.root.children.push(XmlNode::Element(si));
        self.texts.push(text.to_string());
        self.texts.len() - 1
    }

    /// Bring `uniqueCount` in line with the number of entries.
    ///
    /// `count` is the number of cell references, which repointing leaves
    /// unchanged.
    pub fn update_counts(&mut self) {
        if self.doc.root.attr("uniqueCount").is_some() {
            let unique = itoa::Buffer::new().format(self.texts.len()).to_string();
            self.doc.root.set_attr("uniqueCount", unique);
        }
    }
}

/// Text of an `si` (or inline `is`) element.
pub(crate) fn entry_text(si: &Element, ns: &Namespace) -> String {
    let mut text = String::new();
    for child in si.elements() {
        if ns.matches(child, "t") {
            text.push_str(&child.text());
        } else if ns.matches(child, "r") {
            for t in ns.children(child, "t") {
                text.push_str(&t.text());
            }
        }
    }
    text
}

/// Replace the content of an `si` (or `is`) element with `text`.
///
/// A rich-text entry becomes a single run carrying the first run's
/// properties; phonetic runs are dropped and phonetic properties kept.
pub(crate) fn set_entry_text(si: &mut Element, text: &str, ns: &Namespace) {
    let first_rpr = ns
        .child(si, "r")
        .and_then(|r| ns.child(r, "rPr"))
        .cloned();
    let rich = ns.child(si, "r").is_some();
    let phonetic = ns.child(si, "phoneticPr").cloned();

    let t = text_element(text, ns);
    si.children.clear();
    if rich {
        let mut run = Element::new(ns.qualify("r"));
        if let Some(rpr) = first_rpr {
            run.children.push(XmlNode::Element(rpr));
        }
        run.children.push(XmlNode::Element(t));
        si.children.push(XmlNode::Element(run));
    } else {
        si.children.push(XmlNode::Element(t));
    }
    if let Some(phonetic) = phonetic {
        si.children.push(XmlNode::Element(phonetic));
    }
}

fn text_element(text: &str, ns: &Namespace) -> Element {
    let mut t = Element::new(ns.qualify("t"));
    let needs_preserve = text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || text.contains('\n');
    if needs_preserve {
        t.set_attr("xml:space", "preserve");
    }
    if !text.is_empty() {
        t.children.push(XmlNode::Text(text.to_string()));
    }
    t
}
