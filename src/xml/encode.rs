//! XML tree encoding.
use super::XmlOptions;
use super::escape::{escape_attr, escape_text};
use super::tree::{Declaration, Element, XmlDocument, XmlNode};

/// Encode a document back to XML bytes.
pub fn encode(doc: &XmlDocument, options: &XmlOptions) -> Vec<u8> {
    let mut out = String::with_capacity(4096);

    if options.write_declaration {
        let default_decl = Declaration::default();
        let decl = doc.declaration.as_ref().unwrap_or(&default_decl);
        write_declaration(decl, &mut out);
        out.push_str("\r\n");
    }

    for node in &doc.prolog {
        write_node(node, options, &mut out);
    }
    write_element(&doc.root, options, &mut out);
    for node in &doc.epilog {
        write_node(node, options, &mut out);
    }

    out.into_bytes()
}

/// Encode a single element as an XML string.
pub fn encode_element(element: &Element, options: &XmlOptions) -> String {
    let mut out = String::new();
    write_element(element, options, &mut out);
    out
}

/// Encode a sequence of nodes (mixed content) as an XML string.
pub fn encode_nodes(nodes: &[XmlNode], options: &XmlOptions) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, options, &mut out);
    }
    out
}

fn write_declaration(decl: &Declaration, out: &mut String) {
    out.push_str("<?xml version=\"");
    out.push_str(&escape_attr(&decl.version));
    out.push('"');
    if let Some(encoding) = &decl.encoding {
        out.push_str(" encoding=\"");
        out.push_str(&escape_attr(encoding));
        out.push('"');
    }
    if let Some(standalone) = &decl.standalone {
        out.push_str(" standalone=\"");
        out.push_str(&escape_attr(standalone));
        out.push('"');
    }
    out.push_str("?>");
}

fn write_node(node: &XmlNode, options: &XmlOptions, out: &mut String) {
    match node {
        XmlNode::Element(e) => write_element(e, options, out),
        XmlNode::Text(t) => out.push_str(&escape_text(t)),
        XmlNode::CData(t) => {
            out.push_str("<![CDATA[");
            out.push_str(t);
            out.push_str("]]>");
        },
        XmlNode::Comment(t) => {
            out.push_str("<!--");
            out.push_str(t);
            out.push_str("-->");
        },
        XmlNode::ProcessingInstruction(t) => {
            out.push_str("<?");
            out.push_str(t);
            out.push_str("?>");
        },
        XmlNode::DocType(t) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(t);
            out.push('>');
        },
    }
}

fn write_element(element: &Element, options: &XmlOptions, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }

    if element.children.is_empty() && !options.expand_empty_elements {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &element.children {
        write_node(child, options, out);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
