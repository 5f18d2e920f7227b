//! XML part decoding into an [`XmlDocument`] tree.
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::escape::{resolve_reference, unescape, unresolved_reference};
use super::tree::{Declaration, Element, XmlDocument, XmlNode};
use super::{XmlError, XmlOptions};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode an XML part into a tree.
///
/// Text and attribute values are unescaped; whitespace-only text between
/// elements is kept unless `options.trim_text` is set. References to
/// entities other than the predefined ones and character references are
/// rejected with [`XmlError::UnsupportedEntity`].
pub fn decode(bytes: &[u8], options: &XmlOptions) -> Result<XmlDocument, XmlError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(options.trim_text);
    reader.config_mut().expand_empty_elements = false;
    reader.config_mut().check_end_names = true;

    let mut builder = TreeBuilder::default();
    let mut buf = Vec::with_capacity(1024);

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                builder.flush_text()?;
                builder.stack.push(element_from_start(&e)?);
            },
            Event::Empty(e) => {
                builder.flush_text()?;
                let element = element_from_start(&e)?;
                builder.close(element)?;
            },
            Event::End(_) => {
                builder.flush_text()?;
                let element = builder
                    .stack
                    .pop()
                    .ok_or_else(|| XmlError::Unbalanced("unexpected end tag".to_string()))?;
                builder.close(element)?;
            },
            Event::Text(e) => {
                builder.raw_text.push_str(std::str::from_utf8(e.as_ref())?);
            },
            Event::GeneralRef(e) => {
                let name = std::str::from_utf8(e.as_ref())?;
                if resolve_reference(name).is_none() {
                    return Err(XmlError::UnsupportedEntity(name.to_string()));
                }
                builder.raw_text.push('&');
                builder.raw_text.push_str(name);
                builder.raw_text.push(';');
            },
            Event::CData(e) => {
                builder.flush_text()?;
                let text = std::str::from_utf8(e.as_ref())?.to_string();
                builder.append(XmlNode::CData(text));
            },
            Event::Comment(e) => {
                builder.flush_text()?;
                let text = std::str::from_utf8(e.as_ref())?.to_string();
                builder.append(XmlNode::Comment(text));
            },
            Event::PI(e) => {
                builder.flush_text()?;
                let text = std::str::from_utf8(e.as_ref())?.to_string();
                builder.append(XmlNode::ProcessingInstruction(text));
            },
            Event::DocType(e) => {
                builder.flush_text()?;
                let text = std::str::from_utf8(e.as_ref())?.trim().to_string();
                builder.append(XmlNode::DocType(text));
            },
            Event::Decl(e) => {
                let version = e
                    .version()
                    .ok()
                    .map(|v| String::from_utf8_lossy(&v).into_owned())
                    .unwrap_or_else(|| "1.0".to_string());
                let encoding = e
                    .encoding()
                    .and_then(|r| r.ok())
                    .map(|v| String::from_utf8_lossy(&v).into_owned());
                let standalone = e
                    .standalone()
                    .and_then(|r| r.ok())
                    .map(|v| String::from_utf8_lossy(&v).into_owned());
                builder.declaration = Some(Declaration {
                    version,
                    encoding,
                    standalone,
                });
            },
            Event::Eof => break,
            #[allow(unreachable_patterns)]
            _ => {},
        }
        buf.clear();
    }

    builder.finish()
}

/// Decode a fragment that may hold several top-level nodes.
///
/// The fragment is wrapped in a synthetic element so mixed content such as
/// `Hello <g id="1">world</g>` decodes; the wrapper's children are returned.
pub fn decode_fragment(fragment: &str, options: &XmlOptions) -> Result<Vec<XmlNode>, XmlError> {
    let wrapped = format!("<fragment>{}</fragment>", fragment);
    let doc = decode(wrapped.as_bytes(), options)?;
    Ok(doc.root.children)
}

fn element_from_start(e: &BytesStart<'_>) -> Result<Element, XmlError> {
    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
    let mut element = Element::new(name);
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let raw = std::str::from_utf8(&attr.value)?;
        if let Some(name) = unresolved_reference(raw) {
            return Err(XmlError::UnsupportedEntity(name.to_string()));
        }
        element.attributes.push((key, unescape(raw).into_owned()));
    }
    Ok(element)
}

#[derive(Default)]
struct TreeBuilder {
    declaration: Option<Declaration>,
    prolog: Vec<XmlNode>,
    epilog: Vec<XmlNode>,
    stack: Vec<Element>,
    root: Option<Element>,
    /// Escaped text accumulated across text and entity events
    raw_text: String,
}

impl TreeBuilder {
    fn flush_text(&mut self) -> Result<(), XmlError> {
        if self.raw_text.is_empty() {
            return Ok(());
        }
        let raw = std::mem::take(&mut self.raw_text);
        let text = unescape(&raw).into_owned();
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(XmlNode::Text(text)),
            None if text.trim().is_empty() => {},
            None => {
                return Err(XmlError::Unbalanced(
                    "text content outside the root element".to_string(),
                ));
            },
        }
        Ok(())
    }

    fn append(&mut self, node: XmlNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None if self.root.is_none() => self.prolog.push(node),
            None => self.epilog.push(node),
        }
    }

    fn close(&mut self, element: Element) -> Result<(), XmlError> {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(XmlNode::Element(element)),
            None if self.root.is_none() => self.root = Some(element),
            None => {
                return Err(XmlError::Unbalanced(format!(
                    "second root element <{}>",
                    element.name
                )));
            },
        }
        Ok(())
    }

    fn finish(mut self) -> Result<XmlDocument, XmlError> {
        self.flush_text()?;
        if let Some(open) = self.stack.last() {
            return Err(XmlError::Unbalanced(format!("unclosed element <{}>", open.name)));
        }
        let root = self.root.ok_or(XmlError::MissingRoot)?;
        Ok(XmlDocument {
            declaration: self.declaration,
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}
