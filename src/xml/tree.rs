//! Generic element/attribute tree for XML parts.
//!
//! Children are always an ordered list. An element that appears once and an
//! element that repeats are accessed the same way, through
//! [`Element::children_named`] or [`Namespace::children`], so adapters never
//! branch on cardinality.

/// A node in the XML tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// An element with attributes and children
    Element(Element),
    /// Character data, unescaped
    Text(String),
    /// A CDATA section, verbatim
    CData(String),
    /// A comment, verbatim
    Comment(String),
    /// A processing instruction, verbatim content between `<?` and `?>`
    ProcessingInstruction(String),
    /// A document type declaration, verbatim content after `<!DOCTYPE`
    DocType(String),
}

impl XmlNode {
    /// Create a text node.
    #[inline]
    pub fn text(text: impl Into<String>) -> Self {
        XmlNode::Text(text.into())
    }

    /// Get the element if this node is one.
    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get the element mutably if this node is one.
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Element> for XmlNode {
    fn from(element: Element) -> Self {
        XmlNode::Element(element)
    }
}

/// An XML element.
///
/// `name` is the qualified name as written (`w:p`, `sheet`). Attribute
/// values are stored unescaped, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder: append a child node.
    pub fn with_child(mut self, child: impl Into<XmlNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder: append a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Local part of the element name.
    #[inline]
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// Namespace prefix of the element name, if any.
    #[inline]
    pub fn prefix(&self) -> Option<&str> {
        split_qname(&self.name).0
    }

    /// Get an attribute by its qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get an attribute by local name, whatever its prefix.
    ///
    /// Namespace declarations are never matched.
    pub fn attr_local(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| {
                let (prefix, name) = split_qname(k);
                name == local && prefix != Some("xmlns") && k != "xmlns"
            })
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Iterate over child elements, skipping text and other nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Iterate mutably over child elements.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(XmlNode::as_element_mut)
    }

    /// Iterate over child elements with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.local_name() == local)
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.local_name() == local)
    }

    /// First child element with the given local name, mutably.
    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.local_name() == local)
    }

    /// Position in `children` of the first element with the given local name.
    pub fn child_position(&self, local: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| n.as_element().is_some_and(|e| e.local_name() == local))
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
                XmlNode::Element(e) => e.collect_text(out),
                _ => {},
            }
        }
    }

    /// Follow a path of child positions down from this element.
    pub fn descend(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &idx in path {
            current = current.children.get(idx)?.as_element()?;
        }
        Some(current)
    }

    /// Follow a path of child positions down from this element, mutably.
    pub fn descend_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &idx in path {
            current = current.children.get_mut(idx)?.as_element_mut()?;
        }
        Some(current)
    }
}

/// Split a qualified name into prefix and local part.
#[inline]
pub fn split_qname(name: &str) -> (Option<&str>, &str) {
    match memchr::memchr(b':', name.as_bytes()) {
        Some(i) => (Some(&name[..i]), &name[i + 1..]),
        None => (None, name),
    }
}

/// The XML declaration of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("UTF-8".to_string()),
            standalone: Some("yes".to_string()),
        }
    }
}

/// A decoded XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// The `<?xml ...?>` declaration, if the source had one
    pub declaration: Option<Declaration>,
    /// Comments, processing instructions and DOCTYPE before the root
    pub prolog: Vec<XmlNode>,
    /// The root element
    pub root: Element,
    /// Comments and processing instructions after the root
    pub epilog: Vec<XmlNode>,
}

impl XmlDocument {
    /// Create a document around a root element.
    pub fn new(root: Element) -> Self {
        Self {
            declaration: Some(Declaration::default()),
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Resolve the namespace bound to `uri` on the root element.
    ///
    /// Falls back to `default_prefix` when the root does not declare `uri`.
    pub fn namespace(&self, uri: &str, default_prefix: &str) -> Namespace {
        Namespace::resolve(&self.root, uri, default_prefix)
    }
}

/// A namespace binding used to match and build qualified names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: Option<String>,
}

impl Namespace {
    /// A namespace written with the given prefix (`None` for the default namespace).
    pub fn with_prefix(prefix: Option<&str>) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.is_empty()).map(str::to_string),
        }
    }

    /// Find the prefix `element` binds to `uri`.
    pub fn resolve(element: &Element, uri: &str, default_prefix: &str) -> Self {
        for (key, value) in &element.attributes {
            if value != uri {
                continue;
            }
            if key == "xmlns" {
                return Self { prefix: None };
            }
            if let Some(prefix) = key.strip_prefix("xmlns:") {
                return Self::with_prefix(Some(prefix));
            }
        }
        Self::with_prefix(Some(default_prefix))
    }

    /// The bound prefix.
    #[inline]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Check whether `element` is `local` in this namespace.
    #[inline]
    pub fn matches(&self, element: &Element, local: &str) -> bool {
        let (prefix, name) = split_qname(&element.name);
        name == local && prefix == self.prefix.as_deref()
    }

    /// Build the qualified name for `local` in this namespace.
    pub fn qualify(&self, local: &str) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, local),
            None => local.to_string(),
        }
    }

    /// Child elements of `parent` named `local` in this namespace.
    pub fn children<'a>(
        &'a self,
        parent: &'a Element,
        local: &'a str,
    ) -> impl Iterator<Item = &'a Element> {
        parent.elements().filter(move |e| self.matches(e, local))
    }

    /// First child element of `parent` named `local` in this namespace.
    pub fn child<'a>(&self, parent: &'a Element, local: &str) -> Option<&'a Element> {
        parent.elements().find(|e| self.matches(e, local))
    }
}
