//! XML tree codec.
//!
//! Parts are decoded into an owned element/attribute tree ([`XmlDocument`]),
//! edited in place by the format adapters, and encoded back. Decoding and
//! encoding always take an explicit [`XmlOptions`] value; there is no global
//! parser configuration.
//!
//! # Example
//!
//! ```rust
//! use longan::xml::{self, XmlOptions};
//!
//! let opts = XmlOptions::default();
//! let mut doc = xml::decode(b"<sst><si><t>Hello</t></si></sst>", &opts)?;
//! for si in doc.root.children_named("si") {
//!     assert_eq!(si.text(), "Hello");
//! }
//! doc.root.set_attr("count", "1");
//! let bytes = xml::encode(&doc, &opts);
//! # Ok::<(), longan::xml::XmlError>(())
//! ```
mod decode;
mod encode;
mod escape;
mod tree;

pub use decode::{decode, decode_fragment};
pub use encode::{encode, encode_element, encode_nodes};
pub use escape::{escape_attr, escape_text, unescape};
pub use tree::{Declaration, Element, Namespace, XmlDocument, XmlNode, split_qname};

use thiserror::Error;

/// Errors raised while decoding XML.
#[derive(Error, Debug)]
pub enum XmlError {
    /// The underlying reader rejected the input
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// An attribute could not be read
    #[error("Attribute error: {0}")]
    Attribute(String),

    /// Content is not valid UTF-8
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Start and end tags do not pair up
    #[error("Unbalanced document: {0}")]
    Unbalanced(String),

    /// The input has no root element
    #[error("Document has no root element")]
    MissingRoot,

    /// A reference to an entity other than the five predefined ones
    #[error("Unsupported entity reference &{0};")]
    UnsupportedEntity(String),
}

impl From<quick_xml::Error> for XmlError {
    fn from(err: quick_xml::Error) -> Self {
        XmlError::Parse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        XmlError::Attribute(err.to_string())
    }
}

/// Options for XML decoding and encoding.
///
/// # Examples
///
/// ```rust
/// use longan::xml::XmlOptions;
///
/// let options = XmlOptions::new()
///     .with_trim_text(false)
///     .with_expand_empty_elements(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlOptions {
    /// Drop leading and trailing whitespace from text nodes when decoding
    pub trim_text: bool,
    /// Write childless elements as `<a></a>` instead of `<a/>`
    pub expand_empty_elements: bool,
    /// Write an XML declaration when encoding a document
    pub write_declaration: bool,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            trim_text: false,
            expand_empty_elements: false,
            write_declaration: true,
        }
    }
}

impl XmlOptions {
    /// Create options with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether text nodes are trimmed on decode.
    #[inline]
    pub fn with_trim_text(mut self, trim: bool) -> Self {
        self.trim_text = trim;
        self
    }

    /// Set whether childless elements are written expanded.
    #[inline]
    pub fn with_expand_empty_elements(mut self, expand: bool) -> Self {
        self.expand_empty_elements = expand;
        self
    }

    /// Set whether documents are written with an XML declaration.
    #[inline]
    pub fn with_declaration(mut self, write: bool) -> Self {
        self.write_declaration = write;
        self
    }
}
