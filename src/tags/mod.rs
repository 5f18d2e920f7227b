//! Inline markup codec for localization units.
//!
//! Inline elements inside a unit's source (`<g>`, `<x/>`, `<pc>`, `<ph/>`,
//! ...) are lifted out into an ordered [`Tag`] list and replaced in the
//! text by positional placeholders:
//!
//! - paired tags become `{N}` ... `{/N}`
//! - standalone tags become `{N/}`
//!
//! `N` is the 1-based position of the tag in the list, numbered in
//! pre-order so an enclosing tag comes before the tags it wraps.
//!
//! # Example
//!
//! ```rust
//! use longan::tags::{extract_tags_str, restore_tags_str};
//! use longan::xml::XmlOptions;
//!
//! let opts = XmlOptions::default();
//! let extracted = extract_tags_str(r#"Click <g id="1">here</g><x id="2"/>"#, &opts)?;
//! assert_eq!(extracted.plain_text, "Click {1}here{/1}{2/}");
//!
//! let restored = restore_tags_str("Cliquez {1}ici{/1}{2/}", &extracted.tags, &opts);
//! assert_eq!(restored, r#"Cliquez <g id="1">ici</g><x id="2"/>"#);
//! # Ok::<(), longan::xml::XmlError>(())
//! ```
mod placeholder;
pub mod qa;

use serde::{Deserialize, Serialize};

use crate::xml::{self, Element, XmlError, XmlNode, XmlOptions};

pub use placeholder::{Placeholder, PlaceholderScanner, Token, placeholders};

/// Inline markup vocabulary of XLIFF 1.2 and 2.x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    /// 1.2 generic group
    G,
    /// 1.2 generic placeholder
    X,
    /// 1.2 begin paired placeholder
    Bx,
    /// 1.2 end paired placeholder
    Ex,
    /// 1.2 begin paired native code
    Bpt,
    /// 1.2 end paired native code
    Ept,
    /// Placeholder (1.2 native code, 2.x standalone code)
    Ph,
    /// 1.2 isolated native code
    It,
    /// Annotation marker
    Mrk,
    /// 1.2 sub-flow
    Sub,
    /// 2.x spanning code
    Pc,
    /// 2.x start code
    Sc,
    /// 2.x end code
    Ec,
    /// 2.x start marker
    Sm,
    /// 2.x end marker
    Em,
    /// 2.x code point
    Cp,
    /// Any element outside the inline vocabulary
    Unknown,
}

impl TagKind {
    /// Map an element's local name to its kind.
    pub fn from_local_name(name: &str) -> Self {
        match name {
            "g" => TagKind::G,
            "x" => TagKind::X,
            "bx" => TagKind::Bx,
            "ex" => TagKind::Ex,
            "bpt" => TagKind::Bpt,
            "ept" => TagKind::Ept,
            "ph" => TagKind::Ph,
            "it" => TagKind::It,
            "mrk" => TagKind::Mrk,
            "sub" => TagKind::Sub,
            "pc" => TagKind::Pc,
            "sc" => TagKind::Sc,
            "ec" => TagKind::Ec,
            "sm" => TagKind::Sm,
            "em" => TagKind::Em,
            "cp" => TagKind::Cp,
            _ => TagKind::Unknown,
        }
    }

    /// Check whether the kind encloses translatable text.
    #[inline]
    pub fn is_paired(self) -> bool {
        matches!(self, TagKind::G | TagKind::Pc | TagKind::Mrk)
    }
}

/// One inline markup element lifted out of a unit's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub kind: TagKind,
    /// Qualified element name as written
    pub name: String,
    /// `id` attribute
    pub id: Option<String>,
    /// `dataRef` (or `dataRefStart`) attribute
    pub data_ref: Option<String>,
    /// Verbatim markup of the element; paired tags keep only the empty shell
    pub original: Option<String>,
    /// Inner markup of a standalone tag, escaped
    pub content: Option<String>,
    /// All attributes in document order
    pub attributes: Vec<(String, String)>,
}

impl Tag {
    fn from_element(element: &Element, options: &XmlOptions) -> Self {
        let kind = TagKind::from_local_name(element.local_name());
        let content = if kind.is_paired() || element.children.is_empty() {
            None
        } else {
            Some(xml::encode_nodes(&element.children, options))
        };
        let shell = if kind.is_paired() {
            Element {
                children: Vec::new(),
                ..element.clone()
            }
        } else {
            element.clone()
        };

        Self {
            kind,
            name: element.name.clone(),
            id: element.attr("id").map(str::to_string),
            data_ref: element
                .attr("dataRef")
                .or_else(|| element.attr("dataRefStart"))
                .map(str::to_string),
            original: Some(xml::encode_element(&shell, options)),
            content,
            attributes: element.attributes.clone(),
        }
    }

    /// Rebuild the element without its paired content.
    fn to_element(&self, options: &XmlOptions) -> Element {
        let mut element = Element::new(self.name.clone());
        element.attributes = self.attributes.clone();
        if let Some(content) = &self.content {
            match xml::decode_fragment(content, options) {
                Ok(nodes) => element.children = nodes,
                Err(e) => {
                    log::debug!("tag content is not well formed, kept as text: {}", e);
                    element.children.push(XmlNode::Text(content.clone()));
                },
            }
        }
        element
    }
}

/// Result of lifting inline markup out of a text run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extracted {
    /// Text with placeholders in place of markup
    pub plain_text: String,
    /// Lifted markup, in placeholder order
    pub tags: Vec<Tag>,
}

/// Lift inline markup out of a sequence of nodes.
///
/// Comments and processing instructions inside the run are dropped.
pub fn extract_tags(nodes: &[XmlNode], options: &XmlOptions) -> Extracted {
    let mut extracted = Extracted::default();
    extract_into(nodes, options, &mut extracted);
    extracted
}

/// Lift inline markup out of an XML fragment such as a `<source>` body.
pub fn extract_tags_str(fragment: &str, options: &XmlOptions) -> Result<Extracted, XmlError> {
    let nodes = xml::decode_fragment(fragment, options)?;
    let mut extracted = Extracted::default();
    extract_into(&nodes, options, &mut extracted);
    Ok(extracted)
}

fn extract_into(nodes: &[XmlNode], options: &XmlOptions, out: &mut Extracted) {
    let mut num = itoa::Buffer::new();
    for node in nodes {
        match node {
            XmlNode::Text(t) | XmlNode::CData(t) => out.plain_text.push_str(t),
            XmlNode::Element(e) => {
                let tag = Tag::from_element(e, options);
                let paired = tag.kind.is_paired();
                out.tags.push(tag);
                let n = num.format(out.tags.len()).to_string();

                out.plain_text.push('{');
                out.plain_text.push_str(&n);
                if paired {
                    out.plain_text.push('}');
                    extract_into(&e.children, options, out);
                    out.plain_text.push_str("{/");
                    out.plain_text.push_str(&n);
                    out.plain_text.push('}');
                } else {
                    out.plain_text.push_str("/}");
                }
            },
            _ => {},
        }
    }
}

/// Rebuild inline markup from placeholder text.
///
/// Each placeholder that names a tag of the right shape is replaced by the
/// tag's element; paired tags wrap whatever lies between their opening and
/// closing placeholders. Placeholders that name no tag, closing
/// placeholders without an opening one, and opening placeholders that are
/// never closed stay in the text literally. Tags that no placeholder names
/// are dropped.
pub fn restore_tags(translated: &str, tags: &[Tag], options: &XmlOptions) -> Vec<XmlNode> {
    let tokens: Vec<Token<'_>> = PlaceholderScanner::new(translated).collect();

    let mut root: Vec<XmlNode> = Vec::new();
    let mut stack: Vec<Frame<'_>> = Vec::new();

    for (pos, token) in tokens.iter().enumerate() {
        let (ph, raw) = match *token {
            Token::Text(text) => {
                push_text(current(&mut root, &mut stack), text);
                continue;
            },
            Token::Placeholder(ph, raw) => (ph, raw),
        };

        match (ph, tag_for(tags, ph)) {
            (Placeholder::Standalone(_), Some(tag)) if !tag.kind.is_paired() => {
                let element = tag.to_element(options);
                current(&mut root, &mut stack).push(XmlNode::Element(element));
            },
            (Placeholder::Open(n), Some(tag))
                if tag.kind.is_paired() && closes_later(&tokens[pos + 1..], n) =>
            {
                stack.push(Frame {
                    number: n,
                    raw,
                    children: Vec::new(),
                });
            },
            (Placeholder::Close(n), Some(tag)) if stack.iter().any(|f| f.number == n) => {
                // Frames opened inside this one and still open unwind as literal text.
                while let Some(frame) = stack.pop() {
                    let parent = current(&mut root, &mut stack);
                    if frame.number == n {
                        let mut element = tag.to_element(options);
                        element.children = frame.children;
                        parent.push(XmlNode::Element(element));
                        break;
                    }
                    push_text(parent, frame.raw);
                    append_nodes(parent, frame.children);
                }
            },
            _ => push_text(current(&mut root, &mut stack), raw),
        }
    }

    while let Some(frame) = stack.pop() {
        let parent = current(&mut root, &mut stack);
        push_text(parent, frame.raw);
        append_nodes(parent, frame.children);
    }

    root
}

/// An opened paired tag collecting its content.
struct Frame<'a> {
    number: usize,
    raw: &'a str,
    children: Vec<XmlNode>,
}

fn current<'r>(root: &'r mut Vec<XmlNode>, stack: &'r mut [Frame<'_>]) -> &'r mut Vec<XmlNode> {
    match stack.last_mut() {
        Some(frame) => &mut frame.children,
        None => root,
    }
}

/// Rebuild inline markup from placeholder text as an escaped XML fragment.
pub fn restore_tags_str(translated: &str, tags: &[Tag], options: &XmlOptions) -> String {
    xml::encode_nodes(&restore_tags(translated, tags, options), options)
}

fn tag_for(tags: &[Tag], ph: Placeholder) -> Option<&Tag> {
    let n = ph.number();
    if n == 0 {
        return None;
    }
    tags.get(n - 1)
}

fn closes_later(rest: &[Token<'_>], n: usize) -> bool {
    rest.iter()
        .any(|t| matches!(t, Token::Placeholder(Placeholder::Close(m), _) if *m == n))
}

fn push_text(nodes: &mut Vec<XmlNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    match nodes.last_mut() {
        Some(XmlNode::Text(last)) => last.push_str(text),
        _ => nodes.push(XmlNode::Text(text.to_string())),
    }
}

fn append_nodes(nodes: &mut Vec<XmlNode>, children: Vec<XmlNode>) {
    for child in children {
        match child {
            XmlNode::Text(t) => push_text(nodes, &t),
            other => nodes.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn opts() -> XmlOptions {
        XmlOptions::default()
    }

    #[test]
    fn test_extract_xliff12_markup() {
        let src = r#"Press <g id="1">Save <x id="2"/> now</g> or <bpt id="3">&lt;b&gt;</bpt>quit<ept id="4">&lt;/b&gt;</ept>"#;
        let extracted = extract_tags_str(src, &opts()).unwrap();
        assert_eq!(extracted.plain_text, "Press {1}Save {2/} now{/1} or {3/}quit{4/}");
        let kinds: Vec<TagKind> = extracted.tags.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, [TagKind::G, TagKind::X, TagKind::Bpt, TagKind::Ept]);
        assert_eq!(extracted.tags[2].content.as_deref(), Some("&lt;b&gt;"));
        assert_eq!(extracted.tags[0].original.as_deref(), Some(r#"<g id="1"/>"#));
        assert_eq!(extracted.tags[1].id.as_deref(), Some("2"));
    }

    #[test]
    fn test_extract_xliff2_markup() {
        let src = r#"<pc id="1" dataRefStart="d1">Bold</pc> and <ph id="2" dataRef="d2"/>"#;
        let extracted = extract_tags_str(src, &opts()).unwrap();
        assert_eq!(extracted.plain_text, "{1}Bold{/1} and {2/}");
        assert_eq!(extracted.tags[0].data_ref.as_deref(), Some("d1"));
        assert_eq!(extracted.tags[1].data_ref.as_deref(), Some("d2"));
    }

    #[test]
    fn test_unknown_elements_are_standalone() {
        let extracted = extract_tags_str("a <custom k=\"v\">b</custom> c", &opts()).unwrap();
        assert_eq!(extracted.plain_text, "a {1/} c");
        assert_eq!(extracted.tags[0].kind, TagKind::Unknown);
        assert_eq!(extracted.tags[0].original.as_deref(), Some("<custom k=\"v\">b</custom>"));
        let restored = restore_tags_str(&extracted.plain_text, &extracted.tags, &opts());
        assert_eq!(restored, "a <custom k=\"v\">b</custom> c");
    }

    #[test]
    fn test_restore_reordered_and_translated() {
        let src = r#"<g id="1">Open</g> the <x id="2"/> file"#;
        let extracted = extract_tags_str(src, &opts()).unwrap();
        let restored = restore_tags_str("Le fichier {2/} {1}ouvrir{/1}", &extracted.tags, &opts());
        assert_eq!(restored, r#"Le fichier <x id="2"/> <g id="1">ouvrir</g>"#);
    }

    #[test]
    fn test_restore_policies() {
        let extracted = extract_tags_str(r#"<g id="1">a</g><x id="2"/>"#, &opts()).unwrap();
        let tags = &extracted.tags;

        // Unknown placeholder number stays literal
        assert_eq!(restore_tags_str("x {7/} y", tags, &opts()), "x {7/} y");
        // Close without open stays literal
        assert_eq!(restore_tags_str("a{/1} b", tags, &opts()), "a{/1} b");
        // Open without close stays literal
        assert_eq!(restore_tags_str("{1}a b", tags, &opts()), "{1}a b");
        // Unreferenced tags are dropped
        assert_eq!(restore_tags_str("plain", tags, &opts()), "plain");
        // Wrong shape stays literal
        assert_eq!(restore_tags_str("{2}a{/2}", tags, &opts()), "{2}a{/2}");
    }

    #[test]
    fn test_codec_follows_xml_options() {
        let expanded = XmlOptions::default().with_expand_empty_elements(true);
        let nodes = xml::decode_fragment(r#"Go <g id="1">on</g><x id="2"/>"#, &expanded).unwrap();

        let extracted = extract_tags(&nodes, &expanded);
        assert_eq!(extracted.tags[0].original.as_deref(), Some(r#"<g id="1"></g>"#));
        assert_eq!(extracted.tags[1].original.as_deref(), Some(r#"<x id="2"></x>"#));

        let restored = restore_tags("{2/}{1}weiter{/1}", &extracted.tags, &expanded);
        assert_eq!(
            xml::encode_nodes(&restored, &expanded),
            r#"<x id="2"></x><g id="1">weiter</g>"#
        );
    }

    #[test]
    fn test_restore_escapes_text() {
        let extracted = extract_tags_str(r#"<x id="1"/>"#, &opts()).unwrap();
        assert_eq!(
            restore_tags_str("a < b & {1/}", &extracted.tags, &opts()),
            r#"a &lt; b &amp; <x id="1"/>"#
        );
    }

    #[test]
    fn test_restore_improper_nesting() {
        let src = r#"<g id="1">a<g id="2">b</g></g>"#;
        let extracted = extract_tags_str(src, &opts()).unwrap();
        assert_eq!(extracted.plain_text, "{1}a{2}b{/2}{/1}");
        // {2} is closed after {1}: the inner frame unwinds as literal text
        let restored = restore_tags_str("{1}a{2}b{/1}{/2}", &extracted.tags, &opts());
        assert_eq!(restored, r#"<g id="1">a{2}b</g>{/2}"#);
    }

    fn fragment() -> impl Strategy<Value = String> {
        let text = proptest::string::string_regex("[a-zA-Z ,.]{0,8}").unwrap();
        let leaf = prop_oneof![
            text,
            (1u8..9).prop_map(|i| format!("<x id=\"{}\"/>", i)),
            (1u8..9).prop_map(|i| format!("<ph id=\"{}\">&lt;br/&gt;</ph>", i)),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 1..4).prop_map(|v| v.concat()),
                (1u8..9, prop::collection::vec(inner, 0..3))
                    .prop_map(|(i, v)| format!("<g id=\"{}\">{}</g>", i, v.concat())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_unedited_round_trip(src in fragment()) {
            let opts = XmlOptions::default();
            let extracted = extract_tags_str(&src, &opts).unwrap();
            let restored = restore_tags(&extracted.plain_text, &extracted.tags, &opts);
            let expected = xml::decode_fragment(&src, &opts).unwrap();
            prop_assert_eq!(
                xml::encode_nodes(&restored, &opts),
                xml::encode_nodes(&expected, &opts)
            );
        }
    }
}
