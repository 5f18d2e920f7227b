//! OPC relationship parts.
//!
//! A `.rels` part lists the relationships from one source part (or from the
//! package itself) to its targets. Targets are relative to the source
//! part's directory unless they start with `/`.
use crate::error::{Error, Result};
use crate::xml::{self, XmlOptions};

use super::Container;

/// Relationship type suffix of the package's main document.
pub const OFFICE_DOCUMENT: &str = "/officeDocument";
/// Relationship type suffix of a workbook worksheet.
pub const WORKSHEET: &str = "/worksheet";
/// Relationship type suffix of the shared string table.
pub const SHARED_STRINGS: &str = "/sharedStrings";

/// A single relationship from a source part to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target reference as written in the part
    pub target: String,
    /// Whether the target lives outside the package
    pub external: bool,
}

impl Relationship {
    /// Check whether the type URI ends with `suffix`.
    ///
    /// Transitional and strict OOXML use different type URI bases but the
    /// same final segment.
    #[inline]
    pub fn is_type(&self, suffix: &str) -> bool {
        self.rel_type.ends_with(suffix)
    }
}

/// Relationships of one source part, in document order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    source: String,
    rels: Vec<Relationship>,
}

impl Relationships {
    /// Parse a `.rels` part belonging to `source` (empty for the package).
    pub fn parse(
        source: &str,
        bytes: &[u8],
        options: &XmlOptions,
    ) -> std::result::Result<Self, xml::XmlError> {
        let doc = xml::decode(bytes, options)?;
        let rels = doc
            .root
            .children_named("Relationship")
            .filter_map(|e| {
                let id = e.attr("Id")?;
                let target = e.attr("Target")?;
                Some(Relationship {
                    id: id.to_string(),
                    rel_type: e.attr("Type").unwrap_or_default().to_string(),
                    target: target.to_string(),
                    external: e
                        .attr("TargetMode")
                        .is_some_and(|m| m.eq_ignore_ascii_case("External")),
                })
            })
            .collect();

        Ok(Self {
            source: source.trim_start_matches('/').to_string(),
            rels,
        })
    }

    /// Load the relationships of `source` from a container.
    ///
    /// A source without a `.rels` part has no relationships.
    pub fn load(container: &Container, source: &str, options: &XmlOptions) -> Result<Self> {
        let rels_name = rels_part_name(source);
        match container.part(&rels_name) {
            Some(bytes) => {
                Self::parse(source, bytes, options).map_err(|e| Error::xml(rels_name, e))
            },
            None => Ok(Self {
                source: source.trim_start_matches('/').to_string(),
                rels: Vec::new(),
            }),
        }
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.id == id)
    }

    /// First relationship whose type ends with `suffix`.
    pub fn by_type(&self, suffix: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.is_type(suffix))
    }

    /// Resolve the part name an internal relationship points at.
    pub fn target_part(&self, id: &str) -> Option<String> {
        let rel = self.get(id)?;
        if rel.external {
            return None;
        }
        Some(resolve_target(&self.source, &rel.target))
    }

    /// Iterate over all relationships.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }
}

/// Name of the `.rels` part for `source`.
///
/// `xl/workbook.xml` maps to `xl/_rels/workbook.xml.rels`; the package
/// itself (empty source) maps to `_rels/.rels`.
pub fn rels_part_name(source: &str) -> String {
    let source = source.trim_start_matches('/');
    match source.rfind('/') {
        Some(pos) => format!("{}/_rels/{}.rels", &source[..pos], &source[pos + 1..]),
        None if source.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{}.rels", source),
    }
}

/// Resolve a relationship target against its source part.
///
/// Absolute targets are taken from the package root; relative targets are
/// joined to the source part's directory and `.`/`..` segments collapsed.
/// The result never has a leading slash.
pub fn resolve_target(source: &str, target: &str) -> String {
    let joined = if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        let source = source.trim_start_matches('/');
        match source.rfind('/') {
            Some(pos) => format!("{}/{}", &source[..pos], target),
            None => target.to_string(),
        }
    };

    let mut parts: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            _ => parts.push(segment),
        }
    }
    parts.join("/")
}
