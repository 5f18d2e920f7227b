//! XLIFF schema version detection.
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::xml::Element;

const NS_V1: &str = "urn:oasis:names:tc:xliff:document:1.";
const NS_V2: &str = "urn:oasis:names:tc:xliff:document:2.";

/// Schema family of an XLIFF document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum XliffVersion {
    /// XLIFF 1.0, 1.1 and 1.2
    V1,
    /// XLIFF 2.0, 2.1 and 2.2
    V2,
}

impl XliffVersion {
    /// Map a `version` attribute value to its schema family.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value.trim() {
            "1.0" | "1.1" | "1.2" => Some(XliffVersion::V1),
            "2.0" | "2.1" | "2.2" => Some(XliffVersion::V2),
            _ => None,
        }
    }

    /// Map a namespace URI to its schema family.
    pub fn from_namespace(uri: &str) -> Option<Self> {
        if uri.starts_with(NS_V1) {
            Some(XliffVersion::V1)
        } else if uri.starts_with(NS_V2) {
            Some(XliffVersion::V2)
        } else {
            None
        }
    }
}

/// Detect the version of an `xliff` root element.
///
/// Returns the family and the version string as written (or implied by
/// the namespace).
pub(crate) fn detect(root: &Element, part: &str) -> Result<(XliffVersion, String)> {
    if root.local_name() != "xliff" {
        return Err(Error::structure(
            part,
            format!("root element is <{}>, expected <xliff>", root.name),
        ));
    }

    if let Some(raw) = root.attr("version") {
        return match XliffVersion::from_attr(raw) {
            Some(version) => Ok((version, raw.trim().to_string())),
            None => Err(Error::structure(part, format!("unsupported XLIFF version {:?}", raw))),
        };
    }

    let by_namespace = root
        .attributes
        .iter()
        .filter(|(k, _)| k == "xmlns" || k.starts_with("xmlns:"))
        .find_map(|(_, uri)| XliffVersion::from_namespace(uri).map(|v| (v, uri)));
    match by_namespace {
        Some((version, uri)) => {
            let raw = uri.rsplit(':').next().unwrap_or_default().to_string();
            Ok((version, raw))
        },
        None => Err(Error::structure(part, "cannot determine XLIFF version")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_detect_from_attribute() {
        let root = Element::new("xliff").with_attr("version", "1.2");
        assert_eq!(detect(&root, "doc").unwrap(), (XliffVersion::V1, "1.2".to_string()));
        let root = Element::new("xliff").with_attr("version", "2.1");
        assert_eq!(detect(&root, "doc").unwrap().0, XliffVersion::V2);
    }

    #[test]
    fn test_detect_from_namespace() {
        let root =
            Element::new("xliff").with_attr("xmlns", "urn:oasis:names:tc:xliff:document:2.0");
        assert_eq!(detect(&root, "doc").unwrap(), (XliffVersion::V2, "2.0".to_string()));
    }

    #[test]
    fn test_unknown_version() {
        let err = detect(&Element::new("xliff").with_attr("version", "3.0"), "doc").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structure);
        assert!(detect(&Element::new("xliff"), "doc").is_err());
        assert!(detect(&Element::new("html").with_attr("version", "1.2"), "doc").is_err());
    }
}
