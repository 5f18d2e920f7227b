use std::path::Path;

use crate::config::SegmentOptions;
use crate::docx::DocxAdapter;
use crate::xliff::XliffAdapter;
use crate::xlsx::XlsxAdapter;

use super::SegmentAdapter;

/// Ordered set of adapters; the first one that supports a file wins.
///
/// # Examples
///
/// ```rust
/// use longan::adapter::{AdapterRegistry, DocumentFormat};
/// use longan::config::SegmentOptions;
///
/// let registry = AdapterRegistry::with_default_adapters(SegmentOptions::default());
/// let adapter = registry.for_file_name("Report.DOCX", None).unwrap();
/// assert_eq!(adapter.format(), DocumentFormat::Docx);
/// ```
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn SegmentAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the docx, xlsx and xliff adapters.
    pub fn with_default_adapters(options: SegmentOptions) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(DocxAdapter::new(options.clone())));
        registry.register(Box::new(XlsxAdapter::new(options.clone())));
        registry.register(Box::new(XliffAdapter::new(options)));
        registry
    }

    /// Add an adapter after the ones already registered.
    pub fn register(&mut self, adapter: Box<dyn SegmentAdapter>) {
        self.adapters.push(adapter);
    }

    /// First adapter that supports the MIME type or extension.
    pub fn find(&self, mime: Option<&str>, extension: &str) -> Option<&dyn SegmentAdapter> {
        let found = self
            .adapters
            .iter()
            .find(|a| a.supports(mime, extension))
            .map(|a| a.as_ref());
        if found.is_none() {
            log::debug!("no adapter for mime {:?}, extension {:?}", mime, extension);
        }
        found
    }

    /// First adapter that supports a file, judged by its name's extension.
    pub fn for_file_name(
        &self,
        file_name: &str,
        mime: Option<&str>,
    ) -> Option<&dyn SegmentAdapter> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        self.find(mime, extension)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{DOCX_MIME, DocumentFormat, XLSX_MIME};
    use crate::error::{Error, Result};
    use crate::model::{ExportRequest, ParsedDocument};

    struct Fake;

    impl SegmentAdapter for Fake {
        fn format(&self) -> DocumentFormat {
            DocumentFormat::Docx
        }

        fn supports(&self, _mime: Option<&str>, extension: &str) -> bool {
            extension == "fake"
        }

        fn parse(&self, _bytes: &[u8]) -> Result<ParsedDocument> {
            Err(Error::Content("fake".to_string()))
        }

        fn export(&self, _request: &ExportRequest) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_default_adapters() {
        let registry = AdapterRegistry::with_default_adapters(SegmentOptions::default());
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.find(Some(XLSX_MIME), "").map(|a| a.format()),
            Some(DocumentFormat::Xlsx)
        );
        assert_eq!(registry.find(None, ".xlf").map(|a| a.format()), Some(DocumentFormat::Xliff));
        assert_eq!(
            registry.find(Some(DOCX_MIME), "zip").map(|a| a.format()),
            Some(DocumentFormat::Docx)
        );
        assert!(registry.find(Some("application/pdf"), "pdf").is_none());
    }

    #[test]
    fn test_for_file_name() {
        let registry = AdapterRegistry::with_default_adapters(SegmentOptions::default());
        assert_eq!(
            registry.for_file_name("dir/strings.en.XLIFF", None).map(|a| a.format()),
            Some(DocumentFormat::Xliff)
        );
        assert!(registry.for_file_name("README", None).is_none());
    }

    #[test]
    fn test_register_custom_adapter() {
        let mut registry = AdapterRegistry::new();
        assert!(registry.is_empty());
        registry.register(Box::new(Fake));
        assert!(registry.find(None, "fake").is_some());
        assert!(registry.find(None, "docx").is_none());
    }
}
