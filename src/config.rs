//! Configuration types for segmentation.
//!
//! Options are explicit values handed to each adapter when it is built;
//! nothing here is global.
pub use crate::xml::XmlOptions;

/// Configuration options for segment extraction and reassembly.
///
/// # Examples
///
/// ```rust
/// use longan::config::{SegmentOptions, XmlOptions};
///
/// // Create with defaults
/// let options = SegmentOptions::default();
///
/// // Or customize
/// let options = SegmentOptions::new()
///     .with_run_separator("")
///     .with_include_non_string_cells(false)
///     .with_xml(XmlOptions::new().with_expand_empty_elements(true));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentOptions {
    /// Options for every XML decode and encode call
    pub xml: XmlOptions,
    /// String placed between trimmed run texts when building a paragraph's text
    pub run_separator: String,
    /// Whether numeric, boolean, error and formula-string cells produce segments
    pub include_non_string_cells: bool,
    /// Whether localization units marked `translate="no"` are skipped
    pub skip_untranslatable_units: bool,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            xml: XmlOptions::default(),
            run_separator: " ".to_string(),
            include_non_string_cells: true,
            skip_untranslatable_units: true,
        }
    }
}

impl SegmentOptions {
    /// Create a new `SegmentOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the XML codec options.
    #[inline]
    pub fn with_xml(mut self, xml: XmlOptions) -> Self {
        self.xml = xml;
        self
    }

    /// Set the separator used to join run texts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use longan::config::SegmentOptions;
    ///
    /// let options = SegmentOptions::new().with_run_separator("");
    /// assert_eq!(options.run_separator, "");
    /// ```
    #[inline]
    pub fn with_run_separator(mut self, separator: impl Into<String>) -> Self {
        self.run_separator = separator.into();
        self
    }

    /// Set whether non-string cells produce segments.
    ///
    /// Such segments are read-only: export skips them with a warning.
    #[inline]
    pub fn with_include_non_string_cells(mut self, include: bool) -> Self {
        self.include_non_string_cells = include;
        self
    }

    /// Set whether units marked as not translatable are skipped.
    #[inline]
    pub fn with_skip_untranslatable_units(mut self, skip: bool) -> Self {
        self.skip_untranslatable_units = skip;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SegmentOptions::default();
        assert_eq!(options.run_separator, " ");
        assert!(options.include_non_string_cells);
        assert!(options.skip_untranslatable_units);
        assert!(!options.xml.trim_text);
    }

    #[test]
    fn test_builder() {
        let options = SegmentOptions::new()
            .with_run_separator("|")
            .with_include_non_string_cells(false)
            .with_skip_untranslatable_units(false)
            .with_xml(XmlOptions::new().with_declaration(false));
        assert_eq!(options.run_separator, "|");
        assert!(!options.include_non_string_cells);
        assert!(!options.skip_untranslatable_units);
        assert!(!options.xml.write_declaration);
    }
}
