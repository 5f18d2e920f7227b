//! ZIP container access.
//!
//! A [`Container`] holds every entry of a package in memory, in archive
//! order, so a document can be edited part by part and written back with
//! untouched parts byte-identical to the source.
//!
//! # Example
//!
//! ```rust,no_run
//! use longan::container::Container;
//! use longan::xml::XmlOptions;
//!
//! let data = std::fs::read("document.docx")?;
//! let mut container = Container::open(&data)?;
//! let opts = XmlOptions::default();
//! let doc = container.read_xml("word/document.xml", &opts)?;
//! container.write_xml("word/document.xml", &doc, &opts);
//! let bytes = container.serialize()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod rels;

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::xml::{self, XmlDocument, XmlOptions};

pub use rels::{Relationship, Relationships, resolve_target};

/// A single archive entry held in memory.
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    stored: bool,
    is_dir: bool,
}

/// An in-memory ZIP package with named-part access.
#[derive(Debug, Clone)]
pub struct Container {
    entries: Vec<Entry>,
}

impl Container {
    /// Read every entry of a ZIP archive.
    ///
    /// The input buffer is only borrowed; nothing is written back to it.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();
            let is_dir = file.is_dir();
            let stored = file.compression() == CompressionMethod::Stored;

            let mut data = Vec::with_capacity(file.size() as usize);
            if !is_dir {
                file.read_to_end(&mut data)
                    .map_err(|e| Error::structure(name.clone(), e))?;
            }

            entries.push(Entry {
                name,
                data,
                stored,
                is_dir,
            });
        }

        log::debug!("opened container with {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Number of entries, directories included.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the archive has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of all file parts, in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.name.as_str())
    }

    /// Check whether a part exists.
    #[inline]
    pub fn has_part(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Get the bytes of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.find(name).map(|i| self.entries[i].data.as_slice())
    }

    /// Get the bytes of a part that must exist.
    pub fn require_part(&self, name: &str) -> Result<&[u8]> {
        self.part(name)
            .ok_or_else(|| Error::missing_part(normalize(name)))
    }

    /// Replace the bytes of a part, or append a new part.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.find(name) {
            Some(i) => self.entries[i].data = data,
            None => self.entries.push(Entry {
                name: normalize(name).to_string(),
                data,
                stored: false,
                is_dir: false,
            }),
        }
    }

    /// Decode a mandatory XML part.
    pub fn read_xml(&self, name: &str, options: &XmlOptions) -> Result<XmlDocument> {
        let bytes = self.require_part(name)?;
        xml::decode(bytes, options).map_err(|e| Error::xml(normalize(name), e))
    }

    /// Decode an optional XML part.
    pub fn read_optional_xml(
        &self,
        name: &str,
        options: &XmlOptions,
    ) -> Result<Option<XmlDocument>> {
        match self.part(name) {
            Some(bytes) => xml::decode(bytes, options)
                .map(Some)
                .map_err(|e| Error::xml(normalize(name), e)),
            None => Ok(None),
        }
    }

    /// Encode a document into a part.
    pub fn write_xml(&mut self, name: &str, doc: &XmlDocument, options: &XmlOptions) {
        self.set_part(name, xml::encode(doc, options));
    }

    /// Write the package back to ZIP bytes.
    ///
    /// Entries keep their original order; stored entries stay stored and
    /// everything else is deflated.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let method = if entry.stored {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default().compression_method(method);

            if entry.is_dir {
                writer.add_directory(entry.name.as_str(), options)?;
                continue;
            }

            writer.start_file(entry.name.as_str(), options)?;
            writer
                .write_all(&entry.data)
                .map_err(|e| Error::structure(entry.name.clone(), e))?;
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }

    fn find(&self, name: &str) -> Option<usize> {
        let name = normalize(name);
        self.entries
            .iter()
            .position(|e| !e.is_dir && e.name == name)
    }
}

/// Strip a leading slash from a part name.
#[inline]
fn normalize(name: &str) -> &str {
    name.strip_prefix('/').unwrap_or(name)
}
