//! Header module for the adfile library
//!
//! The header lists the contigs and libraries that records refer to by index, together with
//! the format identifier and any free-text comments. It is shared by the binary and text
//! codecs: both parse into, and serialize from, the same [`Header`].

use std::collections::HashMap;

use crate::{
    error::{Error, HeaderError, OrderError, RecordError, Result},
    location::Location,
};

/// Current format version: major 0, minor 1
pub const FORMAT_VERSION: u16 = 0x0001;

/// Format name and version of a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatId {
    /// Format name, `"AD"` or `"TAD"`
    pub name: String,
    /// Version word, major in the high byte and minor in the low byte
    pub version: u16,
}
impl FormatId {
    #[must_use]
    pub fn new(name: &str, version: u16) -> Self {
        Self {
            name: name.to_string(),
            version,
        }
    }

    #[must_use]
    pub fn major(&self) -> u8 {
        (self.version >> 8) as u8
    }

    #[must_use]
    pub fn minor(&self) -> u8 {
        self.version as u8
    }
}
impl Default for FormatId {
    fn default() -> Self {
        Self::new("", FORMAT_VERSION)
    }
}

/// A reference sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    pub name: String,
    pub length: u32,
    /// Free-text attributes such as `M5:<checksum>` or `UR:<url>`
    pub attributes: Vec<String>,
}
impl Contig {
    #[must_use]
    pub fn new(name: impl Into<String>, length: u32) -> Self {
        Self {
            name: name.into(),
            length,
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// A depth-counting unit tied to a sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub id: String,
    pub sample: String,
    /// Free-text attributes such as `LB:<library>` or `RG:<read group>`
    pub attributes: Vec<String>,
}
impl Library {
    #[must_use]
    pub fn new(id: impl Into<String>, sample: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sample: sample.into(),
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Rejects values that would split or end a tab-delimited header line
fn check_field(field: &'static str, value: &str) -> Result<()> {
    if value.contains(['\t', '\n', '\r']) {
        Err(HeaderError::InvalidValue {
            field,
            value: value.to_string(),
        }
        .into())
    } else {
        Ok(())
    }
}

/// Attributes must be non-empty single fields
fn check_attributes(attributes: &[String]) -> Result<()> {
    for attribute in attributes {
        if attribute.is_empty() {
            return Err(HeaderError::InvalidValue {
                field: "attribute",
                value: String::new(),
            }
            .into());
        }
        check_field("attribute", attribute)?;
    }
    Ok(())
}

/// Splits a tab-separated attribute string, dropping empty fields
#[must_use]
pub fn split_attributes(attributes: &str) -> Vec<String> {
    attributes
        .split('\t')
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

/// Contigs, libraries and format metadata of an allele-depth stream
///
/// Entries are append-only until [`Header::finalize`] is called; their declaration order
/// fixes the indices that records use.
#[derive(Debug, Clone, Default)]
pub struct Header {
    id: FormatId,
    contigs: Vec<Contig>,
    libraries: Vec<Library>,
    comments: Vec<String>,
    contig_lookup: HashMap<String, usize>,
    library_lookup: HashMap<String, usize>,
    finalized: bool,
}
impl Header {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn check_open(&self) -> Result<()> {
        if self.finalized {
            Err(OrderError::HeaderFinalized.into())
        } else {
            Ok(())
        }
    }

    /// Appends a contig, returning its index
    pub fn add_contig(&mut self, contig: Contig) -> Result<usize> {
        self.check_open()?;
        if contig.length == 0 {
            return Err(HeaderError::InvalidValue {
                field: "length",
                value: contig.length.to_string(),
            }
            .into());
        }
        check_field("name", &contig.name)?;
        check_attributes(&contig.attributes)?;
        if self.contig_lookup.contains_key(&contig.name) {
            return Err(HeaderError::DuplicateContig(contig.name).into());
        }
        let index = self.contigs.len();
        self.contig_lookup.insert(contig.name.clone(), index);
        self.contigs.push(contig);
        Ok(index)
    }

    /// Appends a library, returning its index
    pub fn add_library(&mut self, library: Library) -> Result<usize> {
        self.check_open()?;
        check_field("id", &library.id)?;
        check_field("sample", &library.sample)?;
        check_attributes(&library.attributes)?;
        if self.library_lookup.contains_key(&library.id) {
            return Err(HeaderError::DuplicateLibrary(library.id).into());
        }
        let index = self.libraries.len();
        self.library_lookup.insert(library.id.clone(), index);
        self.libraries.push(library);
        Ok(index)
    }

    /// Appends a free-text comment
    ///
    /// Comments may hold tabs but not line breaks.
    pub fn add_comment(&mut self, comment: impl Into<String>) -> Result<()> {
        self.check_open()?;
        let comment = comment.into();
        if comment.contains(['\n', '\r']) {
            return Err(HeaderError::InvalidValue {
                field: "comment",
                value: comment,
            }
            .into());
        }
        self.comments.push(comment);
        Ok(())
    }

    /// Freezes the contig and library lists
    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    #[must_use]
    pub fn id(&self) -> &FormatId {
        &self.id
    }

    pub fn set_id(&mut self, id: FormatId) {
        self.id = id;
    }

    #[must_use]
    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    #[must_use]
    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    #[must_use]
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    #[must_use]
    pub fn contig(&self, index: usize) -> Option<&Contig> {
        self.contigs.get(index)
    }

    #[must_use]
    pub fn library(&self, index: usize) -> Option<&Library> {
        self.libraries.get(index)
    }

    #[must_use]
    pub fn num_libraries(&self) -> usize {
        self.libraries.len()
    }

    /// Index of the contig named `name`
    pub fn contig_index(&self, name: &str) -> Result<usize> {
        self.contig_lookup
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownContig(name.to_string()))
    }

    /// Checks that `location` lies inside a declared contig
    ///
    /// An undeclared contig is reported as [`Error::UnknownContig`] naming the index, a
    /// position at or past the contig length as a corrupt record.
    pub fn check_location(&self, location: Location) -> Result<()> {
        let (contig, position) = location.decompose();
        let length = self
            .contig(contig as usize)
            .map(|contig| contig.length)
            .ok_or_else(|| Error::UnknownContig(format!("#{contig}")))?;
        if position < length {
            Ok(())
        } else {
            Err(RecordError::PositionOutOfRange { position, length }.into())
        }
    }

    /// Index of the library with id `id`
    pub fn library_index(&self, id: &str) -> Result<usize> {
        self.library_lookup
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownLibrary(id.to_string()))
    }
}
impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.contigs == other.contigs
            && self.libraries == other.libraries
            && self.comments == other.comments
    }
}
impl Eq for Header {}
