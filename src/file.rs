//! Stream facade
//!
//! [`AdFile`] ties a codec, a header and a transport together. The codec is chosen once from
//! a [`Scheme`]; the transport can be swapped with [`AdFile::attach`], which also resets the
//! location cursor so that a stream can be read and then rewritten elsewhere.
//!
//! The header lifecycle is strict: contigs and libraries are added first, the header is then
//! written or read exactly once per attached transport, and only then can records flow.

use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
    str::FromStr,
};

use log::debug;

use crate::{
    ad::AD_NAME,
    codec::{Codec, Format},
    error::{Error, OrderError, Result, StreamError},
    header::{split_attributes, Contig, FormatId, Header, Library, FORMAT_VERSION},
    location::LocationCursor,
    record::AlleleDepths,
    tad::TAD_NAME,
};

/// Representation of an allele-depth stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Binary representation, `"ad:"`
    #[default]
    Ad,
    /// Tab-delimited text representation, `"tad:"`
    Tad,
}
impl Scheme {
    /// The prefix naming this scheme
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Ad => "ad:",
            Self::Tad => "tad:",
        }
    }

    /// The format name recorded in headers of this scheme
    #[must_use]
    pub fn format_name(self) -> &'static str {
        match self {
            Self::Ad => AD_NAME,
            Self::Tad => TAD_NAME,
        }
    }

    /// Splits a `"<scheme>:<path>"` string into its scheme and (possibly empty) path
    pub fn split(value: &str) -> Result<(Self, &str)> {
        [Self::Ad, Self::Tad]
            .into_iter()
            .find_map(|scheme| value.strip_prefix(scheme.prefix()).map(|path| (scheme, path)))
            .ok_or_else(|| StreamError::UnknownScheme(value.to_string()).into())
    }
}
impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ad" | "ad:" => Ok(Self::Ad),
            "tad" | "tad:" => Ok(Self::Tad),
            _ => Err(StreamError::UnknownScheme(s.to_string()).into()),
        }
    }
}
impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Access mode of an allele-depth stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Read,
    Write,
    #[default]
    ReadWrite,
}
impl Mode {
    #[must_use]
    pub fn can_read(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    #[must_use]
    pub fn can_write(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}
impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "r" => Ok(Self::Read),
            "w" => Ok(Self::Write),
            "rw" | "wr" => Ok(Self::ReadWrite),
            _ => Err(StreamError::UnknownMode(s.to_string()).into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AdFileBuilder {
    scheme: Option<Scheme>,
    mode: Option<Mode>,
}
impl AdFileBuilder {
    #[must_use]
    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = Some(scheme);
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn build<T>(self) -> AdFile<T> {
        AdFile::new(
            self.scheme.unwrap_or_default(),
            self.mode.unwrap_or_default(),
        )
    }
}

/// An allele-depth stream in either representation
///
/// # Examples
///
/// ```
/// use adfile::{AdFile, AlleleDepths, Mode, Scheme, color_of, make_location};
/// use std::io::Cursor;
///
/// fn main() -> adfile::Result<()> {
///     let mut file = AdFile::new(Scheme::Tad, Mode::ReadWrite);
///     file.add_contig("chr1", 1000, "")?;
///     file.add_library("lib1", "sample1", "")?;
///
///     file.attach(Cursor::new(Vec::new()));
///     file.write_header()?;
///     let color = color_of("AG").unwrap();
///     let record = AlleleDepths::new(make_location(0, 41), color, 1, vec![12, 3])?;
///     file.write(&record)?;
///
///     let written = file.detach().unwrap().into_inner();
///     assert!(written.ends_with(b"chr1\t42\tAG\t12,3\n"));
///
///     file.attach(Cursor::new(written));
///     file.read_header()?;
///     let mut read = AlleleDepths::default();
///     assert!(file.read(&mut read)?);
///     assert_eq!(read, record);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct AdFile<T> {
    /// Codec selected by the scheme
    format: Format,

    /// Allowed operations
    mode: Mode,

    /// Contigs and libraries
    header: Header,

    /// Attached byte stream
    transport: Option<T>,

    /// Last location transferred on the attached stream
    cursor: LocationCursor,

    /// Whether the header was read from the attached stream
    header_read: bool,

    /// Whether the header was written to the attached stream
    header_written: bool,
}
impl<T> AdFile<T> {
    #[must_use]
    pub fn new(scheme: Scheme, mode: Mode) -> Self {
        Self {
            format: Format::from(scheme),
            mode,
            header: Header::new(),
            transport: None,
            cursor: LocationCursor::new(),
            header_read: false,
            header_written: false,
        }
    }

    /// Declares a contig, returning its index
    ///
    /// `attributes` is a tab-separated list of free-text fields, empty for none.
    pub fn add_contig(&mut self, name: &str, length: u32, attributes: &str) -> Result<usize> {
        self.header
            .add_contig(Contig::new(name, length).with_attributes(split_attributes(attributes)))
    }

    /// Declares a library, returning its index
    ///
    /// `attributes` is a tab-separated list of free-text fields, empty for none.
    pub fn add_library(&mut self, id: &str, sample: &str, attributes: &str) -> Result<usize> {
        self.header
            .add_library(Library::new(id, sample).with_attributes(split_attributes(attributes)))
    }

    /// Adds a free-text comment to the header
    pub fn add_comment(&mut self, comment: &str) -> Result<()> {
        self.header.add_comment(comment)
    }

    /// Binds a new transport, returning the previous one
    ///
    /// The location cursor is reset and the header must be transferred again before any
    /// record.
    pub fn attach(&mut self, transport: T) -> Option<T> {
        debug!("attaching {} transport", self.scheme());
        self.reset();
        self.transport.replace(transport)
    }

    /// Releases the transport without any finalization
    pub fn detach(&mut self) -> Option<T> {
        self.reset();
        self.transport.take()
    }

    fn reset(&mut self) {
        self.cursor.reset();
        self.header_read = false;
        self.header_written = false;
    }

    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.format.scheme()
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    #[must_use]
    pub fn contigs(&self) -> &[Contig] {
        self.header.contigs()
    }

    #[must_use]
    pub fn contig(&self, index: usize) -> Option<&Contig> {
        self.header.contig(index)
    }

    #[must_use]
    pub fn libraries(&self) -> &[Library] {
        self.header.libraries()
    }

    #[must_use]
    pub fn library(&self, index: usize) -> Option<&Library> {
        self.header.library(index)
    }

    pub fn contig_index(&self, name: &str) -> Result<usize> {
        self.header.contig_index(name)
    }

    pub fn library_index(&self, id: &str) -> Result<usize> {
        self.header.library_index(id)
    }

    /// The last location transferred on the attached stream
    #[must_use]
    pub fn cursor(&self) -> LocationCursor {
        self.cursor
    }

    fn check_header_pending(done: bool) -> Result<()> {
        if done {
            Err(OrderError::HeaderAlreadyTransferred.into())
        } else {
            Ok(())
        }
    }

    fn check_header_done(done: bool) -> Result<()> {
        if done {
            Ok(())
        } else {
            Err(OrderError::HeaderNotTransferred.into())
        }
    }

    fn check_readable(&self) -> Result<()> {
        if self.mode.can_read() {
            Ok(())
        } else {
            Err(StreamError::NotReadable.into())
        }
    }

    fn check_writable(&self) -> Result<()> {
        if self.mode.can_write() {
            Ok(())
        } else {
            Err(StreamError::NotWritable.into())
        }
    }
}

impl<T: Write> AdFile<T> {
    /// Writes the header and finalizes it
    ///
    /// Records written afterwards are delta-coded from a fresh cursor.
    pub fn write_header(&mut self) -> Result<()> {
        self.check_writable()?;
        Self::check_header_pending(self.header_written)?;
        let transport = self.transport.as_mut().ok_or(StreamError::Detached)?;
        self.header.set_id(FormatId::new(
            self.format.scheme().format_name(),
            FORMAT_VERSION,
        ));
        self.format.write_header(transport, &self.header)?;
        self.header.finalize();
        self.header_written = true;
        self.cursor.reset();
        Ok(())
    }

    /// Writes one record
    pub fn write(&mut self, record: &AlleleDepths) -> Result<()> {
        self.check_writable()?;
        Self::check_header_done(self.header_written)?;
        let transport = self.transport.as_mut().ok_or(StreamError::Detached)?;
        self.format
            .write_record(transport, &self.header, &mut self.cursor, record)
    }

    /// Flushes the attached transport
    pub fn flush(&mut self) -> Result<()> {
        if let Some(transport) = self.transport.as_mut() {
            transport.flush()?;
        }
        Ok(())
    }
}

impl<T: BufRead> AdFile<T> {
    /// Reads the header, replacing any contigs and libraries declared so far
    ///
    /// On a read-write transport this may follow [`AdFile::write_header`], in which case
    /// reading starts over from a fresh cursor.
    pub fn read_header(&mut self) -> Result<()> {
        self.check_readable()?;
        Self::check_header_pending(self.header_read)?;
        let transport = self.transport.as_mut().ok_or(StreamError::Detached)?;
        self.header = self.format.read_header(transport)?;
        self.header_read = true;
        self.cursor.reset();
        Ok(())
    }

    /// Reads the next record into `record`
    ///
    /// Returns `Ok(false)` at a clean end of stream.
    pub fn read(&mut self, record: &mut AlleleDepths) -> Result<bool> {
        self.check_readable()?;
        Self::check_header_done(self.header_read)?;
        let transport = self.transport.as_mut().ok_or(StreamError::Detached)?;
        self.format
            .read_record(transport, &self.header, &mut self.cursor, record)
    }

    /// Reads the next record into a new allocation
    pub fn next_record(&mut self) -> Option<Result<AlleleDepths>> {
        let mut record = AlleleDepths::default();
        match self.read(&mut record) {
            Ok(true) => Some(Ok(record)),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }

    /// Iterates over the remaining records
    pub fn records(&mut self) -> Records<'_, T> {
        Records { file: self }
    }
}

impl AdFile<BufReader<File>> {
    /// Opens a file for reading
    pub fn open<P: AsRef<Path>>(scheme: Scheme, path: P) -> Result<Self> {
        let mut file = Self::new(scheme, Mode::Read);
        file.attach(File::open(path).map(BufReader::new)?);
        Ok(file)
    }
}

impl AdFile<BufWriter<File>> {
    /// Creates (or truncates) a file for writing
    pub fn create<P: AsRef<Path>>(scheme: Scheme, path: P) -> Result<Self> {
        let mut file = Self::new(scheme, Mode::Write);
        file.attach(File::create(path).map(BufWriter::new)?);
        Ok(file)
    }
}

/// Iterator over the records of an [`AdFile`]
pub struct Records<'a, T> {
    file: &'a mut AdFile<T>,
}
impl<T: BufRead> Iterator for Records<'_, T> {
    type Item = Result<AlleleDepths>;

    fn next(&mut self) -> Option<Self::Item> {
        self.file.next_record()
    }
}
