/// Custom Result type for adfile operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the adfile library, encompassing all possible error cases
/// that can occur while encoding or decoding allele-depth streams.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An NTF8 integer could not be decoded
    #[error("Malformed integer: {0}")]
    MalformedInteger(#[from] IntegerError),

    /// A record does not match its expected layout
    #[error("Corrupt record: {0}")]
    CorruptRecord(#[from] RecordError),

    /// A record or lookup references a contig that the header does not declare
    #[error("Unknown contig: {0}")]
    UnknownContig(String),

    /// A lookup references a library that the header does not declare
    #[error("Unknown library: {0}")]
    UnknownLibrary(String),

    /// Header and record operations were issued out of order
    #[error("Header order violation: {0}")]
    HeaderOrderViolation(#[from] OrderError),

    /// Errors related to header parsing and validation
    #[error("Error processing header: {0}")]
    HeaderError(#[from] HeaderError),

    /// Errors related to the stream facade configuration
    #[error("Error with stream: {0}")]
    StreamError(#[from] StreamError),

    /// Standard I/O errors
    #[error("Error with IO: {0}")]
    IoError(#[from] std::io::Error),

    /// UTF-8 conversion errors
    #[error("Error with UTF8: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
}
impl Error {
    /// Checks if the error signals a structurally broken record
    #[must_use]
    pub fn is_corrupt_record(&self) -> bool {
        matches!(self, Self::CorruptRecord(_))
    }

    /// Checks if the error was raised by the header lifecycle checks
    #[must_use]
    pub fn is_order_violation(&self) -> bool {
        matches!(self, Self::HeaderOrderViolation(_))
    }
}

/// Errors raised by the NTF8 integer codec
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerError {
    /// No bytes were available where an integer was expected
    #[error("No bytes available")]
    Empty,

    /// The input ended before the length announced by the prefix byte
    ///
    /// # Fields
    /// * `expected` - The number of bytes implied by the prefix
    /// * `found` - The number of bytes that were available
    #[error("Expected {expected} bytes but only {found} were available")]
    Truncated { expected: usize, found: usize },

    /// The decoded value does not fit the requested integer width
    #[error("Value does not fit in {bits} bits")]
    OutOfRange { bits: u32 },
}

/// Errors describing a structurally invalid allele-depth record
#[derive(thiserror::Error, Debug)]
pub enum RecordError {
    /// The depth array does not match `alleles * libraries`
    #[error("Record holds {got} depths, expected {expected}")]
    DataLength { expected: usize, got: usize },

    /// The record was built for a different number of libraries than the header declares
    #[error("Record has {got} libraries but the header declares {expected}")]
    LibraryCount { expected: usize, got: usize },

    /// The stream ended in the middle of a record
    #[error("Stream ended inside a record")]
    Truncated,

    /// A nested integer could not be decoded
    #[error("Invalid integer field: {0}")]
    Integer(IntegerError),

    /// A relative location was found before any absolute one
    #[error("Relative location without a preceding record")]
    MissingAnchor,

    /// A location cannot be represented in the binary encoding
    #[error("Location {0:#x} is out of the encodable range")]
    LocationOutOfRange(u64),

    /// A relative step left the contig of the preceding record
    #[error("Relative location step crosses a contig boundary")]
    ContigOverflow,

    /// A decoded location names a contig the header does not declare
    #[error("Contig index {0} is not declared in the header")]
    ContigOutOfRange(u32),

    /// A position lies past the end of its contig
    #[error("Position {position} is past the end of a contig of length {length}")]
    PositionOutOfRange { position: u32, length: u32 },

    /// A text record is missing a mandatory column
    #[error("Missing column: {0}")]
    MissingColumn(&'static str),

    /// A text record holds a malformed number
    #[error("Invalid number in column {column}: {value:?}")]
    InvalidNumber { column: &'static str, value: String },

    /// A 1-based position of zero was found
    #[error("Positions are 1-based, found 0")]
    ZeroPosition,

    /// The symbol column does not name a known allele arrangement
    #[error("Unknown allele symbols: {0:?}")]
    UnknownSymbols(String),

    /// A text record holds the wrong number of library columns
    #[error("Found {got} library columns, expected {expected}")]
    LibraryColumns { expected: usize, got: usize },

    /// A library column holds the wrong number of depths
    #[error("Library column {library} holds {got} depths, expected {expected}")]
    AlleleColumns {
        library: usize,
        expected: usize,
        got: usize,
    },

    /// A header line was found in the record section
    #[error("Unexpected header line in record section")]
    UnexpectedHeaderLine,
}
impl From<IntegerError> for RecordError {
    fn from(err: IntegerError) -> Self {
        match err {
            IntegerError::Empty | IntegerError::Truncated { .. } => Self::Truncated,
            IntegerError::OutOfRange { .. } => Self::Integer(err),
        }
    }
}

/// Errors raised when header and record operations are issued out of order
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderError {
    /// Contigs, libraries and comments can only be added before the header is finalized
    #[error("The header is finalized and can no longer be modified")]
    HeaderFinalized,

    /// The header was already transferred on the attached stream
    #[error("The header was already transferred on this stream")]
    HeaderAlreadyTransferred,

    /// Records can only be transferred after the header
    #[error("Records cannot be transferred before the header")]
    HeaderNotTransferred,
}

/// Errors specific to processing and validating headers
#[derive(thiserror::Error, Debug)]
pub enum HeaderError {
    /// The binary format tag does not match the expected value
    #[error("Invalid format tag: {0:?}")]
    InvalidTag([u8; 2]),

    /// The format version is not supported
    #[error("Invalid format version: {0:#06x}")]
    InvalidVersion(u16),

    /// A header line is missing a mandatory field
    #[error("Missing {field} field in {line} line")]
    MissingField {
        line: &'static str,
        field: &'static str,
    },

    /// A header field holds a malformed value
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    /// Two contigs share a name
    #[error("Duplicate contig: {0}")]
    DuplicateContig(String),

    /// Two libraries share an id
    #[error("Duplicate library: {0}")]
    DuplicateLibrary(String),

    /// A length or count does not fit the binary encoding
    #[error("Value {0} does not fit the header encoding")]
    Overflow(usize),
}

/// Errors related to the configuration and state of the stream facade
#[derive(thiserror::Error, Debug)]
pub enum StreamError {
    /// The scheme string does not name a known format
    #[error("Unknown scheme: {0:?} - expecting \"ad:\" or \"tad:\"")]
    UnknownScheme(String),

    /// The access mode string is not recognised
    #[error("Unknown access mode: {0:?}")]
    UnknownMode(String),

    /// A read operation was attempted on a write-only stream
    #[error("Stream was not opened for reading")]
    NotReadable,

    /// A write operation was attempted on a read-only stream
    #[error("Stream was not opened for writing")]
    NotWritable,

    /// No transport is attached
    #[error("No transport attached")]
    Detached,
}
