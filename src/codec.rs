use std::io::{BufRead, Write};

use crate::{
    ad::BinaryCodec, error::Result, file::Scheme, header::Header, location::LocationCursor,
    record::AlleleDepths, tad::TextCodec,
};

/// Shared contract of the binary and text allele-depth codecs
///
/// The codec owns only scratch state. The header and the location cursor belong to the caller
/// and are threaded through every call, so a codec can be reused across transports.
pub trait Codec {
    /// Parses a header from the start of `reader`
    fn read_header<R: BufRead>(&mut self, reader: &mut R) -> Result<Header>;

    /// Serializes `header` to `writer`
    fn write_header<W: Write>(&mut self, writer: &mut W, header: &Header) -> Result<()>;

    /// Reads the next record into `record`
    ///
    /// Returns `Ok(false)` at a clean end of stream. On error `record` and `cursor` are left
    /// untouched.
    fn read_record<R: BufRead>(
        &mut self,
        reader: &mut R,
        header: &Header,
        cursor: &mut LocationCursor,
        record: &mut AlleleDepths,
    ) -> Result<bool>;

    /// Writes `record`, advancing `cursor` on success
    ///
    /// A record that fails validation emits no bytes.
    fn write_record<W: Write>(
        &mut self,
        writer: &mut W,
        header: &Header,
        cursor: &mut LocationCursor,
        record: &AlleleDepths,
    ) -> Result<()>;
}

/// The codec selected by a stream's scheme
#[derive(Debug)]
pub enum Format {
    Binary(BinaryCodec),
    Text(TextCodec),
}
impl Format {
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        match self {
            Self::Binary(_) => Scheme::Ad,
            Self::Text(_) => Scheme::Tad,
        }
    }
}
impl From<Scheme> for Format {
    fn from(scheme: Scheme) -> Self {
        match scheme {
            Scheme::Ad => Self::Binary(BinaryCodec::default()),
            Scheme::Tad => Self::Text(TextCodec::default()),
        }
    }
}
impl Codec for Format {
    fn read_header<R: BufRead>(&mut self, reader: &mut R) -> Result<Header> {
        match self {
            Self::Binary(codec) => codec.read_header(reader),
            Self::Text(codec) => codec.read_header(reader),
        }
    }

    fn write_header<W: Write>(&mut self, writer: &mut W, header: &Header) -> Result<()> {
        match self {
            Self::Binary(codec) => codec.write_header(writer, header),
            Self::Text(codec) => codec.write_header(writer, header),
        }
    }

    fn read_record<R: BufRead>(
        &mut self,
        reader: &mut R,
        header: &Header,
        cursor: &mut LocationCursor,
        record: &mut AlleleDepths,
    ) -> Result<bool> {
        match self {
            Self::Binary(codec) => codec.read_record(reader, header, cursor, record),
            Self::Text(codec) => codec.read_record(reader, header, cursor, record),
        }
    }

    fn write_record<W: Write>(
        &mut self,
        writer: &mut W,
        header: &Header,
        cursor: &mut LocationCursor,
        record: &AlleleDepths,
    ) -> Result<()> {
        match self {
            Self::Binary(codec) => codec.write_record(writer, header, cursor, record),
            Self::Text(codec) => codec.write_record(writer, header, cursor, record),
        }
    }
}
