//! Binary header serialization
//!
//! The fixed part of the header is the two-byte tag and the big-endian version word. Everything
//! after it is a sequence of NTF8 integers and length-prefixed strings, read with the
//! stream-oriented NTF8 decoder so that no bytes past the header are consumed.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    error::{HeaderError, Result},
    header::{Contig, FormatId, Header, Library, FORMAT_VERSION},
    ntf8,
};

/// Format tag at the start of every AD stream
pub const AD_TAG: [u8; 2] = *b"AD";

/// Format name reported for AD streams
pub const AD_NAME: &str = "AD";

fn put_count(buffer: &mut Vec<u8>, count: usize) -> Result<()> {
    let count = i32::try_from(count).map_err(|_| HeaderError::Overflow(count))?;
    ntf8::encode32(count, buffer);
    Ok(())
}

fn put_string(buffer: &mut Vec<u8>, value: &str) -> Result<()> {
    put_count(buffer, value.len())?;
    buffer.extend_from_slice(value.as_bytes());
    Ok(())
}

fn put_strings(buffer: &mut Vec<u8>, values: &[String]) -> Result<()> {
    put_count(buffer, values.len())?;
    values.iter().try_for_each(|value| put_string(buffer, value))
}

fn get_count<R: Read>(reader: &mut R, field: &'static str) -> Result<usize> {
    let (count, _) = ntf8::read32(reader)?;
    usize::try_from(count).map_err(|_| {
        HeaderError::InvalidValue {
            field,
            value: count.to_string(),
        }
        .into()
    })
}

fn get_string<R: Read>(reader: &mut R, field: &'static str) -> Result<String> {
    let len = get_count(reader, field)?;
    // the length is untrusted, so the buffer only grows with the bytes actually present
    let mut bytes = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("{field}: expected {len} bytes, found {}", bytes.len()),
        )
        .into());
    }
    Ok(String::from_utf8(bytes)?)
}

fn get_strings<R: Read>(reader: &mut R, field: &'static str) -> Result<Vec<String>> {
    let count = get_count(reader, field)?;
    (0..count).map(|_| get_string(reader, field)).collect()
}

/// Writes `header` in binary form
///
/// The header is assembled in memory and written with a single call.
pub fn write_header<W: Write>(writer: &mut W, header: &Header) -> Result<()> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&AD_TAG);
    buffer.write_u16::<BigEndian>(FORMAT_VERSION)?;

    put_count(&mut buffer, header.contigs().len())?;
    for contig in header.contigs() {
        put_string(&mut buffer, &contig.name)?;
        ntf8::encode32(contig.length as i32, &mut buffer);
        put_strings(&mut buffer, &contig.attributes)?;
    }

    put_count(&mut buffer, header.libraries().len())?;
    for library in header.libraries() {
        put_string(&mut buffer, &library.id)?;
        put_string(&mut buffer, &library.sample)?;
        put_strings(&mut buffer, &library.attributes)?;
    }

    put_strings(&mut buffer, header.comments())?;

    writer.write_all(&buffer)?;
    Ok(())
}

/// Reads a binary header
///
/// The returned header is finalized.
pub fn read_header<R: Read>(reader: &mut R) -> Result<Header> {
    let mut tag = [0u8; 2];
    reader.read_exact(&mut tag)?;
    if tag != AD_TAG {
        return Err(HeaderError::InvalidTag(tag).into());
    }
    let version = reader.read_u16::<BigEndian>()?;
    if version >> 8 != FORMAT_VERSION >> 8 {
        return Err(HeaderError::InvalidVersion(version).into());
    }

    let mut header = Header::new();
    header.set_id(FormatId::new(AD_NAME, version));

    let num_contigs = get_count(reader, "contig count")?;
    for _ in 0..num_contigs {
        let name = get_string(reader, "contig name")?;
        let (length, _) = ntf8::read32(reader)?;
        let attributes = get_strings(reader, "contig attributes")?;
        header.add_contig(Contig::new(name, length as u32).with_attributes(attributes))?;
    }

    let num_libraries = get_count(reader, "library count")?;
    for _ in 0..num_libraries {
        let id = get_string(reader, "library id")?;
        let sample = get_string(reader, "library sample")?;
        let attributes = get_strings(reader, "library attributes")?;
        header.add_library(Library::new(id, sample).with_attributes(attributes))?;
    }

    for comment in get_strings(reader, "comments")? {
        header.add_comment(comment)?;
    }

    header.finalize();
    Ok(header)
}
