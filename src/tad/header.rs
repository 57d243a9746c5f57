use std::io::{BufRead, Write};

use log::warn;

use crate::{
    error::{HeaderError, Result},
    header::{Contig, FormatId, Header, Library, FORMAT_VERSION},
};

/// Format name written in the `@ID` line
pub const TAD_NAME: &str = "TAD";

fn parse_version(value: &str) -> Result<u16> {
    let invalid = || HeaderError::InvalidValue {
        field: "VN",
        value: value.to_string(),
    };
    let (major, minor) = value.split_once('.').ok_or_else(invalid)?;
    let major: u8 = major.parse().map_err(|_| invalid())?;
    let minor: u8 = minor.parse().map_err(|_| invalid())?;
    let version = (u16::from(major) << 8) | u16::from(minor);
    if version >> 8 != FORMAT_VERSION >> 8 {
        return Err(HeaderError::InvalidVersion(version).into());
    }
    Ok(version)
}

/// Splits the fields of a header line into the two mandatory tagged values and the rest
fn split_tagged<'a>(
    line: &'static str,
    fields: impl Iterator<Item = &'a str>,
    first: &'static str,
    second: &'static str,
) -> Result<(&'a str, &'a str, Vec<String>)> {
    let mut a = None;
    let mut b = None;
    let mut attributes = Vec::new();
    for field in fields {
        match field.split_once(':') {
            Some((tag, value)) if tag == first && a.is_none() => a = Some(value),
            Some((tag, value)) if tag == second && b.is_none() => b = Some(value),
            _ if field.is_empty() => {}
            _ => attributes.push(field.to_string()),
        }
    }
    let a = a.ok_or(HeaderError::MissingField { line, field: first })?;
    let b = b.ok_or(HeaderError::MissingField {
        line,
        field: second,
    })?;
    Ok((a, b, attributes))
}

fn parse_line(line: &str, header: &mut Header) -> Result<()> {
    let (tag, rest) = line.split_once('\t').unwrap_or((line, ""));
    match tag {
        "@ID" => {
            let mut id = header.id().clone();
            for field in rest.split('\t') {
                match field.split_once(':') {
                    Some(("FF", name)) => id.name = name.to_string(),
                    Some(("VN", version)) => id.version = parse_version(version)?,
                    _ => {}
                }
            }
            header.set_id(id);
        }
        "@SQ" => {
            let (name, length, attributes) = split_tagged("@SQ", rest.split('\t'), "SN", "LN")?;
            let length = length.parse().map_err(|_| HeaderError::InvalidValue {
                field: "LN",
                value: length.to_string(),
            })?;
            header.add_contig(Contig::new(name, length).with_attributes(attributes))?;
        }
        "@AD" => {
            let (id, sample, attributes) = split_tagged("@AD", rest.split('\t'), "ID", "SM")?;
            header.add_library(Library::new(id, sample).with_attributes(attributes))?;
        }
        "@CO" => header.add_comment(rest)?,
        _ => warn!("skipping unknown TAD header line: {tag}"),
    }
    Ok(())
}

/// Reads the header lines at the start of `reader`
///
/// Reading stops at the first line that does not start with `@`; a blank separator line is
/// consumed, any other line is left for the record reader. The returned header is finalized.
pub fn read_header<R: BufRead>(reader: &mut R) -> Result<Header> {
    let mut header = Header::new();
    header.set_id(FormatId::new(TAD_NAME, FORMAT_VERSION));

    let mut line = String::new();
    loop {
        let blank = match reader.fill_buf()?.first() {
            Some(b'@') => false,
            Some(b'\n' | b'\r') => true,
            _ => break,
        };
        line.clear();
        reader.read_line(&mut line)?;
        if blank {
            break;
        }
        parse_line(line.trim_end_matches(['\n', '\r']), &mut header)?;
    }

    header.finalize();
    Ok(header)
}

/// Writes `header` as TAD header lines
///
/// No blank separator line is written, so a header read from a file without one is
/// reproduced byte for byte.
pub fn write_header<W: Write>(writer: &mut W, header: &Header) -> Result<()> {
    let mut buffer = Vec::new();
    let id = header.id();
    writeln!(
        buffer,
        "@ID\tFF:{TAD_NAME}\tVN:{}.{}",
        id.major(),
        id.minor()
    )?;
    for contig in header.contigs() {
        write!(buffer, "@SQ\tSN:{}\tLN:{}", contig.name, contig.length)?;
        for attribute in &contig.attributes {
            write!(buffer, "\t{attribute}")?;
        }
        buffer.push(b'\n');
    }
    for library in header.libraries() {
        write!(buffer, "@AD\tID:{}\tSM:{}", library.id, library.sample)?;
        for attribute in &library.attributes {
            write!(buffer, "\t{attribute}")?;
        }
        buffer.push(b'\n');
    }
    for comment in header.comments() {
        writeln!(buffer, "@CO\t{comment}")?;
    }
    writer.write_all(&buffer)?;
    Ok(())
}

#[cfg(test)]
mod testing {
    use std::io::{Cursor, Read};

    use anyhow::Result;

    use super::*;
    use crate::Error;

    const HEADER: &str = "@ID\tFF:TAD\tVN:0.1\n\
        @SQ\tSN:scaffold_1\tLN:100\n\
        @SQ\tSN:scaffold_2\tLN:200\tM5:aaaaaaaa\n\
        @SQ\tSN:scaffold_3\tLN:300\tM5:aaaaaaab\tUR:blah\n\
        @AD\tID:A\tSM:A\n\
        @AD\tID:B\tSM:B\tLB:B\tRG:B\n\
        @CO\tThis is a comment that is ignored\n";

    #[test]
    fn test_read_header() -> Result<()> {
        let text = format!("{HEADER}\nscaffold_1\t1\tA\t10\t9\n");
        let mut reader = Cursor::new(text);
        let header = read_header(&mut reader)?;

        assert_eq!(header.id(), &FormatId::new("TAD", 0x0001));
        let names: Vec<_> = header.contigs().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["scaffold_1", "scaffold_2", "scaffold_3"]);
        let lengths: Vec<_> = header.contigs().iter().map(|c| c.length).collect();
        assert_eq!(lengths, [100, 200, 300]);
        assert!(header.contigs()[0].attributes.is_empty());
        assert_eq!(header.contigs()[1].attributes, ["M5:aaaaaaaa"]);
        assert_eq!(header.contigs()[2].attributes, ["M5:aaaaaaab", "UR:blah"]);
        assert_eq!(header.libraries()[1].attributes, ["LB:B", "RG:B"]);
        assert_eq!(header.comments(), ["This is a comment that is ignored"]);

        // the blank separator is consumed, the first record is not
        let mut rest = String::new();
        reader.read_to_string(&mut rest)?;
        assert_eq!(rest, "scaffold_1\t1\tA\t10\t9\n");
        Ok(())
    }

    #[test]
    fn test_header_roundtrip_is_byte_identical() -> Result<()> {
        let header = read_header(&mut Cursor::new(HEADER))?;
        let mut out = Vec::new();
        write_header(&mut out, &header)?;
        assert_eq!(String::from_utf8(out)?, HEADER);
        Ok(())
    }

    #[test]
    fn test_header_without_separator() -> Result<()> {
        let text = format!("{HEADER}scaffold_1\t1\tA\t10\t9\n");
        let mut reader = Cursor::new(text);
        read_header(&mut reader)?;
        let mut rest = String::new();
        reader.read_to_string(&mut rest)?;
        assert_eq!(rest, "scaffold_1\t1\tA\t10\t9\n");
        Ok(())
    }

    #[test]
    fn test_missing_fields() {
        let result = read_header(&mut Cursor::new("@SQ\tSN:seq1\n"));
        assert!(matches!(
            result,
            Err(Error::HeaderError(HeaderError::MissingField {
                line: "@SQ",
                field: "LN"
            }))
        ));
        let result = read_header(&mut Cursor::new("@AD\tSM:A\n"));
        assert!(matches!(
            result,
            Err(Error::HeaderError(HeaderError::MissingField {
                line: "@AD",
                field: "ID"
            }))
        ));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            read_header(&mut Cursor::new("@SQ\tSN:seq1\tLN:abc\n")),
            Err(Error::HeaderError(HeaderError::InvalidValue { field: "LN", .. }))
        ));
        assert!(matches!(
            read_header(&mut Cursor::new("@ID\tFF:TAD\tVN:one\n")),
            Err(Error::HeaderError(HeaderError::InvalidValue { field: "VN", .. }))
        ));
        assert!(matches!(
            read_header(&mut Cursor::new("@ID\tFF:TAD\tVN:3.0\n")),
            Err(Error::HeaderError(HeaderError::InvalidVersion(0x0300)))
        ));
    }

    #[test]
    fn test_unknown_tags_are_skipped() -> Result<()> {
        let header = read_header(&mut Cursor::new("@XX\tfoo\n@SQ\tSN:s\tLN:5\n"))?;
        assert_eq!(header.contigs().len(), 1);
        Ok(())
    }
}
