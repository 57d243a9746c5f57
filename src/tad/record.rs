use std::io::BufRead;

use memchr::memchr;

use crate::{
    color::Color,
    error::{Error, RecordError, Result},
    header::Header,
    record::AlleleDepths,
};

/// Splits a line on a single-byte separator
struct Fields<'a> {
    rest: Option<&'a str>,
    sep: u8,
}
impl<'a> Fields<'a> {
    fn new(line: &'a str, sep: u8) -> Self {
        Self {
            rest: Some(line),
            sep,
        }
    }
}
impl<'a> Iterator for Fields<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest?;
        if let Some(i) = memchr(self.sep, rest.as_bytes()) {
            self.rest = Some(&rest[i + 1..]);
            Some(&rest[..i])
        } else {
            self.rest = None;
            Some(rest)
        }
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, column: &'static str) -> Result<T> {
    value.parse().map_err(|_| {
        RecordError::InvalidNumber {
            column,
            value: value.to_string(),
        }
        .into()
    })
}

/// Serializes records as TAD lines into a reusable buffer
#[derive(Debug, Default)]
pub struct Encoder {
    buffer: Vec<u8>,
}
impl Encoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats `record` as one newline-terminated line
    pub fn encode(&mut self, record: &AlleleDepths, header: &Header) -> Result<&[u8]> {
        let num_libraries = header.num_libraries();
        if record.num_libraries() != num_libraries {
            return Err(RecordError::LibraryCount {
                expected: num_libraries,
                got: record.num_libraries(),
            }
            .into());
        }
        record.validate()?;
        header.check_location(record.location())?;
        let (contig, position) = record.location().decompose();
        let name = header
            .contig(contig as usize)
            .map(|contig| contig.name.as_str())
            .ok_or_else(|| Error::UnknownContig(format!("#{contig}")))?;

        let mut numbers = itoa::Buffer::new();
        self.buffer.clear();
        self.buffer.extend_from_slice(name.as_bytes());
        self.buffer.push(b'\t');
        self.buffer.extend_from_slice(numbers.format(u64::from(position) + 1).as_bytes());
        self.buffer.push(b'\t');
        self.buffer.extend_from_slice(record.color().symbols().as_bytes());
        for library in 0..num_libraries {
            self.buffer.push(b'\t');
            for allele in 0..record.num_alleles() {
                if allele > 0 {
                    self.buffer.push(b',');
                }
                let depth = record.depth(allele, library);
                self.buffer.extend_from_slice(numbers.format(depth).as_bytes());
            }
        }
        self.buffer.push(b'\n');
        Ok(&self.buffer)
    }
}

/// Parses TAD lines into records
#[derive(Debug, Default)]
pub struct Decoder {
    line: String,
    scratch: AlleleDepths,
}
impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the next record line into `record`
    ///
    /// Blank lines are skipped. Returns `Ok(false)` at the end of the stream. On error
    /// `record` keeps its previous contents.
    pub fn decode<R: BufRead>(
        &mut self,
        reader: &mut R,
        header: &Header,
        record: &mut AlleleDepths,
    ) -> Result<bool> {
        loop {
            self.line.clear();
            if reader.read_line(&mut self.line)? == 0 {
                return Ok(false);
            }
            if !self.line.trim_end_matches(['\n', '\r']).is_empty() {
                break;
            }
        }
        let line = self.line.trim_end_matches(['\n', '\r']);
        Self::parse(line, header, &mut self.scratch)?;
        std::mem::swap(record, &mut self.scratch);
        Ok(true)
    }

    fn parse(line: &str, header: &Header, record: &mut AlleleDepths) -> Result<()> {
        if line.starts_with('@') {
            return Err(RecordError::UnexpectedHeaderLine.into());
        }
        let mut columns = Fields::new(line, b'\t');
        let contig = columns.next().ok_or(RecordError::MissingColumn("contig"))?;
        let position = columns
            .next()
            .ok_or(RecordError::MissingColumn("position"))?;
        let symbols = columns
            .next()
            .ok_or(RecordError::MissingColumn("symbols"))?;

        let contig = header.contig_index(contig)?;
        let position: u32 = parse_number(position, "position")?;
        if position == 0 {
            return Err(RecordError::ZeroPosition.into());
        }
        let color = Color::from_symbols(symbols.as_bytes())
            .ok_or_else(|| RecordError::UnknownSymbols(symbols.to_string()))?;

        let num_libraries = header.num_libraries();
        let num_alleles = color.alleles();
        record.resize(color, num_libraries);
        record.set_location(contig as u32, position - 1);
        header.check_location(record.location())?;

        let data = record.data_mut();
        let mut library = 0;
        while let Some(column) = columns.next() {
            if library == num_libraries {
                return Err(RecordError::LibraryColumns {
                    expected: num_libraries,
                    got: library + 1 + columns.count(),
                }
                .into());
            }
            let mut allele = 0;
            for value in Fields::new(column, b',') {
                if allele == num_alleles {
                    return Err(RecordError::AlleleColumns {
                        library,
                        expected: num_alleles,
                        got: Fields::new(column, b',').count(),
                    }
                    .into());
                }
                data[allele * num_libraries + library] = parse_number(value, "depth")?;
                allele += 1;
            }
            if allele != num_alleles {
                return Err(RecordError::AlleleColumns {
                    library,
                    expected: num_alleles,
                    got: allele,
                }
                .into());
            }
            library += 1;
        }
        if library != num_libraries {
            return Err(RecordError::LibraryColumns {
                expected: num_libraries,
                got: library,
            }
            .into());
        }
        Ok(())
    }
}
