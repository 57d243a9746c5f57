use std::io::BufRead;

use crate::{
    color::Color,
    error::{Error, RecordError, Result},
    header::Header,
    location::{Location, LocationCursor},
    ntf8,
    record::AlleleDepths,
};

/// Number of location-word bits holding the color
const COLOR_BITS: u32 = 7;

/// Offset separating absolute location words from relative ones
const ABSOLUTE_OFFSET: u64 = 1 << 32;

/// Largest shifted location that still leaves room for the color bits
const MAX_SHIFTED: u64 = u64::MAX >> COLOR_BITS;

/// Builds the location word of a record following `cursor`
fn location_word(location: Location, color: Color, cursor: &LocationCursor) -> Result<u64> {
    let ordinal = location.ordinal();
    let step = match cursor.last() {
        Some(prev) if prev.contig() == location.contig() && prev < location => {
            ordinal - prev.ordinal() - 1
        }
        _ => ordinal
            .checked_add(ABSOLUTE_OFFSET)
            .filter(|&shifted| shifted <= MAX_SHIFTED)
            .ok_or(RecordError::LocationOutOfRange(ordinal))?,
    };
    Ok((step << COLOR_BITS) | u64::from(color.rank()))
}

/// Recovers the location and color carried by a location word
fn split_word(word: u64, cursor: &LocationCursor) -> Result<(Location, Color)> {
    let color = Color::from_bits(word);
    let step = word >> COLOR_BITS;
    if step >= ABSOLUTE_OFFSET {
        return Ok((Location::from_ordinal(step - ABSOLUTE_OFFSET), color));
    }
    let prev = cursor.last().ok_or(RecordError::MissingAnchor)?;
    let location = prev
        .ordinal()
        .checked_add(step + 1)
        .map(Location::from_ordinal)
        .filter(|location| location.contig() == prev.contig())
        .ok_or(RecordError::ContigOverflow)?;
    Ok((location, color))
}

/// Maps integer failures inside a record to record corruption
fn nested<T>(result: Result<T>) -> Result<T> {
    result.map_err(|err| match err {
        Error::MalformedInteger(err) => RecordError::from(err).into(),
        err => err,
    })
}

/// Serializes records into a reusable byte buffer
#[derive(Debug, Default)]
pub struct Encoder {
    buffer: Vec<u8>,
}
impl Encoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `record` relative to `cursor` and returns the encoded bytes
    ///
    /// The record must fit `header`: same library count and a location inside a declared
    /// contig. The cursor is not advanced; callers do so once the bytes are written.
    pub fn encode(
        &mut self,
        record: &AlleleDepths,
        header: &Header,
        cursor: &LocationCursor,
    ) -> Result<&[u8]> {
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

        self.buffer.clear();
        let word = location_word(record.location(), record.color(), cursor)?;
        ntf8::encode64(word as i64, &mut self.buffer);
        for &depth in record.data() {
            ntf8::encode32(depth, &mut self.buffer);
        }
        Ok(&self.buffer)
    }
}

/// Deserializes records from a buffered stream
#[derive(Debug, Default)]
pub struct Decoder {
    scratch: AlleleDepths,
}
impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the next record into `record`
    ///
    /// Returns `Ok(false)` when the stream is exhausted before the first byte of a record. On
    /// error `record` keeps its previous contents.
    pub fn decode<R: BufRead>(
        &mut self,
        reader: &mut R,
        header: &Header,
        cursor: &LocationCursor,
        record: &mut AlleleDepths,
    ) -> Result<bool> {
        if reader.fill_buf()?.is_empty() {
            return Ok(false);
        }
        let (word, _) = nested(ntf8::read64(reader))?;
        let (location, color) = split_word(word as u64, cursor)?;
        header.check_location(location).map_err(|err| match err {
            Error::UnknownContig(_) => RecordError::ContigOutOfRange(location.contig()).into(),
            err => err,
        })?;

        self.scratch.resize(color, header.num_libraries());
        self.scratch.set_raw_location(location);
        for depth in self.scratch.data_mut() {
            *depth = nested(ntf8::read32(reader))?.0;
        }
        std::mem::swap(record, &mut self.scratch);
        Ok(true)
    }
}

#[cfg(test)]
mod testing {
    use std::io::Cursor;

    use anyhow::Result;

    use super::*;
    use crate::{
        header::{Contig, Library},
        location::make_location,
    };

    fn header_with(contigs: &[(&str, u32)], num_libraries: usize) -> Header {
        let mut header = Header::new();
        for &(name, length) in contigs {
            header.add_contig(Contig::new(name, length)).unwrap();
        }
        for i in 0..num_libraries {
            let id = format!("L{i}");
            header.add_library(Library::new(&id, &id)).unwrap();
        }
        header.finalize();
        header
    }

    fn header() -> Header {
        header_with(&[("seq1", 100), ("seq2", 1000), ("seq3", 10000)], 2)
    }

    fn record(contig: u32, position: u32, rank: u8, data: Vec<i32>) -> AlleleDepths {
        AlleleDepths::new(
            make_location(contig, position),
            Color::new(rank).unwrap(),
            2,
            data,
        )
        .unwrap()
    }

    fn encode_all(records: &[AlleleDepths]) -> Result<Vec<u8>> {
        encode_with(&header(), records)
    }

    fn encode_with(header: &Header, records: &[AlleleDepths]) -> Result<Vec<u8>> {
        let mut encoder = Encoder::new();
        let mut cursor = LocationCursor::new();
        let mut out = Vec::new();
        for record in records {
            out.extend_from_slice(encoder.encode(record, header, &cursor)?);
            cursor.advance(record.location());
        }
        Ok(out)
    }

    fn decode_all(bytes: Vec<u8>) -> Result<Vec<AlleleDepths>> {
        let header = header();
        let mut decoder = Decoder::new();
        let mut cursor = LocationCursor::new();
        let mut reader = Cursor::new(bytes);
        let mut record = AlleleDepths::default();
        let mut records = Vec::new();
        while decoder.decode(&mut reader, &header, &cursor, &mut record)? {
            cursor.advance(record.location());
            records.push(record.clone());
        }
        Ok(records)
    }

    #[test]
    fn test_single_record_vectors() -> Result<()> {
        let cases = [
            (
                record(0, 0, 0, vec![0, 0]),
                vec![0xF8, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            ),
            (
                record(1, 9, 4, vec![10, 11, 3, 4]),
                vec![0xF9, 0x00, 0x00, 0x00, 0x04, 0x84, 10, 11, 3, 4],
            ),
            (
                record(2, 100, 68, vec![10, 11, 1000, 4]),
                vec![0xF9, 0x80, 0x00, 0x00, 0x32, 0x44, 10, 11, 0x83, 0xE8, 4],
            ),
        ];
        for (record, expected) in cases {
            let bytes = encode_all(std::slice::from_ref(&record))?;
            assert_eq!(bytes, expected);
            assert_eq!(decode_all(bytes)?, vec![record]);
        }
        Ok(())
    }

    #[test]
    fn test_delta_vectors() -> Result<()> {
        let records = vec![
            record(1, 0, 1, vec![100, 1001]),
            record(1, 1, 5, vec![200, 201, 0, 10]),
            record(1, 3, 5, vec![200, 201, 0, 10]),
            record(2, 3, 0, vec![1, 0]),
        ];
        let expected = vec![
            0xF9, 0x00, 0x00, 0x00, 0x00, 0x01, 0x64, 0x83, 0xE9, //
            0x05, 0x80, 0xC8, 0x80, 0xC9, 0, 10, //
            0x80, 0x85, 0x80, 0xC8, 0x80, 0xC9, 0, 10, //
            0xF9, 0x80, 0x00, 0x00, 0x01, 0x80, 1, 0,
        ];
        let bytes = encode_all(&records)?;
        assert_eq!(bytes, expected);
        assert_eq!(decode_all(bytes)?, records);
        Ok(())
    }

    #[test]
    fn test_backwards_step_uses_absolute_form() -> Result<()> {
        let records = vec![
            record(0, 10, 0, vec![1, 2]),
            record(0, 10, 1, vec![3, 4]),
            record(0, 5, 2, vec![5, 6]),
        ];
        let bytes = encode_all(&records)?;
        assert_eq!(decode_all(bytes)?, records);
        Ok(())
    }

    #[test]
    fn test_empty_stream() -> Result<()> {
        assert!(decode_all(Vec::new())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_truncated_record_is_corrupt() -> Result<()> {
        let bytes = encode_all(&[record(2, 100, 68, vec![10, 11, 1000, 4])])?;
        for len in 1..bytes.len() {
            let err = decode_all(bytes[..len].to_vec()).unwrap_err();
            let err = err.downcast::<Error>()?;
            assert!(err.is_corrupt_record(), "{len}: {err}");
        }
        Ok(())
    }

    #[test]
    fn test_relative_word_without_anchor() {
        let err = decode_all(vec![0x05, 0x00, 0x00]).unwrap_err();
        assert!(matches!(
            err.downcast::<Error>(),
            Ok(Error::CorruptRecord(RecordError::MissingAnchor))
        ));
    }

    #[test]
    fn test_failed_decode_leaves_record_untouched() -> Result<()> {
        let first = record(0, 0, 0, vec![7, 8]);
        let mut bytes = encode_all(std::slice::from_ref(&first))?;
        bytes.extend_from_slice(&[0x05, 0x01]);

        let header = header();
        let mut decoder = Decoder::new();
        let mut cursor = LocationCursor::new();
        let mut reader = Cursor::new(bytes);
        let mut out = AlleleDepths::default();
        assert!(decoder.decode(&mut reader, &header, &cursor, &mut out)?);
        cursor.advance(out.location());
        assert!(decoder.decode(&mut reader, &header, &cursor, &mut out).is_err());
        assert_eq!(out, first);
        Ok(())
    }

    #[test]
    fn test_rejects_mismatched_shape() {
        let mut encoder = Encoder::new();
        let cursor = LocationCursor::new();
        let three = AlleleDepths::new(
            make_location(0, 0),
            Color::new(0).unwrap(),
            3,
            vec![1, 2, 3],
        )
        .unwrap();
        assert!(matches!(
            encoder.encode(&three, &header(), &cursor),
            Err(Error::CorruptRecord(RecordError::LibraryCount {
                expected: 2,
                got: 3
            }))
        ));
    }

    #[test]
    fn test_location_must_fit_header() -> Result<()> {
        let small = header_with(&[("seq1", 100)], 2);
        let mut encoder = Encoder::new();
        let cursor = LocationCursor::new();

        let far = record(5, 0, 0, vec![1, 2]);
        assert!(matches!(
            encoder.encode(&far, &small, &cursor),
            Err(Error::UnknownContig(name)) if name == "#5"
        ));
        let past_end = record(0, 100, 0, vec![1, 2]);
        assert!(encoder
            .encode(&past_end, &small, &cursor)
            .unwrap_err()
            .is_corrupt_record());

        // streams written against a larger header are rejected on read
        let large = header_with(
            &[("seq1", 1000), ("s2", 1), ("s3", 1), ("s4", 1), ("s5", 1), ("s6", 1)],
            2,
        );
        let cases = [
            (far, RecordError::ContigOutOfRange(5)),
            (
                record(0, 500, 0, vec![1, 2]),
                RecordError::PositionOutOfRange {
                    position: 500,
                    length: 100,
                },
            ),
        ];
        for (written, expected) in cases {
            let bytes = encode_with(&large, std::slice::from_ref(&written))?;
            let mut decoder = Decoder::new();
            let mut out = AlleleDepths::default();
            let err = decoder
                .decode(&mut Cursor::new(bytes), &small, &cursor, &mut out)
                .unwrap_err();
            assert!(err.is_corrupt_record());
            assert_eq!(err.to_string(), Error::from(expected).to_string());
        }
        Ok(())
    }
}
