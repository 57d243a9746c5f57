//! NTF8 variable-length integers
//!
//! NTF8 stores an integer in 1 to 9 bytes. The leading byte carries a unary length tag: the
//! number of consecutive 1-bits before the first 0-bit is the number of continuation bytes that
//! follow. The value bits are packed most-significant first across the remaining bits of the
//! leading byte and all continuation bytes.
//!
//! | Bytes | Leading byte | Value bits |
//! | ----- | ------------ | ---------- |
//! | 1     | `0xxxxxxx`   | 7          |
//! | 2     | `10xxxxxx`   | 14         |
//! | 3     | `110xxxxx`   | 21         |
//! | 4     | `1110xxxx`   | 28         |
//! | 5     | `11110xxx`   | 35         |
//! | 6     | `111110xx`   | 42         |
//! | 7     | `1111110x`   | 49         |
//! | 8     | `11111110`   | 56         |
//! | 9     | `11111111`   | 64         |
//!
//! Integers are encoded through their unsigned bit pattern, so a negative `i32` always takes the
//! full 5-byte class and a negative `i64` the full 9-byte class.

use std::io::{self, Read, Write};

use crate::error::{IntegerError, Result};

/// Maximum encoded size of a 32-bit integer
pub const MAX_LEN32: usize = 5;

/// Maximum encoded size of a 64-bit integer
pub const MAX_LEN64: usize = 9;

/// Number of bytes needed to encode the bit pattern `x`
const fn encoded_len(x: u64) -> usize {
    let bits = (u64::BITS - x.leading_zeros()) as usize;
    if bits <= 7 {
        1
    } else if bits > 56 {
        MAX_LEN64
    } else {
        bits.div_ceil(7)
    }
}

/// Number of bytes announced by a leading byte
#[inline]
fn announced_len(lead: u8) -> usize {
    lead.leading_ones() as usize + 1
}

/// Packs `x` into `buf`, returning the number of bytes used
fn pack(x: u64, buf: &mut [u8; MAX_LEN64]) -> usize {
    let len = encoded_len(x);
    if len == MAX_LEN64 {
        buf[0] = 0xFF;
        buf[1..].copy_from_slice(&x.to_be_bytes());
        return len;
    }
    let tail = len - 1;
    buf[0] = !(0xFF_u8 >> tail) | (x >> (8 * tail)) as u8;
    for (i, byte) in buf[1..len].iter_mut().enumerate() {
        *byte = (x >> (8 * (tail - 1 - i))) as u8;
    }
    len
}

/// Value bits carried by the leading byte of a `len`-byte encoding
#[inline]
fn lead_bits(lead: u8, len: usize) -> u64 {
    if len == MAX_LEN64 {
        0
    } else {
        u64::from(lead) & (0xFF >> len)
    }
}

fn unpack(bytes: &[u8]) -> std::result::Result<(u64, usize), IntegerError> {
    let Some(&lead) = bytes.first() else {
        return Err(IntegerError::Empty);
    };
    let len = announced_len(lead);
    if bytes.len() < len {
        return Err(IntegerError::Truncated {
            expected: len,
            found: bytes.len(),
        });
    }
    let x = bytes[1..len]
        .iter()
        .fold(lead_bits(lead, len), |x, &b| (x << 8) | u64::from(b));
    Ok((x, len))
}

/// Reads one encoded integer byte by byte from `reader`
///
/// `max_len` bounds the accepted length class so that a 32-bit read stops at the prefix
/// instead of consuming a 64-bit encoding.
fn read_raw<R: Read>(reader: &mut R, max_len: usize, bits: u32) -> Result<(u64, usize)> {
    let mut bytes = reader.by_ref().bytes();
    let lead = match bytes.next() {
        Some(byte) => byte?,
        None => return Err(IntegerError::Empty.into()),
    };
    let len = announced_len(lead);
    if len > max_len {
        return Err(IntegerError::OutOfRange { bits }.into());
    }
    let mut x = lead_bits(lead, len);
    for found in 1..len {
        match bytes.next() {
            Some(byte) => x = (x << 8) | u64::from(byte?),
            None => {
                return Err(IntegerError::Truncated {
                    expected: len,
                    found,
                }
                .into())
            }
        }
    }
    Ok((x, len))
}

/// Checks that a decoded 32-bit payload fits in 32 bits
fn narrow32(x: u64) -> std::result::Result<i32, IntegerError> {
    u32::try_from(x)
        .map(|x| x as i32)
        .map_err(|_| IntegerError::OutOfRange { bits: 32 })
}

/// Returns the encoded size of a 32-bit integer
#[must_use]
pub fn len32(n: i32) -> usize {
    encoded_len(u64::from(n as u32))
}

/// Returns the encoded size of a 64-bit integer
#[must_use]
pub fn len64(n: i64) -> usize {
    encoded_len(n as u64)
}

/// Appends the encoding of a 32-bit integer to `out`, returning the number of bytes added
pub fn encode32(n: i32, out: &mut Vec<u8>) -> usize {
    let mut buf = [0u8; MAX_LEN64];
    let len = pack(u64::from(n as u32), &mut buf);
    out.extend_from_slice(&buf[..len]);
    len
}

/// Appends the encoding of a 64-bit integer to `out`, returning the number of bytes added
pub fn encode64(n: i64, out: &mut Vec<u8>) -> usize {
    let mut buf = [0u8; MAX_LEN64];
    let len = pack(n as u64, &mut buf);
    out.extend_from_slice(&buf[..len]);
    len
}

/// Decodes a 32-bit integer from the start of `bytes`
///
/// Returns the value and the number of bytes consumed.
pub fn decode32(bytes: &[u8]) -> std::result::Result<(i32, usize), IntegerError> {
    if let Some(&lead) = bytes.first() {
        if announced_len(lead) > MAX_LEN32 {
            return Err(IntegerError::OutOfRange { bits: 32 });
        }
    }
    let (x, len) = unpack(bytes)?;
    Ok((narrow32(x)?, len))
}

/// Decodes a 64-bit integer from the start of `bytes`
///
/// Returns the value and the number of bytes consumed.
pub fn decode64(bytes: &[u8]) -> std::result::Result<(i64, usize), IntegerError> {
    let (x, len) = unpack(bytes)?;
    Ok((x as i64, len))
}

/// Writes a 32-bit integer, returning the number of bytes written
pub fn write32<W: Write>(writer: &mut W, n: i32) -> io::Result<usize> {
    let mut buf = [0u8; MAX_LEN64];
    let len = pack(u64::from(n as u32), &mut buf);
    writer.write_all(&buf[..len])?;
    Ok(len)
}

/// Writes a 64-bit integer, returning the number of bytes written
pub fn write64<W: Write>(writer: &mut W, n: i64) -> io::Result<usize> {
    let mut buf = [0u8; MAX_LEN64];
    let len = pack(n as u64, &mut buf);
    writer.write_all(&buf[..len])?;
    Ok(len)
}

/// Reads a 32-bit integer one byte at a time
///
/// Only the bytes of the integer itself are consumed, so this can be used on a stream that
/// interleaves integers with other tokens.
pub fn read32<R: Read>(reader: &mut R) -> Result<(i32, usize)> {
    let (x, len) = read_raw(reader, MAX_LEN32, 32)?;
    Ok((narrow32(x)?, len))
}

/// Reads a 64-bit integer one byte at a time
pub fn read64<R: Read>(reader: &mut R) -> Result<(i64, usize)> {
    let (x, len) = read_raw(reader, MAX_LEN64, 64)?;
    Ok((x as i64, len))
}

#[cfg(test)]
mod testing {
    use std::io::Cursor;

    use anyhow::Result;
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    use super::*;
    use crate::Error;

    fn samples() -> Vec<u64> {
        let mut rng = SmallRng::seed_from_u64(0x61C8_8646_80B5_83EB);
        (0..10_000).map(|_| rng.random()).collect()
    }

    fn roundtrip32(n: i32) {
        let mut buf = Vec::new();
        let written = encode32(n, &mut buf);
        assert_eq!(written, buf.len());
        assert_eq!(written, len32(n));
        assert_eq!(decode32(&buf), Ok((n, written)), "buffer decode of {n}");

        // pad the stream so that the reader must stop on its own
        buf.extend_from_slice(&[0xFF; MAX_LEN32]);
        let mut stream = Cursor::new(buf);
        let (m, read) = read32(&mut stream).unwrap();
        assert_eq!((m, read), (n, written), "stream decode of {n}");
        assert_eq!(stream.position() as usize, written);
    }

    fn roundtrip64(n: i64) {
        let mut buf = Vec::new();
        let written = encode64(n, &mut buf);
        assert_eq!(written, buf.len());
        assert_eq!(written, len64(n));
        assert_eq!(decode64(&buf), Ok((n, written)), "buffer decode of {n}");

        buf.extend_from_slice(&[0xFF; MAX_LEN64]);
        let mut stream = Cursor::new(buf);
        let (m, read) = read64(&mut stream).unwrap();
        assert_eq!((m, read), (n, written), "stream decode of {n}");
        assert_eq!(stream.position() as usize, written);
    }

    #[test]
    fn test_roundtrip_small_values() {
        for n in 0..65536 {
            roundtrip32(n);
            roundtrip64(i64::from(n));
        }
    }

    #[test]
    fn test_roundtrip_boundaries() {
        for i in 0..32 {
            let p = 1u32 << i;
            for n in [p.wrapping_sub(1), p, p.wrapping_add(1)] {
                roundtrip32(n as i32);
            }
        }
        for i in 0..64 {
            let p = 1u64 << i;
            for n in [p.wrapping_sub(1), p, p.wrapping_add(1)] {
                roundtrip64(n as i64);
            }
        }
        for n in [i32::MIN, -1, i32::MAX] {
            roundtrip32(n);
        }
        for n in [i64::MIN, -1, i64::MAX] {
            roundtrip64(n);
        }
    }

    #[test]
    fn test_roundtrip_random_masks() {
        let numbers = samples();
        for width in 17..=32 {
            let mask = (1u64 << width) - 1;
            for &n in &numbers {
                roundtrip32((n & mask) as u32 as i32);
            }
        }
        for width in 17..=64 {
            let mask = if width == 64 {
                u64::MAX
            } else {
                (1u64 << width) - 1
            };
            for &n in &numbers {
                roundtrip64((n & mask) as i64);
            }
        }
    }

    #[test]
    fn test_length_steps_at_powers_of_two() {
        let steps = [7, 14, 21, 28, 35, 42, 49, 56];
        for (i, &bits) in steps.iter().enumerate() {
            let below = (1i64 << bits) - 1;
            assert_eq!(len64(below), i + 1);
            assert_eq!(len64(below + 1), i + 2);
        }
        assert_eq!(len64(i64::MAX), MAX_LEN64);
        assert_eq!(len32(1 << 28), MAX_LEN32);
        assert_eq!(len32((1 << 28) - 1), 4);
        assert_eq!(len32(-1), MAX_LEN32);
        assert_eq!(len64(-1), MAX_LEN64);

        let mut last = 0;
        for bits in 0..63 {
            let len = len64(1i64 << bits);
            assert!(len >= last);
            last = len;
        }
    }

    #[test]
    fn test_known_encodings() {
        let mut buf = Vec::new();
        encode32(100, &mut buf);
        encode32(1001, &mut buf);
        encode32(200, &mut buf);
        encode64(1 << 39, &mut buf);
        assert_eq!(
            buf,
            [0x64, 0x83, 0xE9, 0x80, 0xC8, 0xF8, 0x80, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_truncated_buffer() {
        let mut buf = Vec::new();
        encode32(1000, &mut buf);
        assert_eq!(
            decode32(&buf[..1]),
            Err(IntegerError::Truncated {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(decode64(&[]), Err(IntegerError::Empty));
    }

    #[test]
    fn test_truncated_stream() -> Result<()> {
        let mut stream = Cursor::new(vec![0xF0, 0x01]);
        match read32(&mut stream) {
            Err(Error::MalformedInteger(IntegerError::Truncated { expected, found })) => {
                assert_eq!((expected, found), (5, 2));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_out_of_range_32() {
        // 35 value bits, larger than u32::MAX
        assert_eq!(
            decode32(&[0xF7, 0xFF, 0xFF, 0xFF, 0xFF]),
            Err(IntegerError::OutOfRange { bits: 32 })
        );
        // 6-byte class is never valid for 32-bit integers
        let mut buf = Vec::new();
        encode64(1 << 40, &mut buf);
        assert_eq!(decode32(&buf), Err(IntegerError::OutOfRange { bits: 32 }));
        assert!(matches!(
            read32(&mut Cursor::new(buf)),
            Err(Error::MalformedInteger(IntegerError::OutOfRange { bits: 32 }))
        ));
    }

    #[test]
    fn test_write_matches_encode() -> Result<()> {
        let mut written = Vec::new();
        let mut encoded = Vec::new();
        for n in [0i64, 127, 128, 1 << 39, -5, i64::MAX] {
            write64(&mut written, n)?;
            encode64(n, &mut encoded);
        }
        write32(&mut written, -7)?;
        encode32(-7, &mut encoded);
        assert_eq!(written, encoded);
        Ok(())
    }
}
