//! # ad
//!
//! *.ad files are the **binary** allele-depth representation.
//!
//! For the tab-delimited text representation use the [`tad`](crate::tad) module.
//!
//! ## AD file format
//!
//! An AD file consists of two sections:
//!
//! 1. Variable-size header
//! 2. Record data section
//!
//! ### Header Format
//!
//! | Field     | Size (bytes) | Description                                   | Type        |
//! | --------- | ------------ | --------------------------------------------- | ----------- |
//! | tag       | 2            | Format tag (`"AD"`)                           | bytes       |
//! | version   | 2            | Format version (currently `0x0001`)           | uint16 (BE) |
//! | contigs   | variable     | count, then name, length and attributes       | NTF8 + text |
//! | libraries | variable     | count, then id, sample and attributes         | NTF8 + text |
//! | comments  | variable     | count, then comment strings                   | NTF8 + text |
//!
//! Every count and length is an [NTF8](crate::ntf8) integer; every string is an NTF8 byte
//! length followed by the UTF-8 bytes.
//!
//! ### Record Format
//!
//! Each record consists of a:
//!
//! 1. Location word (NTF8, 64-bit)
//! 2. `alleles * libraries` depths (NTF8, 32-bit each), allele-major
//!
//! The low 7 bits of the location word hold the record's [`Color`](crate::Color). The upper
//! bits hold either:
//!
//! - `location - previous - 1` when the record follows the previous one within the same contig
//!   (the *relative* form, always below `2^32`), or
//! - `location + 2^32` otherwise (the *absolute* form, which carries `contig + 1` in its upper
//!   bits and is therefore always at least `2^32`).
//!
//! Consecutive sites therefore usually cost a single byte of location, and records have no
//! delimiters beyond what the integer encoding implies.
//!
//! ## Example
//!
//! With two libraries, a first record at contig 1 position 9 observing `AC` with depths
//! `[10, 11, 3, 4]` is stored as:
//!
//! ```text
//! F9 00 00 00 04 84   0A 0B 03 04
//! ```

mod codec;
mod header;
mod record;

pub use codec::BinaryCodec;
pub use header::{read_header, write_header, AD_NAME, AD_TAG};
pub use record::{Decoder, Encoder};
