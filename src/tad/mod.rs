//! # tad
//!
//! *.tad files are the **tab-delimited text** allele-depth representation.
//!
//! For the compact binary representation use the [`ad`](crate::ad) module. Both
//! representations carry exactly the same information and can be converted into one another
//! without loss.
//!
//! ## TAD file format
//!
//! A TAD file consists of header lines, each starting with `@`, followed by one record per
//! line. A single blank line may separate the two sections.
//!
//! ### Header lines
//!
//! | Line  | Fields                                      | Meaning                         |
//! | ----- | ------------------------------------------- | ------------------------------- |
//! | `@ID` | `FF:<format>` `VN:<major>.<minor>`          | Format name and version         |
//! | `@SQ` | `SN:<name>` `LN:<length>` `[attribute...]`  | One contig, in index order      |
//! | `@AD` | `ID:<id>` `SM:<sample>` `[attribute...]`    | One library, in index order     |
//! | `@CO` | free text                                   | Comment, carried but not parsed |
//!
//! ### Record lines
//!
//! ```text
//! <contig>\t<1-based position>\t<symbols>\t<library 0 depths>\t<library 1 depths>...
//! ```
//!
//! Each library column lists that library's depth for every symbol, in symbol order,
//! separated by commas. A leading `N` in the symbols marks an unknown reference base and has no
//! depth of its own. Symbols are read case-insensitively and written in upper case.
//!
//! ## Example
//!
//! ```text
//! @ID	FF:TAD	VN:0.1
//! @SQ	SN:scaffold_1	LN:100
//! @SQ	SN:scaffold_2	LN:200	M5:aaaaaaaa
//! @AD	ID:A	SM:A
//! @AD	ID:B	SM:B	LB:B	RG:B
//! @CO	This is a comment
//! scaffold_1	3	GC	6,0	0,2
//! scaffold_2	1	NAC	0,4	1,0
//! ```

mod codec;
mod header;
mod record;

pub use codec::TextCodec;
pub use header::{read_header, write_header, TAD_NAME};
pub use record::{Decoder, Encoder};
