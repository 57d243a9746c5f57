//! # adfile
//!
//! Lossless storage of per-library allele depths at genomic sites.
//!
//! Every record holds a [`Location`], a [`Color`] naming the observed alleles, and one depth per
//! allele and library. Two interchangeable representations are provided:
//!
//! - [`ad`]: a compact binary stream built on the NTF8 variable-length integers of [`ntf8`],
//!   with locations delta-coded against the previous record
//! - [`tad`]: a tab-delimited text stream meant for inspection and hand editing
//!
//! Most users go through [`AdFile`], which pairs either codec with a header and a transport.

pub mod ad;
mod codec;
mod color;
mod error;
mod file;
mod header;
mod location;
pub mod ntf8;
mod record;
pub mod tad;

pub use codec::{Codec, Format};
pub use color::{allele_count, color_of, symbols, Color, NUM_COLORS};
pub use error::{Error, HeaderError, IntegerError, OrderError, RecordError, Result, StreamError};
pub use file::{AdFile, AdFileBuilder, Mode, Records, Scheme};
pub use header::{Contig, FormatId, Header, Library, FORMAT_VERSION};
pub use location::{decompose, make_location, Location, LocationCursor};
pub use record::AlleleDepths;
