//! Genomic locations and the record cursor
//!
//! A [`Location`] packs a 0-based contig index and a 0-based position into a single ordered
//! scalar: the contig occupies the upper 32 bits and the position the lower 32 bits, so
//! locations compare by contig first and then by position.

use std::fmt;

/// A (contig, position) pair packed into one totally ordered scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Location(u64);
impl Location {
    /// Creates a location from a 0-based contig index and a 0-based position
    #[must_use]
    pub const fn new(contig: u32, position: u32) -> Self {
        Self(((contig as u64) << 32) | position as u64)
    }

    /// Reinterprets a raw ordinal as a location
    #[must_use]
    pub const fn from_ordinal(ordinal: u64) -> Self {
        Self(ordinal)
    }

    /// The raw ordinal of this location
    #[must_use]
    pub const fn ordinal(self) -> u64 {
        self.0
    }

    /// The 0-based contig index
    #[must_use]
    pub const fn contig(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// The 0-based position within the contig
    #[must_use]
    pub const fn position(self) -> u32 {
        self.0 as u32
    }

    /// Splits the location back into `(contig, position)`
    #[must_use]
    pub const fn decompose(self) -> (u32, u32) {
        (self.contig(), self.position())
    }
}
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.contig(), self.position())
    }
}

/// Packs a 0-based contig index and a 0-based position into a [`Location`]
#[must_use]
pub const fn make_location(contig: u32, position: u32) -> Location {
    Location::new(contig, position)
}

/// Splits a [`Location`] back into its `(contig, position)` pair
#[must_use]
pub const fn decompose(location: Location) -> (u32, u32) {
    location.decompose()
}

/// The last location transferred through a stream
///
/// A fresh cursor sits at a sentinel that precedes every valid location. The binary codec uses
/// it to delta-encode consecutive locations within a contig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct LocationCursor {
    last: Option<Location>,
}
impl LocationCursor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last location, or `None` while the cursor is at the sentinel
    #[must_use]
    pub fn last(&self) -> Option<Location> {
        self.last
    }

    /// Whether no location has been transferred since the last reset
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.last.is_none()
    }

    /// Records a successfully transferred location
    pub fn advance(&mut self, location: Location) {
        self.last = Some(location);
    }

    /// Moves the cursor back to the sentinel
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for (contig, position) in [(0, 0), (1, 9), (2, 100), (7, u32::MAX), (u32::MAX, 3)] {
            let location = make_location(contig, position);
            assert_eq!(decompose(location), (contig, position));
            assert_eq!(Location::from_ordinal(location.ordinal()), location);
        }
    }

    #[test]
    fn test_order_is_contig_then_position() {
        assert!(make_location(0, u32::MAX) < make_location(1, 0));
        assert!(make_location(1, 9) < make_location(1, 10));
        assert_eq!(make_location(1, 0).ordinal(), 1 << 32);
    }

    #[test]
    fn test_cursor_sentinel_precedes_everything() {
        let mut cursor = LocationCursor::new();
        assert!(cursor.is_sentinel());

        let mut advanced = LocationCursor::new();
        advanced.advance(make_location(0, 0));
        assert!(cursor < advanced);

        cursor.advance(make_location(3, 4));
        assert_eq!(cursor.last(), Some(make_location(3, 4)));
        cursor.reset();
        assert!(cursor.is_sentinel());
    }
}
