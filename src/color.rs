//! Allele colors
//!
//! A [`Color`] is a 7-bit rank identifying which nucleotides were observed at a site and in
//! which order. Ranks `0..64` enumerate every ordered arrangement of one to four distinct
//! symbols from `ACGT`, grouped by length and sorted lexicographically within each group.
//! Ranks `64..128` repeat the same arrangements behind a leading `N`, which marks an unknown
//! reference base and is not itself counted as an allele.
//!
//! The rank, not the letters, is what the binary format persists, so the table below is shared
//! verbatim by every reader and writer.

use std::fmt;

/// Number of distinct colors
pub const NUM_COLORS: usize = 128;

/// Offset of the `N`-prefixed variants
const N_FLAG: u8 = 64;

/// Symbol strings for every color, indexed by rank
#[rustfmt::skip]
const LABELS: [&str; NUM_COLORS] = [
    "A", "C", "G", "T", "AC", "AG", "AT", "CA",
    "CG", "CT", "GA", "GC", "GT", "TA", "TC", "TG",
    "ACG", "ACT", "AGC", "AGT", "ATC", "ATG", "CAG", "CAT",
    "CGA", "CGT", "CTA", "CTG", "GAC", "GAT", "GCA", "GCT",
    "GTA", "GTC", "TAC", "TAG", "TCA", "TCG", "TGA", "TGC",
    "ACGT", "ACTG", "AGCT", "AGTC", "ATCG", "ATGC", "CAGT", "CATG",
    "CGAT", "CGTA", "CTAG", "CTGA", "GACT", "GATC", "GCAT", "GCTA",
    "GTAC", "GTCA", "TACG", "TAGC", "TCAG", "TCGA", "TGAC", "TGCA",
    "NA", "NC", "NG", "NT", "NAC", "NAG", "NAT", "NCA",
    "NCG", "NCT", "NGA", "NGC", "NGT", "NTA", "NTC", "NTG",
    "NACG", "NACT", "NAGC", "NAGT", "NATC", "NATG", "NCAG", "NCAT",
    "NCGA", "NCGT", "NCTA", "NCTG", "NGAC", "NGAT", "NGCA", "NGCT",
    "NGTA", "NGTC", "NTAC", "NTAG", "NTCA", "NTCG", "NTGA", "NTGC",
    "NACGT", "NACTG", "NAGCT", "NAGTC", "NATCG", "NATGC", "NCAGT", "NCATG",
    "NCGAT", "NCGTA", "NCTAG", "NCTGA", "NGACT", "NGATC", "NGCAT", "NGCTA",
    "NGTAC", "NGTCA", "NTACG", "NTAGC", "NTCAG", "NTCGA", "NTGAC", "NTGCA",
];

/// Size of the reverse lookup table: four base-5 digits
const KEY_SPACE: usize = 625;

/// Marks keys that do not correspond to any color
const NO_COLOR: u8 = u8::MAX;

/// Digit of a nucleotide in a lookup key, or 0 for anything else
const fn digit(symbol: u8) -> usize {
    match symbol {
        b'A' | b'a' => 1,
        b'C' | b'c' => 2,
        b'G' | b'g' => 3,
        b'T' | b't' => 4,
        _ => 0,
    }
}

/// Lookup key of an `ACGT` arrangement, or `None` if it holds any other symbol
const fn key(symbols: &[u8]) -> Option<usize> {
    if symbols.is_empty() || symbols.len() > 4 {
        return None;
    }
    let mut k = 0;
    let mut i = 0;
    while i < symbols.len() {
        let d = digit(symbols[i]);
        if d == 0 {
            return None;
        }
        k = k * 5 + d;
        i += 1;
    }
    Some(k)
}

const fn build_ranks() -> [u8; KEY_SPACE] {
    let mut ranks = [NO_COLOR; KEY_SPACE];
    let mut rank = 0;
    while rank < N_FLAG as usize {
        if let Some(k) = key(LABELS[rank].as_bytes()) {
            ranks[k] = rank as u8;
        }
        rank += 1;
    }
    ranks
}

/// Reverse of [`LABELS`] for the `ACGT` arrangements
static RANKS: [u8; KEY_SPACE] = build_ranks();

/// The rank of an ordered subset of nucleotide symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Color(u8);
impl Color {
    /// Creates a color from its rank, returning `None` for ranks outside `0..128`
    #[must_use]
    pub const fn new(rank: u8) -> Option<Self> {
        if (rank as usize) < NUM_COLORS {
            Some(Self(rank))
        } else {
            None
        }
    }

    /// Creates a color from the low 7 bits of `bits`
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self((bits & 0x7F) as u8)
    }

    /// The rank of this color
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.0
    }

    /// Whether the arrangement is preceded by an `N`
    #[must_use]
    pub const fn has_n(self) -> bool {
        self.0 >= N_FLAG
    }

    /// Number of alleles, i.e. symbols excluding a leading `N`
    #[must_use]
    pub fn alleles(self) -> usize {
        let label = LABELS[self.0 as usize].len();
        if self.has_n() {
            label - 1
        } else {
            label
        }
    }

    /// Upper-case symbol string, including a leading `N` if present
    #[must_use]
    pub fn symbols(self) -> &'static str {
        LABELS[self.0 as usize]
    }

    /// The allele symbols without a leading `N`
    #[must_use]
    pub fn allele_symbols(self) -> &'static str {
        LABELS[(self.0 % N_FLAG) as usize]
    }

    /// Looks up the color of an ordered symbol string
    ///
    /// Matching is case-insensitive. An optional leading `N` selects the `N` variant; it must be
    /// followed by one to four distinct `ACGT` symbols.
    #[must_use]
    pub fn from_symbols(symbols: &[u8]) -> Option<Self> {
        let (offset, alleles) = match symbols.split_first() {
            Some((b'N' | b'n', rest)) => (N_FLAG, rest),
            _ => (0, symbols),
        };
        let rank = RANKS[key(alleles)?];
        if rank == NO_COLOR {
            None
        } else {
            Some(Self(rank + offset))
        }
    }
}
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbols())
    }
}
impl From<Color> for u8 {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// Number of alleles described by `color`
#[must_use]
pub fn allele_count(color: Color) -> usize {
    color.alleles()
}

/// Ordered symbols of `color`
#[must_use]
pub fn symbols(color: Color) -> &'static str {
    color.symbols()
}

/// Color of an ordered symbol sequence
#[must_use]
pub fn color_of(symbols: &str) -> Option<Color> {
    Color::from_symbols(symbols.as_bytes())
}

#[cfg(test)]
mod testing {
    use super::*;

    fn color(rank: u8) -> Color {
        Color::new(rank).unwrap()
    }

    #[test]
    fn test_known_ranks() {
        assert_eq!(color_of("A"), Some(color(0)));
        assert_eq!(color_of("C"), Some(color(1)));
        assert_eq!(color_of("T"), Some(color(3)));
        assert_eq!(color_of("AC"), Some(color(4)));
        assert_eq!(color_of("AG"), Some(color(5)));
        assert_eq!(color_of("GC"), Some(color(11)));
        assert_eq!(color_of("TGCA"), Some(color(63)));
        assert_eq!(color_of("NAC"), Some(color(68)));
        assert_eq!(color_of("NTGCA"), Some(color(127)));
    }

    #[test]
    fn test_symbols_are_inverse_of_color_of() {
        for rank in 0..NUM_COLORS as u8 {
            let c = color(rank);
            assert_eq!(color_of(symbols(c)), Some(c));
            assert_eq!(color_of(&symbols(c).to_lowercase()), Some(c));
        }
    }

    #[test]
    fn test_allele_counts() {
        let counts: Vec<usize> = (0..64).map(|r| allele_count(color(r))).collect();
        assert!(counts[..4].iter().all(|&n| n == 1));
        assert!(counts[4..16].iter().all(|&n| n == 2));
        assert!(counts[16..40].iter().all(|&n| n == 3));
        assert!(counts[40..].iter().all(|&n| n == 4));
        assert_eq!(allele_count(color(68)), 2);
        assert_eq!(allele_count(color(127)), 4);
    }

    #[test]
    fn test_n_variants() {
        let c = color(68);
        assert!(c.has_n());
        assert_eq!(c.symbols(), "NAC");
        assert_eq!(c.allele_symbols(), "AC");
        assert!(!color(4).has_n());
    }

    #[test]
    fn test_rejects_invalid_symbols() {
        for s in ["", "N", "AA", "ACGTA", "NN", "AN", "X", "ACGN"] {
            assert_eq!(color_of(s), None, "{s:?}");
        }
        assert_eq!(Color::new(128), None);
    }
}
