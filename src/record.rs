use crate::{
    color::Color,
    error::{RecordError, Result},
    location::{make_location, Location},
};

/// Read depths observed at one site across all libraries
///
/// Depths are stored allele-major, library-minor: the depth of allele `a` in library `l` is
/// `data[a * num_libraries + l]`. The number of depths must always be
/// `color.alleles() * num_libraries`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlleleDepths {
    location: Location,
    color: Color,
    num_libraries: usize,
    data: Vec<i32>,
}
impl AlleleDepths {
    /// Creates a record, checking that `data` matches the shape implied by `color`
    pub fn new(
        location: Location,
        color: Color,
        num_libraries: usize,
        data: Vec<i32>,
    ) -> Result<Self> {
        let record = Self {
            location,
            color,
            num_libraries,
            data,
        };
        record.validate()?;
        Ok(record)
    }

    /// Reshapes the record for `color` and `num_libraries`, zero-filling the depths
    pub fn resize(&mut self, color: Color, num_libraries: usize) {
        self.color = color;
        self.num_libraries = num_libraries;
        self.data.clear();
        self.data.resize(color.alleles() * num_libraries, 0);
    }

    /// Checks the `alleles * libraries` shape invariant
    pub fn validate(&self) -> Result<()> {
        let expected = self.expected_len();
        if self.data.len() == expected {
            Ok(())
        } else {
            Err(RecordError::DataLength {
                expected,
                got: self.data.len(),
            }
            .into())
        }
    }

    fn expected_len(&self) -> usize {
        self.color.alleles() * self.num_libraries
    }

    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    pub fn set_location(&mut self, contig: u32, position: u32) {
        self.location = make_location(contig, position);
    }

    pub(crate) fn set_raw_location(&mut self, location: Location) {
        self.location = location;
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    #[must_use]
    pub fn num_libraries(&self) -> usize {
        self.num_libraries
    }

    #[must_use]
    pub fn num_alleles(&self) -> usize {
        self.color.alleles()
    }

    #[must_use]
    pub fn data(&self) -> &[i32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [i32] {
        &mut self.data
    }

    /// Depths of one allele across all libraries
    ///
    /// # Panics
    ///
    /// Panics if `allele` is out of range
    #[must_use]
    pub fn allele(&self, allele: usize) -> &[i32] {
        let start = allele * self.num_libraries;
        &self.data[start..start + self.num_libraries]
    }

    /// Depth of `allele` in `library`
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range
    #[must_use]
    pub fn depth(&self, allele: usize, library: usize) -> i32 {
        assert!(library < self.num_libraries);
        self.data[allele * self.num_libraries + library]
    }
}
