use core::ops::Range;

use tracing::instrument;

use crate::error::{SparseError, SparseResult};
use crate::sparse::SparseFormat;

/// The nonzero positions of a compressed sparse matrix, without its values.
///
/// Whether `outer_ptr` runs over rows or columns is decided by the [`SparseFormat`] the pattern
/// is read with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SparsityPattern<'a> {
    pub nrows: usize,
    pub ncols: usize,
    /// `outer_ptr[k]..outer_ptr[k + 1]` is the run of `inner_index` owned by outer slot `k`.
    pub outer_ptr: &'a [u32],
    pub inner_index: &'a [u32],
}

impl<'a> SparsityPattern<'a> {
    #[must_use]
    pub const fn new(
        nrows: usize,
        ncols: usize,
        outer_ptr: &'a [u32],
        inner_index: &'a [u32],
    ) -> Self {
        Self {
            nrows,
            ncols,
            outer_ptr,
            inner_index,
        }
    }

    #[inline]
    pub const fn nnz(&self) -> usize {
        self.inner_index.len()
    }

    #[inline]
    pub const fn outer_dim(&self, format: SparseFormat) -> usize {
        format.outer_dim(self.nrows, self.ncols)
    }

    #[inline]
    pub const fn inner_dim(&self, format: SparseFormat) -> usize {
        format.inner_dim(self.nrows, self.ncols)
    }

    /// Positions of the nonzeros belonging to outer slot `outer`.
    #[inline]
    pub fn outer_range(&self, outer: usize) -> Range<usize> {
        self.outer_ptr[outer] as usize..self.outer_ptr[outer + 1] as usize
    }

    /// The same arrays read with rows and columns swapped.
    ///
    /// The CSR arrays of a matrix are exactly the CSC arrays of its transpose, so this costs
    /// nothing.
    #[must_use]
    pub const fn transposed(&self) -> Self {
        Self {
            nrows: self.ncols,
            ncols: self.nrows,
            outer_ptr: self.outer_ptr,
            inner_index: self.inner_index,
        }
    }

    /// Check the pointer array shape and that every inner index is in range.
    ///
    /// Runs on the calling thread; the first offending entry is the one reported.
    #[instrument(level = "debug", skip_all, fields(format = %format, nnz = self.nnz()))]
    pub fn validate(&self, format: SparseFormat) -> SparseResult<()> {
        self.validate_pointers(format)?;
        self.validate_inner_indices(format)
    }

    fn validate_pointers(&self, format: SparseFormat) -> SparseResult<()> {
        let expected = self.outer_dim(format) + 1;
        if self.outer_ptr.len() != expected {
            return Err(SparseError::PointerLength {
                expected,
                actual: self.outer_ptr.len(),
            });
        }
        if self.outer_ptr[0] != 0 {
            return Err(SparseError::PointerStart {
                value: self.outer_ptr[0],
            });
        }
        if let Some((outer, w)) = self
            .outer_ptr
            .windows(2)
            .enumerate()
            .find(|(_, w)| w[0] > w[1])
        {
            return Err(SparseError::PointerDecreasing {
                outer,
                start: w[0],
                end: w[1],
            });
        }
        let last = self.outer_ptr[expected - 1];
        if last as usize != self.nnz() {
            return Err(SparseError::NnzMismatch {
                last,
                nnz: self.nnz(),
            });
        }
        Ok(())
    }

    fn validate_inner_indices(&self, format: SparseFormat) -> SparseResult<()> {
        let bound = self.inner_dim(format);
        match self
            .inner_index
            .iter()
            .position(|&index| index as usize >= bound)
        {
            Some(position) => Err(SparseError::IndexOutOfBounds {
                position,
                index: self.inner_index[position],
                bound,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_csr_passes() {
        let p = SparsityPattern::new(3, 4, &[0, 3, 3, 4], &[0, 1, 3, 2]);
        assert_eq!(p.validate(SparseFormat::Csr), Ok(()));
        assert_eq!(p.outer_range(0), 0..3);
        assert!(p.outer_range(1).is_empty());
        assert_eq!(p.outer_range(2), 3..4);
    }

    #[test]
    fn transposed_reads_as_other_format() {
        let p = SparsityPattern::new(3, 4, &[0, 3, 3, 4], &[0, 1, 3, 2]);
        let t = p.transposed();
        assert_eq!((t.nrows, t.ncols), (4, 3));
        assert_eq!(t.validate(SparseFormat::Csc), Ok(()));
        assert_eq!(t.outer_dim(SparseFormat::Csc), p.outer_dim(SparseFormat::Csr));
    }

    #[test]
    fn pointer_length_follows_format() {
        let p = SparsityPattern::new(2, 3, &[0, 1, 2], &[0, 2]);
        assert_eq!(p.validate(SparseFormat::Csr), Ok(()));
        assert_eq!(
            p.validate(SparseFormat::Csc),
            Err(SparseError::PointerLength {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn rejects_bad_pointers() {
        let start = SparsityPattern::new(1, 1, &[1, 1], &[0]);
        assert_eq!(
            start.validate(SparseFormat::Csr),
            Err(SparseError::PointerStart { value: 1 })
        );

        let decreasing = SparsityPattern::new(2, 2, &[0, 2, 1], &[0, 1]);
        assert_eq!(
            decreasing.validate(SparseFormat::Csr),
            Err(SparseError::PointerDecreasing {
                outer: 1,
                start: 2,
                end: 1
            })
        );

        let short = SparsityPattern::new(2, 2, &[0, 1, 1], &[0, 1]);
        assert_eq!(
            short.validate(SparseFormat::Csr),
            Err(SparseError::NnzMismatch { last: 1, nnz: 2 })
        );
    }

    #[test]
    fn rejects_out_of_range_inner_index() {
        // Column 2 does not exist in a 2x2 matrix.
        let p = SparsityPattern::new(2, 2, &[0, 1, 2], &[0, 2]);
        assert_eq!(
            p.validate(SparseFormat::Csr),
            Err(SparseError::IndexOutOfBounds {
                position: 1,
                index: 2,
                bound: 2
            })
        );
    }

    #[test]
    fn reports_first_out_of_range_inner_index() {
        let mut inner: alloc::vec::Vec<u32> = (0..4096).map(|i| i % 8).collect();
        for (position, index) in [(1000, 9), (17, 12), (4000, 8), (2500, 100)] {
            inner[position] = index;
        }
        let outer = [0, 4096];
        let p = SparsityPattern::new(1, 8, &outer, &inner);
        assert_eq!(
            p.validate(SparseFormat::Csr),
            Err(SparseError::IndexOutOfBounds {
                position: 17,
                index: 12,
                bound: 8
            })
        );
    }

    #[test]
    fn empty_pattern_is_valid() {
        let p = SparsityPattern::new(3, 0, &[0, 0, 0, 0], &[]);
        assert_eq!(p.validate(SparseFormat::Csr), Ok(()));
        assert_eq!(p.nnz(), 0);
    }
}
