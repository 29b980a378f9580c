use alloc::vec;
use alloc::vec::Vec;
use core::fmt::{Display, Formatter};
use core::slice;

use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::Matrix;
use crate::error::{InvalidFormat, SparseError, SparseResult};
use crate::pattern::SparsityPattern;

/// Which dimension a compressed pointer array runs over.
///
/// The discriminants are the integer codes host applications pass in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum SparseFormat {
    /// Compressed sparse column: outer slots are columns, inner indices are rows.
    Csc = 1,
    /// Compressed sparse row: outer slots are rows, inner indices are columns.
    Csr = 2,
}

impl SparseFormat {
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    #[inline]
    pub const fn outer_dim(self, nrows: usize, ncols: usize) -> usize {
        match self {
            Self::Csr => nrows,
            Self::Csc => ncols,
        }
    }

    #[inline]
    pub const fn inner_dim(self, nrows: usize, ncols: usize) -> usize {
        match self {
            Self::Csr => ncols,
            Self::Csc => nrows,
        }
    }
}

impl TryFrom<i32> for SparseFormat {
    type Error = InvalidFormat;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Csc),
            2 => Ok(Self::Csr),
            other => Err(InvalidFormat(other)),
        }
    }
}

impl Display for SparseFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Csc => f.write_str("CSC"),
            Self::Csr => f.write_str("CSR"),
        }
    }
}

/// A sparse matrix stored in the compressed sparse row format, laid out the way host
/// applications hand it over: signed 32-bit index arrays next to the values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix<T> {
    pub nrows: usize,
    pub ncols: usize,
    /// Row pointers, `nrows + 1` long.
    pub indptr: Vec<i32>,
    /// Column index of each nonzero.
    pub indices: Vec<i32>,
    pub values: Vec<T>,
}

/// A sparse matrix stored in the compressed sparse column format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CscMatrix<T> {
    pub nrows: usize,
    pub ncols: usize,
    /// Column pointers, `ncols + 1` long.
    pub indptr: Vec<i32>,
    /// Row index of each nonzero.
    pub indices: Vec<i32>,
    pub values: Vec<T>,
}

impl<T> CsrMatrix<T> {
    #[must_use]
    pub const fn new(
        nrows: usize,
        ncols: usize,
        indptr: Vec<i32>,
        indices: Vec<i32>,
        values: Vec<T>,
    ) -> Self {
        Self {
            nrows,
            ncols,
            indptr,
            indices,
            values,
        }
    }

    /// Build from `(row, col, value)` triplets, sorted by row and then by column.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: impl IntoIterator<Item = (usize, usize, T)>,
    ) -> SparseResult<Self> {
        let entries = triplets
            .into_iter()
            .map(|(row, col, value)| {
                if row < nrows && col < ncols {
                    Ok((row, col, value))
                } else {
                    Err(SparseError::TripletOutOfBounds {
                        row,
                        col,
                        nrows,
                        ncols,
                    })
                }
            })
            .collect::<SparseResult<Vec<_>>>()?;
        let (indptr, indices, values) = compress(nrows, ncols, entries)?;
        Ok(Self::new(nrows, ncols, indptr, indices, values))
    }

    /// A random pattern where each entry is present with probability `density`.
    pub fn rand<R: Rng>(
        rng: &mut R,
        nrows: usize,
        ncols: usize,
        density: f64,
    ) -> SparseResult<Self>
    where
        StandardUniform: Distribution<T>,
    {
        let as_index = |what: &'static str, value: usize| {
            i32::try_from(value).map_err(|_| SparseError::DimensionOverflow { what, value })
        };
        as_index("inner dimension", ncols)?;
        let density = density.clamp(0.0, 1.0);
        let mut indptr = Vec::with_capacity(nrows + 1);
        let mut indices = Vec::new();
        let mut values = Vec::new();
        indptr.push(0);
        for _ in 0..nrows {
            for col in 0..ncols {
                if rng.random_bool(density) {
                    indices.push(as_index("column index", col)?);
                    values.push(rng.random());
                }
            }
            indptr.push(as_index("nonzero count", indices.len())?);
        }
        Ok(Self::new(nrows, ncols, indptr, indices, values))
    }

    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Same pattern, new values.
    pub fn with_values<U>(&self, values: Vec<U>) -> SparseResult<CsrMatrix<U>> {
        check_values_len(self.nnz(), values.len())?;
        Ok(CsrMatrix::new(
            self.nrows,
            self.ncols,
            self.indptr.clone(),
            self.indices.clone(),
            values,
        ))
    }

    pub fn to_csc(&self) -> SparseResult<CscMatrix<T>>
    where
        T: Clone,
    {
        Ok(extract_csr(self)?.to_csc())
    }
}

impl<T> CscMatrix<T> {
    #[must_use]
    pub const fn new(
        nrows: usize,
        ncols: usize,
        indptr: Vec<i32>,
        indices: Vec<i32>,
        values: Vec<T>,
    ) -> Self {
        Self {
            nrows,
            ncols,
            indptr,
            indices,
            values,
        }
    }

    /// Build from `(row, col, value)` triplets, sorted by column and then by row.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: impl IntoIterator<Item = (usize, usize, T)>,
    ) -> SparseResult<Self> {
        let entries = triplets
            .into_iter()
            .map(|(row, col, value)| {
                if row < nrows && col < ncols {
                    Ok((col, row, value))
                } else {
                    Err(SparseError::TripletOutOfBounds {
                        row,
                        col,
                        nrows,
                        ncols,
                    })
                }
            })
            .collect::<SparseResult<Vec<_>>>()?;
        let (indptr, indices, values) = compress(ncols, nrows, entries)?;
        Ok(Self::new(nrows, ncols, indptr, indices, values))
    }

    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Same pattern, new values.
    pub fn with_values<U>(&self, values: Vec<U>) -> SparseResult<CscMatrix<U>> {
        check_values_len(self.nnz(), values.len())?;
        Ok(CscMatrix::new(
            self.nrows,
            self.ncols,
            self.indptr.clone(),
            self.indices.clone(),
            values,
        ))
    }

    pub fn to_csr(&self) -> SparseResult<CsrMatrix<T>>
    where
        T: Clone,
    {
        Ok(extract_csc(self)?.to_csr())
    }
}

impl<T> Matrix<T> for CsrMatrix<T> {
    fn width(&self) -> usize {
        self.ncols
    }

    fn height(&self) -> usize {
        self.nrows
    }
}

impl<T> Matrix<T> for CscMatrix<T> {
    fn width(&self) -> usize {
        self.ncols
    }

    fn height(&self) -> usize {
        self.nrows
    }
}

/// Read-only access to a compressed sparse matrix with unsigned, validated indices.
pub trait SparseView<T> {
    fn format(&self) -> SparseFormat;

    /// `(nrows, ncols)`.
    fn dims(&self) -> (usize, usize);

    fn outer_ptr(&self) -> &[u32];

    fn inner_index(&self) -> &[u32];

    fn values(&self) -> &[T];

    fn nnz(&self) -> usize {
        self.inner_index().len()
    }

    fn pattern(&self) -> SparsityPattern<'_> {
        let (nrows, ncols) = self.dims();
        SparsityPattern::new(nrows, ncols, self.outer_ptr(), self.inner_index())
    }
}

#[derive(Debug, PartialEq)]
struct Compressed<'a, T> {
    nrows: usize,
    ncols: usize,
    outer_ptr: &'a [u32],
    inner_index: &'a [u32],
    values: &'a [T],
}

impl<T> Clone for Compressed<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Compressed<'_, T> {}

impl<'a, T> Compressed<'a, T> {
    fn checked(
        format: SparseFormat,
        nrows: usize,
        ncols: usize,
        indptr: &'a [i32],
        indices: &'a [i32],
        values: &'a [T],
    ) -> SparseResult<Self> {
        check_values_len(indices.len(), values.len())?;
        let outer_ptr = as_unsigned("outer pointers", indptr)?;
        let inner_index = as_unsigned("inner indices", indices)?;
        SparsityPattern::new(nrows, ncols, outer_ptr, inner_index).validate(format)?;
        Ok(Self {
            nrows,
            ncols,
            outer_ptr,
            inner_index,
            values,
        })
    }

    fn outer_entries(&self, outer: usize) -> impl Iterator<Item = (usize, &'a T)> + use<'a, T> {
        let (inner_index, values): (&'a [u32], &'a [T]) = (self.inner_index, self.values);
        let range = self.outer_ptr[outer] as usize..self.outer_ptr[outer + 1] as usize;
        inner_index[range.clone()]
            .iter()
            .map(|&i| i as usize)
            .zip(&values[range])
    }

    fn find(&self, outer: usize, inner: usize) -> Option<&'a T> {
        self.outer_entries(outer)
            .find(|&(i, _)| i == inner)
            .map(|(_, v)| v)
    }

    /// Regroup the nonzeros by inner index; inner indices come out sorted within each run.
    fn transpose(&self, format: SparseFormat) -> (Vec<i32>, Vec<i32>, Vec<T>)
    where
        T: Clone,
    {
        let outer_dim = format.outer_dim(self.nrows, self.ncols);
        let inner_dim = format.inner_dim(self.nrows, self.ncols);
        let nnz = self.inner_index.len();

        let mut indptr = vec![0i32; inner_dim + 1];
        for &i in self.inner_index {
            indptr[i as usize + 1] += 1;
        }
        for k in 0..inner_dim {
            indptr[k + 1] += indptr[k];
        }

        let mut cursor: Vec<usize> = indptr[..inner_dim].iter().map(|&p| p as usize).collect();
        let mut indices = vec![0i32; nnz];
        let mut order = vec![0usize; nnz];
        for outer in 0..outer_dim {
            for pp in self.outer_ptr[outer] as usize..self.outer_ptr[outer + 1] as usize {
                let slot = &mut cursor[self.inner_index[pp] as usize];
                indices[*slot] = outer as i32;
                order[*slot] = pp;
                *slot += 1;
            }
        }
        let values = order.iter().map(|&pp| self.values[pp].clone()).collect();
        (indptr, indices, values)
    }
}

/// A borrowed, validated view of a [`CsrMatrix`].
#[derive(Debug, PartialEq)]
pub struct CsrView<'a, T>(Compressed<'a, T>);

/// A borrowed, validated view of a [`CscMatrix`].
#[derive(Debug, PartialEq)]
pub struct CscView<'a, T>(Compressed<'a, T>);

/// Expose a CSR matrix without copying, after checking its arrays once.
#[instrument(level = "debug", skip_all, fields(nrows = m.nrows, ncols = m.ncols, nnz = m.nnz()))]
pub fn extract_csr<T>(m: &CsrMatrix<T>) -> SparseResult<CsrView<'_, T>> {
    Compressed::checked(
        SparseFormat::Csr,
        m.nrows,
        m.ncols,
        &m.indptr,
        &m.indices,
        &m.values,
    )
    .map(CsrView)
}

/// Expose a CSC matrix without copying, after checking its arrays once.
#[instrument(level = "debug", skip_all, fields(nrows = m.nrows, ncols = m.ncols, nnz = m.nnz()))]
pub fn extract_csc<T>(m: &CscMatrix<T>) -> SparseResult<CscView<'_, T>> {
    Compressed::checked(
        SparseFormat::Csc,
        m.nrows,
        m.ncols,
        &m.indptr,
        &m.indices,
        &m.values,
    )
    .map(CscView)
}

impl<'a, T> CsrView<'a, T> {
    /// `(col, value)` pairs of row `r`, in storage order.
    pub fn sparse_row(&self, r: usize) -> impl Iterator<Item = (usize, &'a T)> + use<'a, T> {
        debug_assert!(r < self.0.nrows);
        self.0.outer_entries(r)
    }

    pub fn get(&self, r: usize, c: usize) -> Option<&'a T> {
        self.0.find(r, c)
    }

    #[instrument(level = "debug", skip_all, fields(nnz = self.nnz()))]
    pub fn to_csc(&self) -> CscMatrix<T>
    where
        T: Clone,
    {
        let (indptr, indices, values) = self.0.transpose(SparseFormat::Csr);
        CscMatrix::new(self.0.nrows, self.0.ncols, indptr, indices, values)
    }
}

impl<'a, T> CscView<'a, T> {
    /// `(row, value)` pairs of column `c`, in storage order.
    pub fn sparse_col(&self, c: usize) -> impl Iterator<Item = (usize, &'a T)> + use<'a, T> {
        debug_assert!(c < self.0.ncols);
        self.0.outer_entries(c)
    }

    pub fn get(&self, r: usize, c: usize) -> Option<&'a T> {
        self.0.find(c, r)
    }

    #[instrument(level = "debug", skip_all, fields(nnz = self.nnz()))]
    pub fn to_csr(&self) -> CsrMatrix<T>
    where
        T: Clone,
    {
        let (indptr, indices, values) = self.0.transpose(SparseFormat::Csc);
        CsrMatrix::new(self.0.nrows, self.0.ncols, indptr, indices, values)
    }
}

macro_rules! impl_sparse_view {
    ($view:ident, $format:expr) => {
        impl<T> Clone for $view<'_, T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $view<'_, T> {}

        impl<T> SparseView<T> for $view<'_, T> {
            fn format(&self) -> SparseFormat {
                $format
            }

            fn dims(&self) -> (usize, usize) {
                (self.0.nrows, self.0.ncols)
            }

            fn outer_ptr(&self) -> &[u32] {
                self.0.outer_ptr
            }

            fn inner_index(&self) -> &[u32] {
                self.0.inner_index
            }

            fn values(&self) -> &[T] {
                self.0.values
            }
        }

        impl<T> Matrix<T> for $view<'_, T> {
            fn width(&self) -> usize {
                self.0.ncols
            }

            fn height(&self) -> usize {
                self.0.nrows
            }
        }
    };
}

impl_sparse_view!(CsrView, SparseFormat::Csr);
impl_sparse_view!(CscView, SparseFormat::Csc);

fn check_values_len(nnz: usize, actual: usize) -> SparseResult<()> {
    if nnz == actual {
        Ok(())
    } else {
        Err(SparseError::ValuesLength {
            expected: nnz,
            actual,
        })
    }
}

/// Reinterpret host index storage as unsigned once every entry is known to be non-negative.
fn as_unsigned<'a>(array: &'static str, values: &'a [i32]) -> SparseResult<&'a [u32]> {
    if let Some(position) = values.iter().position(|&v| v < 0) {
        return Err(SparseError::NegativeIndex {
            array,
            position,
            value: values[position],
        });
    }
    // SAFETY: `i32` and `u32` have the same size and alignment, and every entry was just
    // checked to be non-negative, so each one reads back as the same number.
    Ok(unsafe { slice::from_raw_parts(values.as_ptr().cast::<u32>(), values.len()) })
}

/// Group `(outer, inner, value)` entries into compressed arrays, sorted by outer then inner.
fn compress<T>(
    outer_dim: usize,
    inner_dim: usize,
    mut entries: Vec<(usize, usize, T)>,
) -> SparseResult<(Vec<i32>, Vec<i32>, Vec<T>)> {
    for (what, value) in [
        ("outer dimension", outer_dim),
        ("inner dimension", inner_dim),
        ("nonzero count", entries.len()),
    ] {
        if value > i32::MAX as usize {
            return Err(SparseError::DimensionOverflow { what, value });
        }
    }

    entries.sort_by_key(|&(outer, inner, _)| (outer, inner));
    let mut indptr = vec![0i32; outer_dim + 1];
    let mut indices = Vec::with_capacity(entries.len());
    let mut values = Vec::with_capacity(entries.len());
    for (outer, inner, value) in entries {
        indptr[outer + 1] += 1;
        indices.push(inner as i32);
        values.push(value);
    }
    for k in 0..outer_dim {
        indptr[k + 1] += indptr[k];
    }
    Ok((indptr, indices, values))
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    /// ```text
    /// [ 1 . 2 ]
    /// [ . . . ]
    /// [ . 3 . ]
    /// ```
    fn sample_csr() -> CsrMatrix<f64> {
        CsrMatrix::new(3, 3, vec![0, 2, 2, 3], vec![0, 2, 1], vec![1.0, 2.0, 3.0])
    }

    #[test]
    fn format_codes_are_stable() {
        assert_eq!(SparseFormat::Csc.code(), 1);
        assert_eq!(SparseFormat::Csr.code(), 2);
        assert_eq!(SparseFormat::try_from(1), Ok(SparseFormat::Csc));
        assert_eq!(SparseFormat::try_from(2), Ok(SparseFormat::Csr));
        assert_eq!(SparseFormat::try_from(0), Err(InvalidFormat(0)));
        assert_eq!(SparseFormat::try_from(3), Err(InvalidFormat(3)));
        assert_eq!(
            InvalidFormat(3).to_string(),
            "unsupported sparse matrix format 3: expected CSC=1 or CSR=2"
        );
    }

    #[test]
    fn extract_csr_exposes_fields() {
        let m = sample_csr();
        let view = extract_csr(&m).unwrap();
        assert_eq!(view.format(), SparseFormat::Csr);
        assert_eq!(view.dims(), (3, 3));
        assert_eq!(view.nnz(), 3);
        assert_eq!(view.outer_ptr(), &[0, 2, 2, 3]);
        assert_eq!(view.inner_index(), &[0, 2, 1]);
        assert_eq!(view.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(view.get(0, 2), Some(&2.0));
        assert_eq!(view.get(1, 1), None);
        assert_eq!(view.sparse_row(1).count(), 0);
        assert!(core::ptr::eq(view.values().as_ptr(), m.values.as_ptr()));
    }

    #[test]
    fn extract_rejects_negative_indices() {
        let mut m = sample_csr();
        m.indices[1] = -4;
        assert_eq!(
            extract_csr(&m),
            Err(SparseError::NegativeIndex {
                array: "inner indices",
                position: 1,
                value: -4
            })
        );
    }

    #[test]
    fn extract_rejects_value_length_mismatch() {
        let mut m = sample_csr();
        m.values.pop();
        assert_eq!(
            extract_csr(&m),
            Err(SparseError::ValuesLength {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn extract_csc_uses_column_pointers() {
        // Two columns over three rows; column 0 holds rows 0 and 2.
        let m = CscMatrix::new(3, 2, vec![0, 2, 3], vec![0, 2, 1], vec![1, 2, 3]);
        let view = extract_csc(&m).unwrap();
        assert_eq!(view.format(), SparseFormat::Csc);
        assert_eq!(view.get(2, 0), Some(&2));
        assert_eq!(view.get(1, 1), Some(&3));
        assert_eq!(view.sparse_col(0).collect::<Vec<_>>(), vec![(0, &1), (2, &2)]);

        // Read as CSR the pointer array is one short.
        let as_csr = CsrMatrix::new(3, 2, m.indptr.clone(), m.indices.clone(), m.values.clone());
        assert!(matches!(
            extract_csr(&as_csr),
            Err(SparseError::PointerLength { .. })
        ));
    }

    #[test]
    fn csr_to_csc_keeps_every_entry() {
        let csr = sample_csr();
        let csc = csr.to_csc().unwrap();
        assert_eq!(csc.indptr, vec![0, 1, 2, 3]);
        assert_eq!(csc.indices, vec![0, 2, 0]);
        assert_eq!(csc.values, vec![1.0, 3.0, 2.0]);
        assert_eq!(csc.to_csr().unwrap(), csr);
    }

    #[test]
    fn random_template_rejects_unrepresentable_columns() {
        let mut rng = SmallRng::seed_from_u64(7);
        let too_wide = i32::MAX as usize + 1;
        assert_eq!(
            CsrMatrix::<f64>::rand(&mut rng, 0, too_wide, 0.5),
            Err(SparseError::DimensionOverflow {
                what: "inner dimension",
                value: too_wide
            })
        );
    }

    #[test]
    fn random_matrix_survives_conversion() {
        let mut rng = SmallRng::seed_from_u64(7);
        let csr = CsrMatrix::<u32>::rand(&mut rng, 40, 25, 0.2).unwrap();
        let csr_view = extract_csr(&csr).unwrap();
        let csc = csr.to_csc().unwrap();
        let csc_view = extract_csc(&csc).unwrap();
        assert_eq!(csc_view.nnz(), csr_view.nnz());
        for r in 0..csr.nrows {
            for (c, v) in csr_view.sparse_row(r) {
                assert_eq!(csc_view.get(r, c), Some(v));
            }
        }
    }

    #[test]
    fn from_triplets_sorts_entries() {
        let csr =
            CsrMatrix::from_triplets(2, 3, [(1, 2, 'c'), (0, 1, 'b'), (1, 0, 'a')]).unwrap();
        assert_eq!(csr.indptr, vec![0, 1, 3]);
        assert_eq!(csr.indices, vec![1, 0, 2]);
        assert_eq!(csr.values, vec!['b', 'a', 'c']);

        let csc =
            CscMatrix::from_triplets(2, 3, [(1, 2, 'c'), (0, 1, 'b'), (1, 0, 'a')]).unwrap();
        assert_eq!(csc.indptr, vec![0, 1, 2, 3]);
        assert_eq!(csc.indices, vec![1, 0, 1]);
        assert_eq!(csc.values, vec!['a', 'b', 'c']);
    }

    #[test]
    fn from_triplets_rejects_out_of_range() {
        assert_eq!(
            CsrMatrix::from_triplets(2, 2, [(0, 2, 1.0)]),
            Err(SparseError::TripletOutOfBounds {
                row: 0,
                col: 2,
                nrows: 2,
                ncols: 2
            })
        );
    }

    #[test]
    fn with_values_keeps_pattern() {
        let m = sample_csr();
        let doubled = m.with_values(vec![2.0, 4.0, 6.0]).unwrap();
        assert_eq!(doubled.indices, m.indices);
        assert_eq!(doubled.values, vec![2.0, 4.0, 6.0]);
        assert!(m.with_values(vec![0.0]).is_err());
    }
}
