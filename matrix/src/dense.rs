use alloc::vec::Vec;

use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use serde::{Deserialize, Serialize};

use crate::{ColumnSlices, Matrix};

/// A dense matrix stored in column-major form.
///
/// Column `c` occupies `values[c * height..(c + 1) * height]`, so a latent factor vector is a
/// plain slice. The width is stored rather than derived, so a matrix with no latent factors
/// still knows how many columns it has.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColMajorMatrix<T> {
    /// All values, stored in column-major order.
    pub values: Vec<T>,
    pub width: usize,
    pub height: usize,
}

impl<T> ColMajorMatrix<T> {
    /// # Panics
    /// Panics if `height` is zero or does not divide `values.len()`.
    #[must_use]
    pub fn new(values: Vec<T>, height: usize) -> Self {
        assert!(height > 0, "use `from_parts` to build a matrix with zero height");
        assert_eq!(values.len() % height, 0, "values do not fill whole columns");
        let width = values.len() / height;
        Self {
            values,
            width,
            height,
        }
    }

    /// # Panics
    /// Panics if `values.len() != width * height`.
    #[must_use]
    pub fn from_parts(values: Vec<T>, width: usize, height: usize) -> Self {
        assert_eq!(values.len(), width * height, "values do not match the shape");
        Self {
            values,
            width,
            height,
        }
    }

    /// Build from values laid out row by row, each row `width` long.
    ///
    /// # Panics
    /// Panics if `width` is zero or does not divide `values.len()`.
    #[must_use]
    pub fn from_row_major(values: &[T], width: usize) -> Self
    where
        T: Clone,
    {
        assert!(width > 0, "row-major input needs a nonzero width");
        assert_eq!(values.len() % width, 0, "values do not fill whole rows");
        let height = values.len() / width;
        let values = (0..width)
            .flat_map(|c| (0..height).map(move |r| values[r * width + c].clone()))
            .collect();
        Self {
            values,
            width,
            height,
        }
    }

    pub fn col(&self, c: usize) -> &[T] {
        debug_assert!(c < self.width);
        &self.values[c * self.height..(c + 1) * self.height]
    }

    #[must_use]
    pub fn as_view(&self) -> ColMajorMatrixView<'_, T> {
        ColMajorMatrixView {
            values: &self.values,
            width: self.width,
            height: self.height,
        }
    }

    pub fn get(&self, r: usize, c: usize) -> &T {
        debug_assert!(r < self.height);
        &self.values[c * self.height + r]
    }

    pub fn rand<R: Rng>(rng: &mut R, rows: usize, cols: usize) -> Self
    where
        StandardUniform: Distribution<T>,
    {
        let values = rng.sample_iter(StandardUniform).take(rows * cols).collect();
        Self {
            values,
            width: cols,
            height: rows,
        }
    }
}

impl<T> Matrix<T> for ColMajorMatrix<T> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }
}

impl<T> ColumnSlices<T> for ColMajorMatrix<T> {
    fn col_slice(&self, c: usize) -> &[T] {
        self.col(c)
    }
}

/// A borrowed column-major matrix, e.g. over a buffer owned by a host application.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColMajorMatrixView<'a, T> {
    values: &'a [T],
    width: usize,
    height: usize,
}

impl<'a, T> ColMajorMatrixView<'a, T> {
    /// # Panics
    /// Panics if `height` is zero or does not divide `values.len()`.
    #[must_use]
    pub fn new(values: &'a [T], height: usize) -> Self {
        assert!(height > 0, "use `from_parts` to view a matrix with zero height");
        assert_eq!(values.len() % height, 0, "values do not fill whole columns");
        Self {
            values,
            width: values.len() / height,
            height,
        }
    }

    /// # Panics
    /// Panics if `values.len() != width * height`.
    #[must_use]
    pub fn from_parts(values: &'a [T], width: usize, height: usize) -> Self {
        assert_eq!(values.len(), width * height, "values do not match the shape");
        Self {
            values,
            width,
            height,
        }
    }

    pub fn col(&self, c: usize) -> &'a [T] {
        debug_assert!(c < self.width);
        &self.values[c * self.height..(c + 1) * self.height]
    }

    pub fn to_col_major_matrix(self) -> ColMajorMatrix<T>
    where
        T: Clone,
    {
        ColMajorMatrix::from_parts(self.values.to_vec(), self.width, self.height)
    }
}

impl<T> Matrix<T> for ColMajorMatrixView<'_, T> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }
}

impl<T> ColumnSlices<T> for ColMajorMatrixView<'_, T> {
    fn col_slice(&self, c: usize) -> &[T] {
        self.col(c)
    }
}
