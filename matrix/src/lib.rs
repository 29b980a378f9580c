//! Matrix library: dense factor matrices and compressed sparse storage.

#![no_std]

extern crate alloc;

use core::fmt::{Debug, Display, Formatter};

pub mod dense;
pub mod error;
pub mod pattern;
pub mod sparse;

pub use error::{InvalidFormat, SparseError};
pub use pattern::SparsityPattern;
pub use sparse::SparseFormat;

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl Debug for Dimensions {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

pub trait Matrix<T> {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }
}

/// A matrix whose columns are stored contiguously.
pub trait ColumnSlices<T>: Matrix<T> {
    fn col_slice(&self, c: usize) -> &[T];
}
