//! Errors raised while reading or validating compressed sparse storage.

use thiserror::Error;

/// A format discriminator that is neither CSC nor CSR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported sparse matrix format {0}: expected CSC=1 or CSR=2")]
pub struct InvalidFormat(pub i32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SparseError {
    /// A signed index array handed over by the host holds a negative entry.
    #[error("negative entry {value} in {array} at position {position}")]
    NegativeIndex {
        array: &'static str,
        position: usize,
        value: i32,
    },

    #[error("outer pointer array has length {actual}, expected {expected} (outer dimension + 1)")]
    PointerLength { expected: usize, actual: usize },

    #[error("outer pointer array must start at 0, found {value}")]
    PointerStart { value: u32 },

    #[error("outer pointer array decreases at outer index {outer}: {start} > {end}")]
    PointerDecreasing { outer: usize, start: u32, end: u32 },

    #[error("outer pointer array ends at {last} but there are {nnz} inner indices")]
    NnzMismatch { last: u32, nnz: usize },

    #[error("inner index {index} at position {position} is out of bounds for inner dimension {bound}")]
    IndexOutOfBounds {
        position: usize,
        index: u32,
        bound: usize,
    },

    #[error("value array has length {actual}, expected {expected} (one per nonzero)")]
    ValuesLength { expected: usize, actual: usize },

    #[error("{what} {value} does not fit in a 32-bit signed index")]
    DimensionOverflow { what: &'static str, value: usize },

    #[error("triplet ({row}, {col}) lies outside a {nrows}x{ncols} matrix")]
    TripletOutOfBounds {
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    },
}

pub type SparseResult<T> = core::result::Result<T, SparseError>;
