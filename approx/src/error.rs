use sparsify_matrix::{InvalidFormat, SparseError};
use sparsify_maybe_rayon::ThreadPoolError;
use thiserror::Error;

/// Everything that can stop an approximation before any value is computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApproxError {
    #[error(transparent)]
    InvalidFormat(#[from] InvalidFormat),

    /// A factor matrix does not have one column per row (X) or per column (Y) of the pattern.
    #[error("factor {factor} has {actual} columns but the pattern has {expected} {axis}")]
    DimensionMismatch {
        factor: &'static str,
        axis: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("factors disagree on the latent dimension: X has {x} rows, Y has {y}")]
    LatentMismatch { x: usize, y: usize },

    #[error(
        "inner index {index} at position {position} is out of bounds for {bound} factor columns"
    )]
    IndexOutOfBounds {
        position: usize,
        index: u32,
        bound: usize,
    },

    #[error("malformed sparsity pattern: {0}")]
    MalformedPattern(SparseError),

    #[error(transparent)]
    ThreadPool(#[from] ThreadPoolError),
}

/// Out-of-range inner indices get their own variant whichever entry point found them.
impl From<SparseError> for ApproxError {
    fn from(err: SparseError) -> Self {
        match err {
            SparseError::IndexOutOfBounds {
                position,
                index,
                bound,
            } => Self::IndexOutOfBounds {
                position,
                index,
                bound,
            },
            other => Self::MalformedPattern(other),
        }
    }
}

pub type ApproxResult<T> = core::result::Result<T, ApproxError>;
