//! Sparse approximation of a low-rank factor product.
//!
//! Given factors `X` (`k x nrows`) and `Y` (`k x ncols`), only the entries of `Xᵀ Y` that lie on
//! the nonzero pattern of a CSR or CSC template are computed, one dot product per nonzero.

#![no_std]

extern crate alloc;

mod approx;
mod config;
mod dot;
mod error;

pub use approx::*;
pub use config::*;
pub use dot::*;
pub use error::*;
