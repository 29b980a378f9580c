//! Parallel iteration that degrades to plain iterators when the `parallel` feature is off.
//!
//! Code written against [`prelude`] compiles in both modes: with `parallel` the names resolve to
//! rayon, otherwise to thin shims over `core::iter`.

#![no_std]

extern crate alloc;

mod pool;

pub use pool::{ThreadPoolError, current_num_threads, install};

#[cfg(feature = "parallel")]
pub mod prelude {
    pub use rayon::prelude::*;
}

#[cfg(not(feature = "parallel"))]
mod serial;

#[cfg(not(feature = "parallel"))]
pub mod prelude {
    pub use core::iter::{
        ExactSizeIterator as IndexedParallelIterator, Iterator as ParallelIterator,
    };

    pub use super::serial::*;
}
