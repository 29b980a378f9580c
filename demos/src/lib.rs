//! Shared pieces of the demo drivers.

pub mod parsers;
