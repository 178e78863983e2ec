#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Polar decomposition of square matrices.
pub mod polar;
