#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Similarity and rigid alignment of corresponding point sets.
pub mod align;

/// Assembly of fitted alignments into transform representations.
pub mod transforms;

pub use align::{
    procrustes, procrustes_rigid, procrustes_scaled_rotation, ProcrustesError, ProcrustesParams,
    ProcrustesResult,
};
pub use transforms::{
    homogeneous_matrix, procrustes_rotation2d, procrustes_transform, transform_points,
};
