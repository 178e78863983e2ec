//! Least-squares fitting of a similarity transform between two
//! corresponding point sets (Procrustes analysis).
//!
//! Point sets are n×d matrices with one point per row. The fitted map sends
//! source rows onto target rows as
//!
//! ```text
//! Y ≈ scale * X * R + 1ₙ tᵀ
//! ```
//!
//! or, per point written as a column vector, `y = scale * Rᵀ x + t`. The
//! translation is recovered from the uncentered centroids, so the source
//! centroid always maps exactly onto the target centroid regardless of how
//! well the rotation fits.

use faer::{Col, Mat, MatRef};
use procrustes_linalg::polar::{polar_dec, polar_svd};
use thiserror::Error;

/// Error type for Procrustes alignment operations.
#[derive(Debug, Error)]
pub enum ProcrustesError {
    /// Source and target point sets must contain the same number of points.
    #[error("Mismatched point counts: source has {source_points}, target has {target_points}")]
    MismatchedPointCounts {
        /// Number of rows in the source point set
        source_points: usize,
        /// Number of rows in the target point set
        target_points: usize,
    },

    /// Source and target points must have the same dimension.
    #[error("Mismatched point dimensions: source is {source_dim}-d, target is {target_dim}-d")]
    MismatchedDimensions {
        /// Column count of the source point set
        source_dim: usize,
        /// Column count of the target point set
        target_dim: usize,
    },

    /// Point sets must contain at least one point of dimension at least one.
    #[error("Point sets must contain at least one point of dimension >= 1")]
    EmptyPointSet,

    /// All centered source points coincide, so no scale can be estimated.
    #[error("Cannot estimate scale: centered source point set has zero norm")]
    DegenerateSource,

    /// The operation is only defined for points of a specific dimension.
    #[error("Operation requires {required}-dimensional points, got {actual}-dimensional")]
    InvalidDimension {
        /// Dimension required by the operation
        required: usize,
        /// Dimension of the points that were provided
        actual: usize,
    },
}

/// Flags selecting the family of transforms fitted by [`procrustes`].
///
/// The default fits a rigid transform: no scale estimation and a proper
/// rotation (classic Procrustes / Kabsch alignment).
#[derive(Debug, Clone, Default)]
pub struct ProcrustesParams {
    /// Estimate an isotropic scale factor. When `false` the scale is 1.
    pub include_scaling: bool,
    /// Allow the fitted orthogonal matrix to be a reflection (det = -1).
    pub include_reflections: bool,
}

/// Similarity transform fitted by [`procrustes`].
///
/// `rotation` multiplies row points from the right: the fitted map is
/// `Y ≈ scale * X * rotation + 1ₙ translationᵀ`.
#[derive(Debug, Clone)]
pub struct ProcrustesResult {
    /// Isotropic scale factor. Exactly 1 unless scaling was requested.
    pub scale: f64,
    /// Orthogonal d×d matrix; proper rotation unless reflections were allowed.
    pub rotation: Mat<f64>,
    /// Translation vector of length d.
    pub translation: Col<f64>,
}

/// Compute the centroid of a point set and subtract it from every row.
///
/// # Arguments
///
/// * `points` - An n×d point set, one point per row, n >= 1.
///
/// # Returns
///
/// The centroid (length-d column vector) and the mean-subtracted point set.
pub fn center_points(points: MatRef<f64>) -> (Col<f64>, Mat<f64>) {
    let num_points = points.nrows();
    let dim = points.ncols();

    let mut centroid = Col::<f64>::zeros(dim);
    for j in 0..dim {
        let mut sum = 0.0;
        for i in 0..num_points {
            sum += points.read(i, j);
        }
        centroid.write(j, sum / num_points as f64);
    }

    let centered = Mat::from_fn(num_points, dim, |i, j| points.read(i, j) - centroid.read(j));

    (centroid, centered)
}

/// Fit the similarity transform aligning `x` onto `y`.
///
/// Both point sets are n×d matrices with one point per row and a known
/// one-to-one correspondence: row i of `x` corresponds to row i of `y`.
/// The returned transform minimizes the sum of squared distances
/// `|scale * x * R + 1ₙ tᵀ - y|²` over the requested transform family.
///
/// # Arguments
///
/// * `x` - Source point set, n×d.
/// * `y` - Target point set, n×d.
/// * `params` - Flags selecting scale estimation and reflection support.
///
/// # Returns
///
/// The fitted [`ProcrustesResult`], or an error when the shapes disagree,
/// a set is empty, or scale estimation is requested for a source whose
/// points all coincide.
///
/// Example:
///
/// ```
/// use procrustes_align::align::{procrustes, ProcrustesParams};
///
/// let x = faer::mat![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
/// let y = faer::mat![[1.0, 1.0], [2.0, 1.0], [1.0, 2.0]];
/// let result = procrustes(x.as_ref(), y.as_ref(), &ProcrustesParams::default()).unwrap();
/// assert!((result.translation.read(0) - 1.0).abs() < 1e-8);
/// assert!((result.translation.read(1) - 1.0).abs() < 1e-8);
/// ```
pub fn procrustes(
    x: MatRef<f64>,
    y: MatRef<f64>,
    params: &ProcrustesParams,
) -> Result<ProcrustesResult, ProcrustesError> {
    if x.nrows() != y.nrows() {
        return Err(ProcrustesError::MismatchedPointCounts {
            source_points: x.nrows(),
            target_points: y.nrows(),
        });
    }
    if x.ncols() != y.ncols() {
        return Err(ProcrustesError::MismatchedDimensions {
            source_dim: x.ncols(),
            target_dim: y.ncols(),
        });
    }
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(ProcrustesError::EmptyPointSet);
    }

    let num_points = x.nrows() as f64;

    // center both sets around their centroids
    let (x_mean, mut xc) = center_points(x);
    let (y_mean, yc) = center_points(y);

    // isotropic scale as the ratio of average per-point magnitudes
    // (Frobenius norm over point count, not a true root mean square)
    let mut scale = 1.0;
    if params.include_scaling {
        let scale_x = xc.norm_l2() / num_points;
        let scale_y = yc.norm_l2() / num_points;
        if scale_x <= f64::EPSILON {
            return Err(ProcrustesError::DegenerateSource);
        }
        scale = scale_y / scale_x;
        for j in 0..xc.ncols() {
            for i in 0..xc.nrows() {
                xc.write(i, j, scale * xc.read(i, j));
            }
        }
    }

    // cross covariance between the centered sets
    let s = xc.transpose() * &yc;

    // best-fit orthogonal factor of the cross covariance
    let (rotation, _symmetric) = if params.include_reflections {
        polar_dec(s.as_ref())
    } else {
        polar_svd(s.as_ref())
    };

    // translation mapping the source centroid exactly onto the target centroid
    let translation = y_mean - faer::scale(scale) * (rotation.transpose() * x_mean);

    Ok(ProcrustesResult {
        scale,
        rotation,
        translation,
    })
}

/// Fit a rigid transform aligning `x` onto `y`.
///
/// Convenience form of [`procrustes`] with scaling and reflections both
/// disabled, the common case (classic Procrustes / Kabsch alignment).
pub fn procrustes_rigid(
    x: MatRef<f64>,
    y: MatRef<f64>,
) -> Result<ProcrustesResult, ProcrustesError> {
    procrustes(x, y, &ProcrustesParams::default())
}

/// Fit a similarity transform and fold the scale into the rotation.
///
/// Same fit as [`procrustes`], but the scale factor is pre-multiplied into
/// the returned matrix, for callers that want a single linear map plus
/// offset rather than a separate scale.
///
/// # Returns
///
/// The pair `(scale * rotation, translation)`.
pub fn procrustes_scaled_rotation(
    x: MatRef<f64>,
    y: MatRef<f64>,
    params: &ProcrustesParams,
) -> Result<(Mat<f64>, Col<f64>), ProcrustesError> {
    let ProcrustesResult {
        scale,
        rotation,
        translation,
    } = procrustes(x, y, params)?;
    Ok((faer::scale(scale) * rotation, translation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use faer::mat;

    #[test]
    fn test_center_points() {
        let points = mat![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let (centroid, centered) = center_points(points.as_ref());

        assert_relative_eq!(centroid.read(0), 3.0, epsilon = 1e-12);
        assert_relative_eq!(centroid.read(1), 4.0, epsilon = 1e-12);
        for j in 0..2 {
            let mut sum = 0.0;
            for i in 0..3 {
                sum += centered.read(i, j);
            }
            assert_relative_eq!(sum, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_procrustes_translation_only() {
        let x = mat![[0.0, 0.0], [1.0, 0.0], [0.0, 2.0]];
        let y = mat![[3.0, -1.0], [4.0, -1.0], [3.0, 1.0]];
        let result = procrustes_rigid(x.as_ref(), y.as_ref()).unwrap();

        assert_eq!(result.scale, 1.0);
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(result.rotation.read(i, j), expected, epsilon = 1e-8);
            }
        }
        assert_relative_eq!(result.translation.read(0), 3.0, epsilon = 1e-8);
        assert_relative_eq!(result.translation.read(1), -1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_procrustes_rotation_2d() {
        // target is the source rotated by 90 degrees counter-clockwise
        let x = mat![[1.0, 0.0], [-1.0, 0.0], [0.0, 2.0], [0.0, -2.0]];
        let angle = std::f64::consts::FRAC_PI_2;
        // row-convention right-multiplier for a ccw rotation
        let r0 = mat![[angle.cos(), angle.sin()], [-angle.sin(), angle.cos()]];
        let y = &x * &r0;

        let result = procrustes_rigid(x.as_ref(), y.as_ref()).unwrap();

        for i in 0..2 {
            for j in 0..2 {
                assert_relative_eq!(result.rotation.read(i, j), r0.read(i, j), epsilon = 1e-8);
            }
            assert_relative_eq!(result.translation.read(i), 0.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_procrustes_scale_default_is_exact() {
        let x = mat![[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]];
        let y = mat![[0.0, 0.0], [4.0, 0.0], [0.0, 4.0]];
        let result = procrustes_rigid(x.as_ref(), y.as_ref()).unwrap();

        // scaling was not requested, so the factor is exactly one
        assert_eq!(result.scale, 1.0);
    }

    #[test]
    fn test_procrustes_scaled_rotation_folds_scale() {
        let x = mat![[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]];
        let y = mat![[0.0, 0.0], [6.0, 0.0], [0.0, 6.0]];
        let params = ProcrustesParams {
            include_scaling: true,
            include_reflections: false,
        };
        let (scaled_rotation, _translation) =
            procrustes_scaled_rotation(x.as_ref(), y.as_ref(), &params).unwrap();

        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 3.0 } else { 0.0 };
                assert_relative_eq!(scaled_rotation.read(i, j), expected, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_procrustes_mismatched_rows() {
        let x = mat![[0.0, 0.0], [1.0, 0.0]];
        let y = mat![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let result = procrustes_rigid(x.as_ref(), y.as_ref());

        assert!(matches!(
            result,
            Err(ProcrustesError::MismatchedPointCounts {
                source_points: 2,
                target_points: 3,
            })
        ));
    }

    #[test]
    fn test_procrustes_mismatched_dims() {
        let x = mat![[0.0, 0.0], [1.0, 0.0]];
        let y = mat![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let result = procrustes_rigid(x.as_ref(), y.as_ref());

        assert!(matches!(
            result,
            Err(ProcrustesError::MismatchedDimensions {
                source_dim: 2,
                target_dim: 3,
            })
        ));
    }

    #[test]
    fn test_procrustes_empty_input() {
        let x = Mat::<f64>::zeros(0, 3);
        let y = Mat::<f64>::zeros(0, 3);
        let result = procrustes_rigid(x.as_ref(), y.as_ref());

        assert!(matches!(result, Err(ProcrustesError::EmptyPointSet)));
    }

    #[test]
    fn test_procrustes_degenerate_source_with_scaling() {
        // all source points coincide, so no scale can be estimated
        let x = mat![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let y = mat![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let params = ProcrustesParams {
            include_scaling: true,
            include_reflections: false,
        };
        let result = procrustes(x.as_ref(), y.as_ref(), &params);

        assert!(matches!(result, Err(ProcrustesError::DegenerateSource)));
    }

    #[test]
    fn test_procrustes_single_point() {
        // a single point pair aligns exactly through the translation
        let x = mat![[1.0, 2.0, 3.0]];
        let y = mat![[-4.0, 0.0, 5.0]];
        let result = procrustes_rigid(x.as_ref(), y.as_ref()).unwrap();

        let mapped = result.rotation.transpose() * faer::col![1.0, 2.0, 3.0] + result.translation;
        assert_relative_eq!(mapped.read(0), -4.0, epsilon = 1e-12);
        assert_relative_eq!(mapped.read(1), 0.0, epsilon = 1e-12);
        assert_relative_eq!(mapped.read(2), 5.0, epsilon = 1e-12);
    }
}
