//! Assembly of a fitted alignment into other transform representations:
//! a homogeneous matrix, a 2-D rotation angle, or transformed points.

use faer::{Col, Mat, MatRef};

use crate::align::{
    procrustes, procrustes_rigid, ProcrustesError, ProcrustesParams, ProcrustesResult,
};

/// Combine a fitted alignment into a homogeneous transform matrix.
///
/// The returned (d+1)×(d+1) matrix acts on homogeneous column vectors:
/// the linear block is `scale * rotationᵀ` (the rotation acts on column
/// vectors from the left there, hence the transpose of the row-convention
/// factor), the last column holds the translation.
///
/// # Arguments
///
/// * `result` - A fitted alignment.
///
/// # Returns
///
/// The homogeneous transform composing translation, rotation and scaling.
pub fn homogeneous_matrix(result: &ProcrustesResult) -> Mat<f64> {
    let dim = result.rotation.nrows();

    let mut transform = Mat::<f64>::zeros(dim + 1, dim + 1);
    for i in 0..dim {
        for j in 0..dim {
            transform.write(i, j, result.scale * result.rotation.read(j, i));
        }
        transform.write(i, dim, result.translation.read(i));
    }
    transform.write(dim, dim, 1.0);

    transform
}

/// Fit an alignment and return it as a single homogeneous transform.
///
/// Same fit as [`procrustes`], assembled with [`homogeneous_matrix`].
pub fn procrustes_transform(
    x: MatRef<f64>,
    y: MatRef<f64>,
    params: &ProcrustesParams,
) -> Result<Mat<f64>, ProcrustesError> {
    let result = procrustes(x, y, params)?;
    Ok(homogeneous_matrix(&result))
}

/// Fit a rigid alignment of 2-D point sets and return the rotation as an
/// angle.
///
/// The angle is the counter-clockwise rotation (radians) that, applied to
/// each source point about the origin and followed by the translation,
/// aligns the source onto the target. Scaling and reflections are
/// disabled, matching [`procrustes_rigid`].
///
/// # Arguments
///
/// * `x` - Source point set, n×2.
/// * `y` - Target point set, n×2.
///
/// # Returns
///
/// The pair `(angle, translation)`, or [`ProcrustesError::InvalidDimension`]
/// when the points are not 2-dimensional.
pub fn procrustes_rotation2d(
    x: MatRef<f64>,
    y: MatRef<f64>,
) -> Result<(f64, Col<f64>), ProcrustesError> {
    if x.ncols() != 2 {
        return Err(ProcrustesError::InvalidDimension {
            required: 2,
            actual: x.ncols(),
        });
    }
    if y.ncols() != 2 {
        return Err(ProcrustesError::InvalidDimension {
            required: 2,
            actual: y.ncols(),
        });
    }

    let result = procrustes_rigid(x, y)?;
    let angle = result.rotation.read(0, 1).atan2(result.rotation.read(0, 0));

    Ok((angle, result.translation))
}

/// Apply a fitted alignment to a point set.
///
/// Each row p of `points` is mapped to `scale * p * rotation + translationᵀ`,
/// the application side of the fit produced by [`procrustes`].
///
/// # Arguments
///
/// * `points` - An n×d point set, one point per row.
/// * `result` - The alignment to apply.
///
/// # Returns
///
/// The transformed n×d point set, or
/// [`ProcrustesError::MismatchedDimensions`] when the point dimension does
/// not match the fitted rotation.
pub fn transform_points(
    points: MatRef<f64>,
    result: &ProcrustesResult,
) -> Result<Mat<f64>, ProcrustesError> {
    if points.ncols() != result.rotation.nrows() {
        return Err(ProcrustesError::MismatchedDimensions {
            source_dim: points.ncols(),
            target_dim: result.rotation.nrows(),
        });
    }

    let mut transformed = faer::scale(result.scale) * (points * &result.rotation);
    for j in 0..transformed.ncols() {
        let offset = result.translation.read(j);
        for i in 0..transformed.nrows() {
            transformed.write(i, j, transformed.read(i, j) + offset);
        }
    }

    Ok(transformed)
}
