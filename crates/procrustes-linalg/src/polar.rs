//! Polar decomposition of square real matrices.
//!
//! A polar decomposition factors a square matrix `A` into an orthogonal
//! factor `R` and a symmetric positive-semidefinite factor `T` such that
//! `A = R · T`. Two strategies are provided:
//!
//! * [`polar_svd`] computes the factors from a singular value decomposition
//!   and corrects the sign of the smallest singular direction so that the
//!   orthogonal factor is always a proper rotation (`det(R) = +1`).
//! * [`polar_dec`] computes the factors from an eigen-decomposition of the
//!   symmetric matrix `AᵀA` and keeps the sign of `det(A)`, so the
//!   orthogonal factor may be a reflection (`det(R) = -1`).
//!
//! Both strategies accept rank-deficient input and return some valid
//! orthogonal factor, although the factor is no longer unique in that case.
//!
//! # See also
//!
//! * `procrustes-align` for the point-set alignment built on these factors.

use faer::{Mat, MatRef};

/// Eigenvalue-ratio threshold below which [`polar_dec`] falls back to the
/// SVD strategy. Square root of the double-precision comparison tolerance.
const DEGENERACY_THRESHOLD: f64 = 1e-6;

/// Polar decomposition via SVD, disallowing reflections.
///
/// Factors `a = r · t` with `r` orthogonal and `t` symmetric. When the
/// orthogonal factor of the plain SVD product `U Vᵀ` has negative
/// determinant, the singular direction with the smallest singular value is
/// flipped, so the returned `r` always satisfies `det(r) = +1`.
///
/// # Arguments
///
/// * `a` - A square d×d matrix with finite entries.
///
/// # Returns
///
/// The pair `(r, t)` with `r · t = a` and `r` a proper rotation.
///
/// Example:
///
/// ```
/// use procrustes_linalg::polar::polar_svd;
///
/// let a = faer::mat![[0.0, -2.0], [2.0, 0.0]];
/// let (r, t) = polar_svd(a.as_ref());
/// assert!((r.determinant() - 1.0).abs() < 1e-12);
/// ```
pub fn polar_svd(a: MatRef<f64>) -> (Mat<f64>, Mat<f64>) {
    assert_eq!(a.nrows(), a.ncols(), "polar decomposition needs a square matrix");
    let dim = a.ncols();

    let svd = a.svd();
    let u = svd.u();
    let s = svd.s_diagonal();
    let v = svd.v();

    // sigma * v^T, shared by both branches of the symmetric factor
    let svt = Mat::from_fn(dim, dim, |i, j| s[i] * v.read(j, i));

    let r = u * v.transpose();
    if r.determinant() < 0.0 {
        // flip the direction of the smallest singular value (faer orders
        // singular values in descending order, so it is the last column)
        let mut w = v.to_owned();
        for i in 0..dim {
            w.write(i, dim - 1, -w.read(i, dim - 1));
        }
        (u * w.transpose(), &w * &svt)
    } else {
        (r, v * &svt)
    }
}

/// Polar decomposition via eigen-decomposition, allowing reflections.
///
/// Factors `a = r · t` where `t = sqrt(aᵀa)` is computed from a
/// self-adjoint eigen-decomposition and `r = a · t⁻¹`. The orthogonal
/// factor inherits the sign of `det(a)` and may therefore be an improper
/// rotation.
///
/// When `aᵀa` is ill-conditioned (eigenvalue ratio below 1e-6) or the
/// computed factor fails an orthogonality sanity check, the decomposition
/// falls back to [`polar_svd`], which forces `det(r) = +1`.
///
/// # Arguments
///
/// * `a` - A square d×d matrix with finite entries.
///
/// # Returns
///
/// The pair `(r, t)` with `r · t = a`, `r` orthogonal and `t` symmetric
/// positive-semidefinite.
pub fn polar_dec(a: MatRef<f64>) -> (Mat<f64>, Mat<f64>) {
    assert_eq!(a.nrows(), a.ncols(), "polar decomposition needs a square matrix");
    let dim = a.ncols();

    // eigen-decomposition of the symmetric product a^T * a
    let ata = a.transpose() * a;
    let eig = ata.selfadjoint_eigendecomposition(faer::Side::Lower);
    let q = eig.u();
    let lambda = eig.s().column_vector();

    let mut lambda_min = f64::INFINITY;
    let mut lambda_max = 0.0_f64;
    for i in 0..dim {
        // clamp tiny negative values produced by roundoff
        let value = lambda[i].max(0.0);
        lambda_min = lambda_min.min(value);
        lambda_max = lambda_max.max(value);
    }

    if lambda_max <= 0.0 || lambda_min / lambda_max < DEGENERACY_THRESHOLD {
        log::debug!("eigen polar decomposition is ill-conditioned, resorting to svd");
        return polar_svd(a);
    }

    let sqrt_lambda = (0..dim).map(|i| lambda[i].max(0.0).sqrt()).collect::<Vec<_>>();

    // t = q * sqrt(lambda) * q^T
    let q_sqrt = Mat::from_fn(dim, dim, |i, j| q.read(i, j) * sqrt_lambda[j]);
    let t = &q_sqrt * q.transpose();

    // r = a * q * sqrt(lambda)^-1 * q^T
    let q_inv_sqrt = Mat::from_fn(dim, dim, |i, j| q.read(i, j) / sqrt_lambda[j]);
    let r = a * &q_inv_sqrt * q.transpose();

    // an orthogonal factor has squared Frobenius norm equal to its dimension
    let norm_sq = r.norm_l2() * r.norm_l2();
    if (norm_sq - dim as f64).abs() > DEGENERACY_THRESHOLD {
        log::debug!("eigen polar factor failed the orthogonality check, resorting to svd");
        return polar_svd(a);
    }

    (r, t)
}
