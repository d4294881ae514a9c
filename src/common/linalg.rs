//! Linear algebra utilities
//!
//! Small 2x2 covariance helpers shared by the tracking pipeline: validity
//! checks, Mahalanobis distances and information-form fusion.

use nalgebra::{Matrix2, Vector2};

/// Make a matrix symmetric by averaging with its transpose.
pub fn symmetrize(m: &Matrix2<f32>) -> Matrix2<f32> {
    (m + m.transpose()) * 0.5
}

/// Check that a covariance matrix is usable: finite entries, non-negative
/// variances and a non-negative determinant.
pub fn is_valid_covariance(m: &Matrix2<f32>) -> bool {
    m.iter().all(|v| v.is_finite()) && m[(0, 0)] >= 0.0 && m[(1, 1)] >= 0.0 && m.determinant() >= 0.0
}

/// Symmetrize a covariance and reject it if it is unusable.
///
/// Returns `None` for matrices containing NaN/infinite entries or negative
/// variances. Callers keep their previous covariance in that case; a broken
/// update must never reach the hypothesis store.
pub fn sanitized_covariance(m: &Matrix2<f32>) -> Option<Matrix2<f32>> {
    let sym = symmetrize(m);
    if is_valid_covariance(&sym) {
        Some(sym)
    } else {
        debug_assert!(false, "degenerate covariance update: {sym:?}");
        None
    }
}

/// Squared Mahalanobis distance of `diff` under covariance `cov`.
///
/// Returns infinity for singular covariances, which makes the statistical
/// merge condition fail closed.
pub fn squared_mahalanobis(diff: &Vector2<f32>, cov: &Matrix2<f32>) -> f32 {
    match cov.try_inverse() {
        Some(inv) => (diff.transpose() * inv * diff)[(0, 0)],
        None => f32::INFINITY,
    }
}

/// Information-form fusion of two Gaussian estimates.
///
/// Computes the product of the two Gaussians:
/// `S = (A^-1 + B^-1)^-1`, `m = S * (A^-1 * a + B^-1 * b)`.
///
/// Returns `None` when either covariance (or their information sum) is
/// singular; the caller keeps the receiving estimate unchanged.
pub fn fuse_information(
    mean_a: &Vector2<f32>,
    cov_a: &Matrix2<f32>,
    mean_b: &Vector2<f32>,
    cov_b: &Matrix2<f32>,
) -> Option<(Vector2<f32>, Matrix2<f32>)> {
    let inv_a = cov_a.try_inverse()?;
    let inv_b = cov_b.try_inverse()?;
    let fused_cov = (inv_a + inv_b).try_inverse()?;
    let fused_mean = fused_cov * (inv_a * mean_a + inv_b * mean_b);
    let fused_cov = sanitized_covariance(&fused_cov)?;
    if fused_mean.iter().all(|v| v.is_finite()) {
        Some((fused_mean, fused_cov))
    } else {
        None
    }
}

/// Kalman position update of `(mean, cov)` with measurement `(z, r)`.
///
/// Gain `K = P * (P + R)^-1`; the posterior is `x + K * (z - x)` with
/// covariance `P - K * P`. Returns `None` when the innovation covariance is
/// singular or the result is unusable.
pub fn kalman_position_update(
    mean: &Vector2<f32>,
    cov: &Matrix2<f32>,
    z: &Vector2<f32>,
    r: &Matrix2<f32>,
) -> Option<(Vector2<f32>, Matrix2<f32>)> {
    let innovation_cov = cov + r;
    let gain = cov * innovation_cov.try_inverse()?;
    let updated_mean = mean + gain * (z - mean);
    let updated_cov = sanitized_covariance(&(cov - gain * cov))?;
    if updated_mean.iter().all(|v| v.is_finite()) {
        Some((updated_mean, updated_cov))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sanitized_covariance_rejects_nan() {
        let m = Matrix2::new(f32::NAN, 0.0, 0.0, 1.0);
        assert!(sanitized_covariance(&m).is_none());
    }

    #[test]
    fn test_sanitized_covariance_symmetrizes() {
        let m = Matrix2::new(4.0, 1.0, 3.0, 4.0);
        let s = sanitized_covariance(&m).unwrap();
        assert_relative_eq!(s[(0, 1)], s[(1, 0)]);
        assert_relative_eq!(s[(0, 1)], 2.0);
    }

    #[test]
    fn test_mahalanobis_identity() {
        let diff = Vector2::new(3.0, 4.0);
        let cov = Matrix2::identity();
        assert_relative_eq!(squared_mahalanobis(&diff, &cov), 25.0);
    }

    #[test]
    fn test_mahalanobis_singular_is_infinite() {
        let diff = Vector2::new(1.0, 0.0);
        let cov = Matrix2::zeros();
        assert!(squared_mahalanobis(&diff, &cov).is_infinite());
    }

    #[test]
    fn test_fusion_pulls_towards_confident_estimate() {
        let a = Vector2::new(100.0, 0.0);
        let b = Vector2::new(180.0, 0.0);
        let cov_a = Matrix2::identity() * 100.0;
        let cov_b = Matrix2::identity() * 400.0;
        let (mean, cov) = fuse_information(&a, &cov_a, &b, &cov_b).unwrap();
        // Fused mean lies between the inputs, closer to the smaller covariance.
        assert!(mean.x > 100.0 && mean.x < 140.0);
        assert!(cov[(0, 0)] < 100.0);
    }

    #[test]
    fn test_kalman_update_shrinks_covariance() {
        let mean = Vector2::new(0.0, 0.0);
        let cov = Matrix2::identity() * 200.0;
        let z = Vector2::new(10.0, 0.0);
        let r = Matrix2::identity() * 200.0;
        let (m, p) = kalman_position_update(&mean, &cov, &z, &r).unwrap();
        assert_relative_eq!(m.x, 5.0, epsilon = 1e-4);
        assert!(p[(0, 0)] < 200.0);
    }
}
