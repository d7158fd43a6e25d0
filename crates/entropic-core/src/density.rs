// ─────────────────────────────────────────────────────────────────────
// Entropic Agent — Endpoint Density Estimator
// ─────────────────────────────────────────────────────────────────────
//! Gaussian kernel density fit over walk endpoints.
//!
//!   H   = factor² · Σ̂            (Σ̂: sample covariance, divisor n − 1)
//!   p(x) = 1/n Σ_i N(x; x_i, H)
//!   w_i  = −ln p(x_i)             (self-evaluation)
//!
//! `factor` comes from a pinned [`BandwidthRule`]. H is factorised once
//! as L Lᵀ (Cholesky); each kernel term then needs one triangular solve.
//! A covariance that is not numerically positive definite indicates
//! duplicate or collinear endpoints and fails with `SamplingDegeneracy`.

use entropic_types::{BandwidthRule, EntropicError, EntropicResult, EntropyWeighting};

/// Pivots below this fraction of the largest covariance diagonal are
/// treated as zero.
const PIVOT_RTOL: f64 = 1e-12;

const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// Fitted Gaussian kernel density over a fixed point set.
#[derive(Debug, Clone)]
pub struct GaussianKde {
    points: Vec<Vec<f64>>,
    dims: usize,
    factor: f64,
    /// Lower-triangular Cholesky factor of the kernel covariance (d×d row-major).
    chol: Vec<f64>,
    /// −ln n − d/2 ln 2π − ln |L|
    log_norm: f64,
}

impl GaussianKde {
    /// Fit the kernel density to `points` using `rule` for the bandwidth.
    pub fn fit(points: &[Vec<f64>], rule: BandwidthRule) -> EntropicResult<Self> {
        let n = points.len();
        if n < 2 {
            return Err(EntropicError::SamplingDegeneracy(format!(
                "kernel density needs at least 2 endpoints, got {n}"
            )));
        }
        let d = points[0].len();
        if d == 0 {
            return Err(EntropicError::SamplingDegeneracy(
                "endpoints have zero dimensions".to_string(),
            ));
        }
        for (i, p) in points.iter().enumerate() {
            if p.len() != d {
                return Err(EntropicError::SamplingDegeneracy(format!(
                    "endpoint {i} has {} dims, expected {d}",
                    p.len()
                )));
            }
            if p.iter().any(|v| !v.is_finite()) {
                return Err(EntropicError::SamplingDegeneracy(format!(
                    "endpoint {i} contains NaN or Inf: {p:?}"
                )));
            }
        }

        let mut mean = vec![0.0; d];
        for p in points {
            for (m, v) in mean.iter_mut().zip(p) {
                *m += v;
            }
        }
        for m in mean.iter_mut() {
            *m /= n as f64;
        }

        let factor = rule.factor(n, d);
        let scale = factor * factor / (n - 1) as f64;
        let mut cov = vec![0.0; d * d];
        for p in points {
            for i in 0..d {
                let di = p[i] - mean[i];
                for j in 0..=i {
                    cov[i * d + j] += di * (p[j] - mean[j]);
                }
            }
        }
        for i in 0..d {
            for j in 0..=i {
                cov[i * d + j] *= scale;
                cov[j * d + i] = cov[i * d + j];
            }
        }

        let chol = cholesky(&cov, d).ok_or_else(|| {
            EntropicError::SamplingDegeneracy(format!(
                "kernel covariance of {n} endpoints is singular (duplicate or collinear endpoints)"
            ))
        })?;

        let log_det_l: f64 = (0..d).map(|i| chol[i * d + i].ln()).sum();
        let log_norm = -(n as f64).ln() - 0.5 * d as f64 * LN_2PI - log_det_l;

        log::debug!("kde fit: n={n} d={d} factor={factor:.4} log_norm={log_norm:.4}");

        Ok(Self {
            points: points.to_vec(),
            dims: d,
            factor,
            chol,
            log_norm,
        })
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bandwidth factor applied to the sample covariance.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Natural log of the fitted density at `x`.
    pub fn log_pdf(&self, x: &[f64]) -> EntropicResult<f64> {
        let d = self.dims;
        if x.len() != d {
            return Err(EntropicError::EnvironmentContract(format!(
                "density evaluated at a {}-dim point, fitted on {d} dims",
                x.len()
            )));
        }
        let mut diff = vec![0.0; d];
        let mut exponents = Vec::with_capacity(self.points.len());
        for p in &self.points {
            for k in 0..d {
                diff[k] = x[k] - p[k];
            }
            forward_substitute(&self.chol, d, &mut diff);
            let q: f64 = diff.iter().map(|v| v * v).sum();
            exponents.push(-0.5 * q);
        }
        Ok(self.log_norm + log_sum_exp(&exponents))
    }

    pub fn pdf(&self, x: &[f64]) -> EntropicResult<f64> {
        self.log_pdf(x).map(f64::exp)
    }
}

/// Bandwidth rule plus weighting: turns endpoints into entropy weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DensityEstimator {
    pub bandwidth: BandwidthRule,
    pub weighting: EntropyWeighting,
}

impl DensityEstimator {
    pub fn new(bandwidth: BandwidthRule, weighting: EntropyWeighting) -> Self {
        Self {
            bandwidth,
            weighting,
        }
    }

    /// One weight per endpoint, in input order.
    pub fn weights(&self, endpoints: &[Vec<f64>]) -> EntropicResult<Vec<f64>> {
        entropy_weights(endpoints, self.bandwidth, self.weighting)
    }
}

/// Fit a kernel density to `endpoints` and score each endpoint against it.
pub fn entropy_weights(
    endpoints: &[Vec<f64>],
    rule: BandwidthRule,
    weighting: EntropyWeighting,
) -> EntropicResult<Vec<f64>> {
    let kde = GaussianKde::fit(endpoints, rule)?;
    let mut weights = Vec::with_capacity(endpoints.len());
    for (i, x) in endpoints.iter().enumerate() {
        let log_p = kde.log_pdf(x)?;
        let w = match weighting {
            EntropyWeighting::NegLogDensity => -log_p,
            EntropyWeighting::NegDensity => -log_p.exp(),
        };
        if !w.is_finite() {
            return Err(EntropicError::SamplingDegeneracy(format!(
                "weight of endpoint {i} is not finite (ln p = {log_p})"
            )));
        }
        weights.push(w);
    }
    Ok(weights)
}

/// Cholesky factorisation A = L Lᵀ of a symmetric d×d row-major matrix.
///
/// Returns `None` when A is not numerically positive definite.
fn cholesky(a: &[f64], d: usize) -> Option<Vec<f64>> {
    let max_diag = (0..d).map(|i| a[i * d + i]).fold(0.0f64, f64::max);
    if !(max_diag.is_finite() && max_diag > 0.0) {
        return None;
    }
    let tol = max_diag * PIVOT_RTOL;
    let mut l = vec![0.0; d * d];
    for j in 0..d {
        let mut pivot = a[j * d + j];
        for k in 0..j {
            pivot -= l[j * d + k] * l[j * d + k];
        }
        if !(pivot > tol) {
            return None;
        }
        let ljj = pivot.sqrt();
        l[j * d + j] = ljj;
        for i in (j + 1)..d {
            let mut s = a[i * d + j];
            for k in 0..j {
                s -= l[i * d + k] * l[j * d + k];
            }
            l[i * d + j] = s / ljj;
        }
    }
    Some(l)
}

/// Solve L y = b in place for lower-triangular L.
fn forward_substitute(l: &[f64], d: usize, b: &mut [f64]) {
    for i in 0..d {
        let mut s = b[i];
        for k in 0..i {
            s -= l[i * d + k] * b[k];
        }
        b[i] = s / l[i * d + i];
    }
}

fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_pdf(x: f64, mu: f64, var: f64) -> f64 {
        (-(x - mu).powi(2) / (2.0 * var)).exp() / (2.0 * std::f64::consts::PI * var).sqrt()
    }

    fn scatter_2d() -> Vec<Vec<f64>> {
        (0..30)
            .map(|i| {
                let t = i as f64;
                vec![(t * 0.7).sin() * 3.0, (t * 1.3).cos() * 2.0 + 0.1 * t]
            })
            .collect()
    }

    #[test]
    fn test_identical_endpoints_degenerate() {
        let points = vec![vec![1.0, 2.0]; 10];
        let err = entropy_weights(&points, BandwidthRule::Scott, EntropyWeighting::NegLogDensity)
            .unwrap_err();
        assert!(matches!(err, EntropicError::SamplingDegeneracy(_)));
    }

    #[test]
    fn test_single_endpoint_degenerate() {
        let err = GaussianKde::fit(&[vec![0.5]], BandwidthRule::Scott).unwrap_err();
        assert!(matches!(err, EntropicError::SamplingDegeneracy(_)));
    }

    #[test]
    fn test_collinear_endpoints_degenerate() {
        let points: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64, 2.0 * i as f64 + 1.0]).collect();
        let err = GaussianKde::fit(&points, BandwidthRule::Scott).unwrap_err();
        assert!(matches!(err, EntropicError::SamplingDegeneracy(_)));
    }

    #[test]
    fn test_non_finite_endpoint_degenerate() {
        let points = vec![vec![0.0], vec![f64::NAN], vec![1.0]];
        let err = GaussianKde::fit(&points, BandwidthRule::Scott).unwrap_err();
        assert!(matches!(err, EntropicError::SamplingDegeneracy(_)));
    }

    #[test]
    fn test_ragged_endpoints_degenerate() {
        let points = vec![vec![0.0, 1.0], vec![1.0]];
        assert!(GaussianKde::fit(&points, BandwidthRule::Scott).is_err());
    }

    #[test]
    fn test_pdf_matches_closed_form_1d() {
        // Two points: mean 1, sample variance 2, Scott factor 2^(-1/5).
        let points = vec![vec![0.0], vec![2.0]];
        let kde = GaussianKde::fit(&points, BandwidthRule::Scott).unwrap();
        let h2 = 2.0 * 2f64.powf(-0.4);
        for x in [-1.0, 0.0, 0.7, 2.0, 5.0] {
            let expected = 0.5 * (normal_pdf(x, 0.0, h2) + normal_pdf(x, 2.0, h2));
            let got = kde.pdf(&[x]).unwrap();
            assert!(
                (got - expected).abs() < 1e-12,
                "p({x}) = {got}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_pdf_separable_axes_2d() {
        // Axis-aligned rectangle corners: covariance is diagonal, so the
        // density factorises into the 1-D kernels of each axis.
        let points = vec![
            vec![0.0, 0.0],
            vec![2.0, 0.0],
            vec![0.0, 4.0],
            vec![2.0, 4.0],
        ];
        let kde = GaussianKde::fit(&points, BandwidthRule::Scott).unwrap();
        let f2 = 4f64.powf(-2.0 / 6.0);
        let var_x = 4.0 / 3.0 * f2;
        let var_y = 16.0 / 3.0 * f2;
        let x = [0.5, 1.0];
        let expected: f64 = points
            .iter()
            .map(|p| normal_pdf(x[0], p[0], var_x) * normal_pdf(x[1], p[1], var_y))
            .sum::<f64>()
            / 4.0;
        assert!((kde.pdf(&x).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rare_endpoint_weighs_more() {
        let mut points: Vec<Vec<f64>> = (0..20).map(|i| vec![0.01 * i as f64]).collect();
        points.push(vec![5.0]);
        let w = entropy_weights(&points, BandwidthRule::Scott, EntropyWeighting::NegLogDensity)
            .unwrap();
        let outlier = w[20];
        assert!(w[..20].iter().all(|&wi| wi < outlier));
    }

    #[test]
    fn test_weights_pure() {
        let points = scatter_2d();
        let est = DensityEstimator::default();
        let a = est.weights(&points).unwrap();
        let b = est.weights(&points).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), points.len());
        assert!(a.iter().all(|w| w.is_finite()));
    }

    #[test]
    fn test_neg_density_weighting() {
        let points = scatter_2d();
        let log_w = entropy_weights(&points, BandwidthRule::Scott, EntropyWeighting::NegLogDensity)
            .unwrap();
        let raw_w = entropy_weights(&points, BandwidthRule::Scott, EntropyWeighting::NegDensity)
            .unwrap();
        for (l, r) in log_w.iter().zip(&raw_w) {
            assert!(*r < 0.0);
            assert!((r + (-l).exp()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bandwidth_rules_differ_in_1d() {
        let points: Vec<Vec<f64>> = (0..30).map(|i| vec![(i as f64 * 0.7).sin() * 3.0]).collect();
        let scott = GaussianKde::fit(&points, BandwidthRule::Scott).unwrap();
        let silverman = GaussianKde::fit(&points, BandwidthRule::Silverman).unwrap();
        // d = 1: Silverman = (3n/4)^(-1/5), smaller than Scott's n^(-1/5)
        assert!((scott.factor() - 30f64.powf(-0.2)).abs() < 1e-12);
        assert!((silverman.factor() - 22.5f64.powf(-0.2)).abs() < 1e-12);
        assert!(silverman.factor() > scott.factor());
        let x = &points[0];
        assert!((scott.log_pdf(x).unwrap() - silverman.log_pdf(x).unwrap()).abs() > 1e-9);
    }

    #[test]
    fn test_bandwidth_rules_coincide_in_2d() {
        let points = scatter_2d();
        let scott = GaussianKde::fit(&points, BandwidthRule::Scott).unwrap();
        let silverman = GaussianKde::fit(&points, BandwidthRule::Silverman).unwrap();
        assert!((scott.factor() - silverman.factor()).abs() < 1e-12);
    }

    #[test]
    fn test_log_pdf_dimension_mismatch() {
        let kde = GaussianKde::fit(&scatter_2d(), BandwidthRule::Scott).unwrap();
        assert!(matches!(
            kde.log_pdf(&[0.0]),
            Err(EntropicError::EnvironmentContract(_))
        ));
        assert!(kde.pdf(&[0.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_far_point_log_pdf_finite() {
        let kde = GaussianKde::fit(&[vec![0.0], vec![1.0], vec![0.5]], BandwidthRule::Scott)
            .unwrap();
        // exp underflows here; log-sum-exp keeps the log finite.
        let lp = kde.log_pdf(&[60.0]).unwrap();
        assert!(lp.is_finite());
        assert_eq!(kde.pdf(&[60.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_cholesky_reconstructs() {
        let a = vec![4.0, 2.0, 0.4, 2.0, 5.0, 1.0, 0.4, 1.0, 3.0];
        let l = cholesky(&a, 3).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let v: f64 = (0..3).map(|k| l[i * 3 + k] * l[j * 3 + k]).sum();
                assert!((v - a[i * 3 + j]).abs() < 1e-12);
            }
        }
    }
}
