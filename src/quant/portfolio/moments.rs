//! # Moment Estimation
//!
//! $$
//! \hat\mu_i = \frac{P}{T}\sum_{t=1}^{T} r_{i,t}, \qquad
//! \hat\Sigma_{ij} = \frac{P}{T-1}\sum_{t=1}^{T}(r_{i,t}-\bar r_i)(r_{j,t}-\bar r_j)
//! $$
//!
//! Annualized sample mean vector and unbiased sample covariance from an
//! aligned `n x T` return panel (one row per asset), `P` periods per year.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use ndarray_stats::CorrelationExt;

use super::error::PortfolioError;
use super::error::Result;
use super::types::TRADING_DAYS;

/// Annualized first and second moments of a set of assets.
#[derive(Clone, Debug, PartialEq)]
pub struct Moments {
  /// Expected annualized return per asset, in input order.
  pub mean: Array1<f64>,
  /// Annualized covariance matrix, symmetric.
  pub cov: Array2<f64>,
}

impl Moments {
  /// Build from already annualized inputs, checking shapes.
  pub fn new(mean: Array1<f64>, cov: Array2<f64>) -> Result<Self> {
    let n = mean.len();
    if cov.dim() != (n, n) {
      return Err(PortfolioError::DimensionMismatch {
        context: "covariance matrix",
        expected: n,
        actual: if cov.nrows() != n { cov.nrows() } else { cov.ncols() },
      });
    }
    Ok(Self { mean, cov })
  }

  pub fn n_assets(&self) -> usize {
    self.mean.len()
  }

  /// Annualized standard deviation of asset `i`.
  pub fn volatility(&self, i: usize) -> f64 {
    self
      .cov
      .get((i, i))
      .copied()
      .unwrap_or(0.0)
      .max(0.0)
      .sqrt()
  }

  /// Smallest and largest single-asset expected return.
  pub fn return_range(&self) -> Option<(f64, f64)> {
    if self.mean.is_empty() {
      return None;
    }
    let lo = self.mean.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = self.mean.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((lo, hi))
  }
}

/// Estimate moments annualized with [`TRADING_DAYS`].
pub fn estimate_moments(returns: &Array2<f64>) -> Moments {
  estimate_moments_annualized(returns, TRADING_DAYS)
}

/// Estimate moments from an `n x T` return panel, scaling by `periods_per_year`.
///
/// With `T <= 1` the covariance is all zeros; with `T == 0` so is the mean.
pub fn estimate_moments_annualized(returns: &Array2<f64>, periods_per_year: f64) -> Moments {
  let (n, t) = returns.dim();

  let mean = returns
    .mean_axis(Axis(1))
    .unwrap_or_else(|| Array1::zeros(n))
    * periods_per_year;

  let cov = if n == 0 || t <= 1 {
    Array2::zeros((n, n))
  } else {
    let sample = returns
      .cov(1.0)
      .unwrap_or_else(|_| Array2::zeros((n, n)));
    (&sample + &sample.t()) * (0.5 * periods_per_year)
  };

  Moments { mean, cov }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use approx::assert_relative_eq;
  use ndarray::array;
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use rand_distr::Distribution;
  use rand_distr::Normal;

  use super::*;

  #[test]
  fn matches_hand_computed_sample_moments() {
    let returns = array![[0.01, 0.03, -0.01], [0.02, 0.00, 0.01]];
    let m = estimate_moments_annualized(&returns, 1.0);

    assert_abs_diff_eq!(m.mean[0], 0.01, epsilon = 1e-15);
    assert_abs_diff_eq!(m.mean[1], 0.01, epsilon = 1e-15);
    // deviations: [0, 0.02, -0.02] and [0.01, -0.01, 0]
    assert_abs_diff_eq!(m.cov[[0, 0]], 0.0008 / 2.0, epsilon = 1e-15);
    assert_abs_diff_eq!(m.cov[[1, 1]], 0.0002 / 2.0, epsilon = 1e-15);
    assert_abs_diff_eq!(m.cov[[0, 1]], -0.0002 / 2.0, epsilon = 1e-15);
  }

  #[test]
  fn annualizes_mean_and_covariance_by_trading_days() {
    let returns = array![[0.01, 0.03, -0.01], [0.02, 0.00, 0.01]];
    let daily = estimate_moments_annualized(&returns, 1.0);
    let annual = estimate_moments(&returns);

    assert_relative_eq!(annual.mean[0], daily.mean[0] * 252.0, max_relative = 1e-12);
    assert_relative_eq!(
      annual.cov[[0, 1]],
      daily.cov[[0, 1]] * 252.0,
      max_relative = 1e-12
    );
    assert_relative_eq!(
      annual.volatility(0),
      daily.volatility(0) * 252.0_f64.sqrt(),
      max_relative = 1e-12
    );
  }

  #[test]
  fn covariance_is_symmetric_with_nonnegative_diagonal() {
    let mut rng = StdRng::seed_from_u64(11);
    let normal = Normal::new(0.0005, 0.012).unwrap();
    let returns = Array2::from_shape_fn((5, 200), |_| normal.sample(&mut rng));
    let m = estimate_moments(&returns);

    for i in 0..5 {
      assert!(m.cov[[i, i]] >= 0.0);
      for j in 0..5 {
        assert_eq!(m.cov[[i, j]], m.cov[[j, i]]);
      }
    }
  }

  #[test]
  fn single_observation_yields_zero_covariance() {
    let returns = array![[0.02], [-0.01]];
    let m = estimate_moments(&returns);

    assert!(m.cov.iter().all(|&c| c == 0.0));
    assert_relative_eq!(m.mean[0], 0.02 * 252.0, max_relative = 1e-12);
  }

  #[test]
  fn no_observations_yields_zero_moments() {
    let returns = Array2::<f64>::zeros((3, 0));
    let m = estimate_moments(&returns);

    assert_eq!(m.n_assets(), 3);
    assert!(m.mean.iter().all(|&x| x == 0.0));
    assert_eq!(m.cov.dim(), (3, 3));
  }

  #[test]
  fn rejects_mismatched_shapes() {
    let err = Moments::new(array![0.1, 0.2], Array2::zeros((2, 3))).unwrap_err();
    assert!(matches!(err, PortfolioError::DimensionMismatch { .. }));
    assert_eq!(
      Moments::new(array![0.1, 0.3], Array2::eye(2))
        .unwrap()
        .return_range(),
      Some((0.1, 0.3))
    );
  }
}
