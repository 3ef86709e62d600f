//! # Tangency Portfolio
//!
//! $$
//! \mathbf{w}^\* = \frac{\Sigma^{-1}(\mu - r_f\mathbf{1})}{\mathbf{1}^\top\Sigma^{-1}(\mu - r_f\mathbf{1})}
//! $$
//!
//! Closed-form maximum-Sharpe weights. Long-only and rejecting variants differ
//! only in how the signed weights are post-processed ([`WeightPolicy`]).

use ndarray::Array1;
use ndarray::Array2;
use tracing::warn;

use super::error::PortfolioError;
use super::error::Result;
use super::linalg::invert;
use super::types::WeightPolicy;

/// Unnormalized weight sums closer to zero than this cannot be normalized.
const NORMALIZATION_EPS: f64 = 1e-12;

/// Signed max-Sharpe weights, normalized to sum to one.
pub fn max_sharpe_weights(
  mean: &Array1<f64>,
  cov: &Array2<f64>,
  risk_free: f64,
) -> Result<Vec<f64>> {
  let n = mean.len();
  if cov.dim() != (n, n) {
    return Err(PortfolioError::DimensionMismatch {
      context: "covariance matrix",
      expected: n,
      actual: if cov.nrows() != n { cov.nrows() } else { cov.ncols() },
    });
  }

  let inv = invert(cov)?;
  let excess = mean - risk_free;
  let raw = inv.dot(&excess);

  let sum = raw.sum();
  if sum.abs() < NORMALIZATION_EPS {
    return Err(PortfolioError::DegenerateWeights { sum });
  }

  Ok(raw.iter().map(|w| w / sum).collect())
}

/// Max-Sharpe weights clipped to the long-only simplex.
pub fn max_sharpe_weights_long_only(
  mean: &Array1<f64>,
  cov: &Array2<f64>,
  risk_free: f64,
) -> Result<Vec<f64>> {
  optimize_max_sharpe(mean, cov, risk_free, WeightPolicy::ClipRenormalize)
}

/// Max-Sharpe weights post-processed by `policy`.
pub fn optimize_max_sharpe(
  mean: &Array1<f64>,
  cov: &Array2<f64>,
  risk_free: f64,
  policy: WeightPolicy,
) -> Result<Vec<f64>> {
  let weights = max_sharpe_weights(mean, cov, risk_free)?;
  apply_weight_policy(weights, policy)
}

/// Clip negative weights to zero and rescale to sum to one.
///
/// If nothing positive remains the clipped weights are returned unnormalized.
pub fn clip_and_renormalize(weights: &[f64]) -> Vec<f64> {
  let clipped: Vec<f64> = weights.iter().map(|w| w.max(0.0)).collect();
  let total: f64 = clipped.iter().sum();

  if total.abs() < NORMALIZATION_EPS {
    clipped
  } else {
    clipped.iter().map(|w| w / total).collect()
  }
}

/// Apply a [`WeightPolicy`] to signed weights.
pub fn apply_weight_policy(weights: Vec<f64>, policy: WeightPolicy) -> Result<Vec<f64>> {
  match policy {
    WeightPolicy::Reject { tolerance } => {
      if let Some((index, &weight)) = weights
        .iter()
        .enumerate()
        .find(|(_, &w)| w < tolerance)
      {
        warn!(index, weight, tolerance, "rejecting allocation with short position");
        return Err(PortfolioError::NegativeWeight {
          index,
          weight,
          tolerance,
        });
      }
      Ok(clip_and_renormalize(&weights))
    }
    WeightPolicy::ClipRenormalize => Ok(clip_and_renormalize(&weights)),
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;
  use tracing_test::traced_test;

  use super::*;
  use crate::quant::portfolio::metrics::portfolio_sharpe;
  use crate::quant::portfolio::moments::estimate_moments;

  #[test]
  fn tangency_dominates_single_assets() {
    let mean = array![0.08, 0.12];
    let cov = array![[0.04, 0.01], [0.01, 0.09]];

    let w = max_sharpe_weights(&mean, &cov, 0.04).unwrap();
    let tangency = portfolio_sharpe(&w, &mean, &cov, 0.04).unwrap();
    let first = portfolio_sharpe(&[1.0, 0.0], &mean, &cov, 0.04).unwrap();
    let second = portfolio_sharpe(&[0.0, 1.0], &mean, &cov, 0.04).unwrap();

    assert!(tangency >= first);
    assert!(tangency >= second);
    assert_abs_diff_eq!(w[0], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(w[1], 0.5, epsilon = 1e-12);
  }

  #[test]
  fn identical_assets_are_singular() {
    let series = [0.01, -0.02, 0.015, 0.003, -0.007, 0.012];
    let returns = Array2::from_shape_fn((3, series.len()), |(_, t)| series[t]);
    let moments = estimate_moments(&returns);

    let err = max_sharpe_weights(&moments.mean, &moments.cov, 0.04).unwrap_err();
    assert!(err.is_singular());
  }

  #[test]
  fn zero_excess_return_cannot_be_normalized() {
    let mean = array![0.04, 0.04];
    let cov = array![[0.04, 0.0], [0.0, 0.09]];

    assert!(matches!(
      max_sharpe_weights(&mean, &cov, 0.04),
      Err(PortfolioError::DegenerateWeights { .. })
    ));
  }

  #[traced_test]
  #[test]
  fn reject_policy_discards_large_shorts() {
    let mean = array![0.03, 0.15];
    let cov = array![[0.04, 0.03], [0.03, 0.09]];

    let signed = max_sharpe_weights(&mean, &cov, 0.04).unwrap();
    assert!(signed[0] < -0.01);

    let err = optimize_max_sharpe(&mean, &cov, 0.04, WeightPolicy::default()).unwrap_err();
    assert!(matches!(err, PortfolioError::NegativeWeight { index: 0, .. }));
    assert!(logs_contain("rejecting allocation"));

    let long_only = max_sharpe_weights_long_only(&mean, &cov, 0.04).unwrap();
    assert_eq!(long_only, vec![0.0, 1.0]);
  }

  #[test]
  fn reject_policy_clips_small_shorts() {
    let w = apply_weight_policy(vec![-0.005, 0.505, 0.5], WeightPolicy::default()).unwrap();

    assert_eq!(w[0], 0.0);
    assert_abs_diff_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-15);
  }

  #[test]
  fn clipping_all_negative_weights_leaves_zeros() {
    assert_eq!(clip_and_renormalize(&[-0.3, -0.7]), vec![0.0, 0.0]);
  }
}
