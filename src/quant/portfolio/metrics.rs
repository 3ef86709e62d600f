//! # Portfolio Evaluation
//!
//! $$
//! \mu_p=\mathbf{w}^\top\mu,\quad \sigma_p^2=\mathbf{w}^\top\Sigma\mathbf{w},\quad
//! S=\frac{\mu_p-r_f}{\sigma_p}
//! $$
//!

use ndarray::Array1;
use ndarray::Array2;

use super::error::PortfolioError;
use super::error::Result;
use super::moments::Moments;
use super::types::PortfolioStats;

fn check_shapes(weights: &[f64], mean: &Array1<f64>, cov: &Array2<f64>) -> Result<()> {
  let n = weights.len();
  if mean.len() != n {
    return Err(PortfolioError::DimensionMismatch {
      context: "mean vector",
      expected: n,
      actual: mean.len(),
    });
  }
  if cov.dim() != (n, n) {
    return Err(PortfolioError::DimensionMismatch {
      context: "covariance matrix",
      expected: n,
      actual: if cov.nrows() != n { cov.nrows() } else { cov.ncols() },
    });
  }
  Ok(())
}

fn dot(w: &[f64], mean: &Array1<f64>) -> f64 {
  w.iter().zip(mean.iter()).map(|(a, b)| a * b).sum()
}

fn quad_form(w: &[f64], cov: &Array2<f64>) -> f64 {
  let mut acc = 0.0;
  for (i, &wi) in w.iter().enumerate() {
    for (j, &wj) in w.iter().enumerate() {
      acc += wi * wj * cov[[i, j]];
    }
  }
  acc
}

/// Sharpe ratio, zero when `risk` is not positive.
pub fn sharpe_ratio(expected_return: f64, risk: f64, risk_free: f64) -> f64 {
  if risk > 0.0 {
    (expected_return - risk_free) / risk
  } else {
    0.0
  }
}

/// Expected return, variance, risk and Sharpe ratio of `weights`.
pub fn portfolio_stats(
  weights: &[f64],
  mean: &Array1<f64>,
  cov: &Array2<f64>,
  risk_free: f64,
) -> Result<PortfolioStats> {
  check_shapes(weights, mean, cov)?;

  let expected_return = dot(weights, mean);
  let variance = quad_form(weights, cov).max(0.0);
  let risk = variance.sqrt();

  Ok(PortfolioStats {
    expected_return,
    variance,
    risk,
    sharpe: sharpe_ratio(expected_return, risk, risk_free),
  })
}

/// [`portfolio_stats`] against a [`Moments`] bundle.
pub fn evaluate_portfolio(
  weights: &[f64],
  moments: &Moments,
  risk_free: f64,
) -> Result<PortfolioStats> {
  portfolio_stats(weights, &moments.mean, &moments.cov, risk_free)
}

/// Sharpe ratio of `weights`.
pub fn portfolio_sharpe(
  weights: &[f64],
  mean: &Array1<f64>,
  cov: &Array2<f64>,
  risk_free: f64,
) -> Result<f64> {
  portfolio_stats(weights, mean, cov, risk_free).map(|s| s.sharpe)
}
