//! # Dense Linear Solver
//!
//! $$
//! [A \mid B] \xrightarrow{\text{Gauss-Jordan}} [I \mid A^{-1}B]
//! $$
//!
//! Gaussian elimination with partial pivoting on an augmented matrix. Solving
//! `A x = b` augments with one column, inversion augments with the identity;
//! both run through [`gauss_jordan`].

use ndarray::s;
use ndarray::Array1;
use ndarray::Array2;
use tracing::debug;

use super::error::PortfolioError;
use super::error::Result;

/// Pivot tolerance for the frontier KKT solve.
pub const FRONTIER_PIVOT_TOLERANCE: f64 = 1e-10;

/// Pivot tolerance for covariance inversion.
pub const INVERSION_PIVOT_TOLERANCE: f64 = 1e-12;

/// Reduce the left `n x n` block of `aug` to the identity in place.
///
/// At every column the remaining row with the largest absolute entry is
/// swapped into the pivot position. Fails with [`PortfolioError::Singular`]
/// when that entry is below `tolerance` (NaN pivots fail too).
fn gauss_jordan(aug: &mut Array2<f64>, n: usize, tolerance: f64) -> Result<()> {
  let width = aug.ncols();

  for col in 0..n {
    let mut pivot_row = col;
    let mut pivot = aug[[col, col]].abs();
    for row in (col + 1)..n {
      let candidate = aug[[row, col]].abs();
      if candidate > pivot {
        pivot = candidate;
        pivot_row = row;
      }
    }

    if pivot.is_nan() || pivot < tolerance {
      debug!(column = col, pivot, tolerance, "pivot below tolerance");
      return Err(PortfolioError::Singular {
        column: col,
        pivot,
        tolerance,
      });
    }

    if pivot_row != col {
      for j in 0..width {
        aug.swap([col, j], [pivot_row, j]);
      }
    }

    let pivot_value = aug[[col, col]];
    aug.row_mut(col).mapv_inplace(|v| v / pivot_value);
    let pivot_line = aug.row(col).to_owned();

    for row in 0..n {
      if row == col {
        continue;
      }
      let factor = aug[[row, col]];
      if factor != 0.0 {
        aug.row_mut(row).scaled_add(-factor, &pivot_line);
      }
    }
  }

  Ok(())
}

fn ensure_square(a: &Array2<f64>, context: &'static str) -> Result<usize> {
  let (rows, cols) = a.dim();
  if rows != cols {
    return Err(PortfolioError::DimensionMismatch {
      context,
      expected: rows,
      actual: cols,
    });
  }
  Ok(rows)
}

/// Solve `A x = b` with the frontier pivot tolerance.
pub fn solve_linear_system(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
  solve_linear_system_with_tolerance(a, b, FRONTIER_PIVOT_TOLERANCE)
}

/// Solve `A x = b`, treating pivots smaller than `tolerance` as singular.
pub fn solve_linear_system_with_tolerance(
  a: &Array2<f64>,
  b: &Array1<f64>,
  tolerance: f64,
) -> Result<Array1<f64>> {
  let n = ensure_square(a, "linear system matrix")?;
  if b.len() != n {
    return Err(PortfolioError::DimensionMismatch {
      context: "linear system right-hand side",
      expected: n,
      actual: b.len(),
    });
  }

  let mut aug = Array2::<f64>::zeros((n, n + 1));
  aug.slice_mut(s![.., ..n]).assign(a);
  aug.column_mut(n).assign(b);

  gauss_jordan(&mut aug, n, tolerance)?;

  Ok(aug.column(n).to_owned())
}

/// Invert a square matrix with the inversion pivot tolerance.
pub fn invert(m: &Array2<f64>) -> Result<Array2<f64>> {
  invert_with_tolerance(m, INVERSION_PIVOT_TOLERANCE)
}

/// Gauss-Jordan inversion against an augmented identity.
pub fn invert_with_tolerance(m: &Array2<f64>, tolerance: f64) -> Result<Array2<f64>> {
  let n = ensure_square(m, "inverted matrix")?;

  let mut aug = Array2::<f64>::zeros((n, 2 * n));
  aug.slice_mut(s![.., ..n]).assign(m);
  aug.slice_mut(s![.., n..]).assign(&Array2::<f64>::eye(n));

  gauss_jordan(&mut aug, n, tolerance)?;

  Ok(aug.slice(s![.., n..]).to_owned())
}
