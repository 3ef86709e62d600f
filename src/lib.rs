//! # frontier-rs
//!
//! $$
//! \min_{\mathbf{w}} \ \mathbf{w}^\top \Sigma \mathbf{w}
//! \quad \text{s.t.} \quad \mathbf{w}^\top \mu = \mu^\*, \ \mathbf{w}^\top \mathbf{1} = 1
//! $$
//!
//! Mean-variance portfolio engine: return alignment, moment estimation,
//! efficient frontier, tangency portfolio and portfolio statistics.

pub mod quant;
