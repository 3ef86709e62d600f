//! # Quant
//!
//! $$
//! R_p = \sum_i w_i R_i
//! $$
//!
pub mod portfolio;
