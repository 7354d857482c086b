//! solver::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the core numeric types and Argmin aliases used by the
//! optimizer, so the rest of the solver code stays agnostic to `ndarray`
//! and Argmin generics.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` are column vectors of length equal to the number of
//!   features; `Cost` is the scalar objective being *minimized*.
//! - The line-search aliases assume Argmin's three-parameter forms
//!   `(Param, Gradient, Float)` as of the pinned Argmin version.
use argmin::{
    core::IterState,
    solver::linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
};
use ndarray::Array1;
use std::collections::HashMap;

/// Coefficient vector being optimized.
pub type Theta = Array1<f64>;

/// Gradient of the objective, same shape as [`Theta`].
pub type Grad = Array1<f64>;

/// Scalar objective value (lower is better).
pub type Cost = f64;

/// Evaluation counters keyed by name (`"objective_count"`,
/// `"hessian_vector_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 10;

/// Argmin iteration state of one line search.
pub type LineSearchState = IterState<Theta, Grad, (), (), (), Cost>;

/// Hager–Zhang line search specialized to this crate's numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search specialized to this crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

