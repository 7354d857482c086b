//! optimization — solvers, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide the fitting layer of the crate: iterative minimizers over a
//! [`Dataset`](crate::data::Dataset), numerically stable link functions
//! shared with the losses and metrics, and a single error/result surface.
//! Callers implement (or pick) an objective, choose tolerances and
//! constraints, and obtain fitted coefficients plus diagnostics without
//! touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - `solver` exposes [`Optimizer`](solver::Optimizer) (stateful, reusable)
//!   and [`minimize`](solver::minimize) (one call) over two step rules,
//!   L-BFGS and TRON.
//! - `numerical_stability` supplies stable softplus/logistic transforms and
//!   the probability clamp used by log-likelihood metrics.
//! - `errors` normalizes configuration issues, numerical failures, data
//!   errors, and backend solver errors into [`OptError`](errors::OptError).
//!
//! Conventions
//! -----------
//! - All solvers minimize. Log-likelihood fits minimize the negative
//!   log-likelihood expressed as a sum of pointwise losses.
//! - Coefficients and gradients are `ndarray::Array1<f64>` (`Theta`, `Grad`).
//! - Public entry points that can fail return `OptResult<T>`; raw argmin
//!   errors never escape.
//! - Progress is reported through the `log` facade: per-iteration lines at
//!   `debug` (or `info` when `verbose`), termination at `info`, recoverable
//!   line-search failures at `warn`.

pub mod errors;
pub mod numerical_stability;
pub mod solver;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::numerical_stability::{clamp_probability, safe_logistic, safe_softplus};
    pub use super::solver::{
        ConstraintMap, ConvergenceReason, LineSearcher, OptimOutcome, Optimizer, OptimizerConfig,
        OptimizerType, Tolerances, TronOptions, minimize,
    };
}
