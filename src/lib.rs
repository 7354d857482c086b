//! rust_glm — generalized linear model training and evaluation.
//!
//! Purpose
//! -------
//! Train linear, logistic and Poisson regression models over local or
//! horizontally partitioned datasets, and evaluate trained models with
//! error, ranking, likelihood and information-criterion metrics.
//!
//! Key behaviors
//! -------------
//! - `optimization::solver` runs an iterative minimizer (L-BFGS or TRON)
//!   as a state machine with relative convergence checks, box constraints,
//!   state tracking and warm-start reuse of the initial state.
//! - `function` supplies the objectives the solver minimizes: pointwise GLM
//!   losses summed over a dataset with an optional L2 penalty.
//! - `model` holds fitted coefficients behind the `GeneralizedLinearModel`
//!   capability and fits families end to end.
//! - `evaluation` scores a dataset once and derives every metric the model
//!   supports.
//! - `data` defines records, the local/partitioned `Dataset` sum type, and
//!   the scoped coefficient broadcast used by partition workers.
//!
//! Invariants & assumptions
//! ------------------------
//! - Datasets are validated at construction; algorithms assume non-empty,
//!   dimension-consistent, finite input.
//! - The same algorithm produces the same result on local and partitioned
//!   data up to floating-point reduction order.
//!
//! Conventions
//! -----------
//! - Fallible operations return subsystem results (`OptResult`,
//!   `EvalResult`, `DataResult`); library code does not panic on
//!   recoverable conditions.
//! - Diagnostics go through the `log` facade. The crate never installs a
//!   logger.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside the code in `#[cfg(test)]` modules.
//! - `tests/integration_glm_pipeline.rs` trains and evaluates models end to
//!   end on deterministic synthetic data.

pub mod data;
pub mod evaluation;
pub mod function;
pub mod model;
pub mod optimization;
