//! optimization::solver — iterative minimizers over a [`Dataset`].
//!
//! Purpose
//! -------
//! Minimize a differentiable [`ObjectiveFunction`] with either L-BFGS (argmin
//! More–Thuente or Hager–Zhang line searches) or a trust-region Newton
//! method (TRON) driven by Hessian-vector products.
//!
//! Key behaviors
//! -------------
//! - [`Optimizer`] owns the loop: initial state, convergence checks, state
//!   tracking, constraint projection. A [`StepRule`] computes one step.
//! - Every objective evaluation goes through [`ObjectiveAdapter`], which caches
//!   the latest value/gradient pair and counts dataset passes.
//! - [`minimize`] is the one-call entry point returning an [`OptimOutcome`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Coefficients handed to the objective are always inside the constraint box.
//! - Under constraints, state gradients are projected gradients, so the
//!   gradient-norm test measures constrained optimality.
//! - Tracked iteration indices are contiguous from 0.
//!
//! [`Dataset`]: crate::data::Dataset
//! [`ObjectiveFunction`]: crate::function::objective::ObjectiveFunction

pub mod adapter;
pub mod api;
pub mod builders;
pub mod constraints;
pub mod engine;
pub mod finite_diff;
pub mod lbfgs;
pub mod state;
pub mod step;
pub mod tracker;
pub mod traits;
pub mod tron;
pub mod types;
pub mod validation;

pub use self::adapter::{EvaluationLedger, ObjectiveAdapter};
pub use self::api::minimize;
pub use self::constraints::ConstraintMap;
pub use self::engine::{Optimizer, OptimizerStatus};
pub use self::lbfgs::LbfgsStep;
pub use self::state::OptimizerState;
pub use self::step::{AnyStepRule, StepRule};
pub use self::tracker::{ConvergenceReason, OptimizationStatesTracker, TrackedState};
pub use self::traits::{
    LineSearcher, OptimOutcome, OptimizerConfig, OptimizerType, Tolerances, TronOptions,
};
pub use self::tron::TronStep;
pub use self::types::{Cost, Grad, Theta};
