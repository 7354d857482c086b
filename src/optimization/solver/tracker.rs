//! solver::tracker — per-solve history and termination reason.
//!
//! Purpose
//! -------
//! Record what happened during one call to `Optimizer::optimize`: every
//! accepted [`OptimizerState`] (when tracking is enabled) with the time
//! elapsed since the solve started, and the [`ConvergenceReason`] the solve
//! stopped for.
//!
//! Invariants & assumptions
//! ------------------------
//! - A fresh tracker is created at the start of every solve, so histories
//!   never mix runs.
//! - Appended iteration indices are contiguous, starting at 0.
//! - The reason is `None` until the solve terminates and is written once.
use std::{
    fmt,
    time::{Duration, Instant},
};

use crate::optimization::solver::state::OptimizerState;

/// Why the optimizer stopped.
///
/// Checked in declaration order after every step; the first that applies
/// wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvergenceReason {
    /// Objective value or gradient became NaN/∞.
    ObjectiveNotFinite,
    /// The iteration cap was reached.
    MaxIterations,
    /// The step left the coefficients unchanged.
    ObjectiveNotImproving,
    /// Relative objective change fell below `tol_cost`.
    FunctionValuesConverged,
    /// Relative gradient norm fell below `tol_grad`.
    GradientConverged,
}

impl fmt::Display for ConvergenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConvergenceReason::ObjectiveNotFinite => "objective not finite",
            ConvergenceReason::MaxIterations => "max iterations reached",
            ConvergenceReason::ObjectiveNotImproving => "objective not improving",
            ConvergenceReason::FunctionValuesConverged => "function values converged",
            ConvergenceReason::GradientConverged => "gradient converged",
        };
        f.write_str(text)
    }
}

/// A tracked state and when it was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedState {
    pub state: OptimizerState,
    pub elapsed: Duration,
}

/// Ordered history of one solve plus its termination reason.
#[derive(Debug, Clone)]
pub struct OptimizationStatesTracker {
    started: Instant,
    enabled: bool,
    states: Vec<TrackedState>,
    convergence_reason: Option<ConvergenceReason>,
}

impl OptimizationStatesTracker {
    /// Start a new history; with `enabled == false` only the reason is kept.
    pub fn new(enabled: bool) -> Self {
        Self { started: Instant::now(), enabled, states: Vec::new(), convergence_reason: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record an accepted state.
    pub fn append(&mut self, state: &OptimizerState) {
        if self.enabled {
            self.states.push(TrackedState { state: state.clone(), elapsed: self.started.elapsed() });
        }
    }

    /// Write the termination reason.
    pub fn seal(&mut self, reason: ConvergenceReason) {
        self.convergence_reason = Some(reason);
    }

    pub fn convergence_reason(&self) -> Option<ConvergenceReason> {
        self.convergence_reason
    }

    pub fn states(&self) -> &[TrackedState] {
        &self.states
    }

    /// Iteration indices in recording order.
    pub fn iterations(&self) -> Vec<usize> {
        self.states.iter().map(|t| t.state.iteration()).collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Default for OptimizationStatesTracker {
    fn default() -> Self {
        Self::new(true)
    }
}

impl fmt::Display for OptimizationStatesTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>9} {:>12} {:>20} {:>16}", "iteration", "time (s)", "value", "|gradient|")?;
        for tracked in &self.states {
            writeln!(
                f,
                "{:>9} {:>12.6} {:>20.10e} {:>16.6e}",
                tracked.state.iteration(),
                tracked.elapsed.as_secs_f64(),
                tracked.state.value(),
                tracked.state.gradient_norm()
            )?;
        }
        match self.convergence_reason {
            Some(reason) => write!(f, "convergence reason: {reason}"),
            None => write!(f, "convergence reason: not terminated"),
        }
    }
}
