//! solver::step — the seam between the optimizer loop and a step algorithm.
//!
//! The engine owns everything step algorithms have in common: the initial
//! state, convergence checks, state tracking, and constraint validation. A
//! [`StepRule`] only knows how to turn the current state into the next one.
use crate::{
    function::objective::ObjectiveFunction,
    optimization::{
        errors::OptResult,
        solver::{
            adapter::ObjectiveAdapter, lbfgs::LbfgsStep, state::OptimizerState, tron::TronStep,
        },
    },
};

/// One iteration of an iterative minimization algorithm.
///
/// Contract:
/// - `init` is called once per solve with the iteration-0 state, after
///   `clear_inner_state`.
/// - `run_one_iteration` returns a state whose iteration index is exactly
///   `current.iteration() + 1`; coefficients must already be projected
///   (use [`ObjectiveAdapter::calculate_state`]). Returning the current
///   coefficients signals that no improving step was found.
/// - `clear_inner_state` drops everything carried between iterations
///   (curvature history, trust radius).
pub trait StepRule {
    fn name(&self) -> &'static str;

    fn init<F: ObjectiveFunction>(
        &mut self, problem: &ObjectiveAdapter<'_, F>, initial: &OptimizerState,
    ) -> OptResult<()>;

    fn run_one_iteration<F: ObjectiveFunction>(
        &mut self, problem: &ObjectiveAdapter<'_, F>, current: &OptimizerState,
    ) -> OptResult<OptimizerState>;

    fn clear_inner_state(&mut self);
}

/// Step rule chosen at runtime from an `OptimizerConfig`.
#[derive(Debug)]
pub enum AnyStepRule {
    Lbfgs(LbfgsStep),
    Tron(TronStep),
}

impl StepRule for AnyStepRule {
    fn name(&self) -> &'static str {
        match self {
            AnyStepRule::Lbfgs(s) => s.name(),
            AnyStepRule::Tron(s) => s.name(),
        }
    }

    fn init<F: ObjectiveFunction>(
        &mut self, problem: &ObjectiveAdapter<'_, F>, initial: &OptimizerState,
    ) -> OptResult<()> {
        match self {
            AnyStepRule::Lbfgs(s) => s.init(problem, initial),
            AnyStepRule::Tron(s) => s.init(problem, initial),
        }
    }

    fn run_one_iteration<F: ObjectiveFunction>(
        &mut self, problem: &ObjectiveAdapter<'_, F>, current: &OptimizerState,
    ) -> OptResult<OptimizerState> {
        match self {
            AnyStepRule::Lbfgs(s) => s.run_one_iteration(problem, current),
            AnyStepRule::Tron(s) => s.run_one_iteration(problem, current),
        }
    }

    fn clear_inner_state(&mut self) {
        match self {
            AnyStepRule::Lbfgs(s) => s.clear_inner_state(),
            AnyStepRule::Tron(s) => s.clear_inner_state(),
        }
    }
}
