//! solver::lbfgs — projected L-BFGS step rule with Argmin line searches.
//!
//! Purpose
//! -------
//! Take one limited-memory BFGS step per `run_one_iteration`: build the
//! search direction with the two-loop recursion over the stored curvature
//! pairs, then run one Argmin line search (More–Thuente or Hager–Zhang)
//! along it through an `Executor`, and re-evaluate the accepted point
//! through the adapter so constraints are applied.
//!
//! Key behaviors
//! -------------
//! - Curvature pairs `(s, y)` are built from consecutive *projected* states
//!   and their projected gradients; pairs with `sᵀy <= 0` are skipped.
//! - Under box constraints the direction is zeroed on active coordinates and
//!   the line search runs on `f∘P`, so steps stay on the feasible face.
//! - Without history the direction is `−g/‖g‖`, a unit first step. A
//!   direction that is not a descent direction resets the history.
//! - A trial point with a non-finite objective shrinks the initial step
//!   length and retries. A failed search along a quasi-Newton direction is
//!   retried once along steepest descent. If that fails too the step
//!   returns the current coefficients with the next iteration index, which
//!   the engine reports as `ObjectiveNotImproving`; it is not an error.
use std::{collections::VecDeque, fmt};

use argmin::{
    core::{Executor, Solver},
    solver::linesearch::LineSearch,
};
use log::{debug, warn};

use crate::{
    function::objective::ObjectiveFunction,
    optimization::{
        errors::{OptError, OptResult},
        solver::{
            adapter::ObjectiveAdapter,
            builders::{build_line_search_hager_zhang, build_line_search_more_thuente},
            state::OptimizerState,
            step::StepRule,
            traits::LineSearcher,
            types::{Cost, Grad, LineSearchState, Theta},
        },
    },
};

/// Line-search attempts per iteration; each retry after a non-finite trial
/// starts from a step length `STEP_SHRINK` times shorter.
const MAX_SEARCH_ATTEMPTS: usize = 8;
const STEP_SHRINK: f64 = 0.1;

#[derive(Debug, Clone)]
struct CurvaturePair {
    s: Theta,
    y: Grad,
    rho: f64,
}

/// Limited-memory BFGS step rule.
pub struct LbfgsStep {
    line_searcher: LineSearcher,
    mem: usize,
    history: Option<VecDeque<CurvaturePair>>,
}

impl LbfgsStep {
    pub const NAME: &'static str = "L-BFGS";

    pub fn new(line_searcher: LineSearcher, mem: usize) -> Self {
        Self { line_searcher, mem, history: None }
    }

    pub fn line_searcher(&self) -> LineSearcher {
        self.line_searcher
    }

    /// History size `m`.
    pub fn memory(&self) -> usize {
        self.mem
    }

    /// Number of curvature pairs currently stored.
    pub fn stored_pairs(&self) -> usize {
        self.history.as_ref().map_or(0, VecDeque::len)
    }

    fn search<F: ObjectiveFunction>(
        &self, problem: &ObjectiveAdapter<'_, F>, current: &OptimizerState, direction: &Theta,
    ) -> OptResult<Option<Theta>> {
        let mut step_length = 1.0;
        for attempt in 1..=MAX_SEARCH_ATTEMPTS {
            let searched = match self.line_searcher {
                LineSearcher::MoreThuente => run_line_search(
                    build_line_search_more_thuente(),
                    *problem,
                    current,
                    direction,
                    step_length,
                ),
                LineSearcher::HagerZhang => run_line_search(
                    build_line_search_hager_zhang(),
                    *problem,
                    current,
                    direction,
                    step_length,
                ),
            };
            match searched {
                Err(OptError::NonFiniteObjective { value }) if attempt < MAX_SEARCH_ATTEMPTS => {
                    debug!("L-BFGS trial objective {value} at step length {step_length:e}; shrinking");
                    step_length *= STEP_SHRINK;
                }
                other => return other,
            }
        }
        Ok(None)
    }

    /// `search`, with "no acceptable step" outcomes logged and mapped to
    /// `None`.
    fn try_search<F: ObjectiveFunction>(
        &self, problem: &ObjectiveAdapter<'_, F>, current: &OptimizerState, direction: &Theta,
        iteration: usize,
    ) -> OptResult<Option<Theta>> {
        match self.search(problem, current, direction) {
            Ok(None) => {
                warn!("L-BFGS line search found no lower objective at iteration {iteration}");
                Ok(None)
            }
            Err(err) if is_search_failure(&err) => {
                warn!("L-BFGS line search failed at iteration {iteration}: {err}");
                Ok(None)
            }
            other => other,
        }
    }

    /// Give up on this iteration: drop the history and hand back the
    /// current point with the next iteration index.
    fn stay(&mut self, mut history: VecDeque<CurvaturePair>, current: &OptimizerState) -> OptimizerState {
        history.clear();
        self.history = Some(history);
        current.advanced()
    }
}

impl fmt::Debug for LbfgsStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LbfgsStep")
            .field("line_searcher", &self.line_searcher)
            .field("mem", &self.mem)
            .field("initialized", &self.history.is_some())
            .field("stored_pairs", &self.stored_pairs())
            .finish()
    }
}

impl StepRule for LbfgsStep {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init<F: ObjectiveFunction>(
        &mut self, _problem: &ObjectiveAdapter<'_, F>, _initial: &OptimizerState,
    ) -> OptResult<()> {
        self.history = Some(VecDeque::with_capacity(self.mem));
        Ok(())
    }

    fn run_one_iteration<F: ObjectiveFunction>(
        &mut self, problem: &ObjectiveAdapter<'_, F>, current: &OptimizerState,
    ) -> OptResult<OptimizerState> {
        let mut history =
            self.history.take().ok_or(OptError::StepRuleNotInitialized { name: Self::NAME })?;
        let next_iteration = current.iteration() + 1;
        let w = current.coefficients();
        let g = current.gradient();
        let g_norm = current.gradient_norm();
        if g_norm == 0.0 || !g_norm.is_finite() {
            self.history = Some(history);
            return Ok(current.advanced());
        }

        let mut direction = two_loop(&history, g, g_norm);
        problem.zero_active(w, g, &mut direction);
        if g.dot(&direction) >= 0.0 || !direction.iter().all(|d| d.is_finite()) {
            debug!("L-BFGS direction is not a descent direction at iteration {next_iteration}; history reset");
            history.clear();
            direction = g * (-1.0 / g_norm);
        }

        let mut proposed = self.try_search(problem, current, &direction, next_iteration)?;
        if proposed.is_none() && !history.is_empty() {
            debug!("L-BFGS retrying iteration {next_iteration} along the steepest-descent direction");
            history.clear();
            proposed = self.try_search(problem, current, &(g * (-1.0 / g_norm)), next_iteration)?;
        }
        let Some(proposed) = proposed else {
            return Ok(self.stay(history, current));
        };

        let next = problem.calculate_state(proposed, next_iteration)?;
        let s = next.coefficients() - w;
        let y = next.gradient() - g;
        let sy = s.dot(&y);
        if self.mem > 0 && sy > f64::EPSILON * y.dot(&y) {
            if history.len() == self.mem {
                history.pop_front();
            }
            history.push_back(CurvaturePair { s, y, rho: 1.0 / sy });
        }
        self.history = Some(history);
        Ok(next)
    }

    fn clear_inner_state(&mut self) {
        self.history = None;
    }
}

/// `−H·g` with the L-BFGS inverse-Hessian approximation.
///
/// The initial scaling is `sᵀy / yᵀy` of the newest pair, or `1/‖g‖`
/// without history.
fn two_loop(history: &VecDeque<CurvaturePair>, gradient: &Grad, g_norm: f64) -> Theta {
    let mut q = gradient.clone();
    let mut alphas = Vec::with_capacity(history.len());
    for pair in history.iter().rev() {
        let alpha = pair.rho * pair.s.dot(&q);
        q.scaled_add(-alpha, &pair.y);
        alphas.push(alpha);
    }
    let gamma = match history.back() {
        Some(pair) => 1.0 / (pair.rho * pair.y.dot(&pair.y)),
        None => 1.0 / g_norm,
    };
    let mut r = q * gamma;
    for (pair, alpha) in history.iter().zip(alphas.iter().rev()) {
        let beta = pair.rho * pair.y.dot(&r);
        r.scaled_add(alpha - beta, &pair.s);
    }
    -r
}

/// One Argmin line search from `current` along `direction`.
///
/// Returns the lowest point found, or `None` when nothing beat the start.
fn run_line_search<'a, F, L>(
    mut line_search: L, problem: ObjectiveAdapter<'a, F>, current: &OptimizerState,
    direction: &Theta, step_length: Cost,
) -> OptResult<Option<Theta>>
where
    F: ObjectiveFunction,
    L: LineSearch<Grad, Cost> + Solver<ObjectiveAdapter<'a, F>, LineSearchState>,
{
    line_search.search_direction(direction.clone());
    line_search.initial_step_length(step_length)?;
    let result = Executor::<_, _, LineSearchState>::new(problem, line_search)
        .configure(|state| {
            state
                .param(current.coefficients().clone())
                .gradient(current.gradient().clone())
                .cost(current.value())
        })
        .ctrlc(false)
        .run()?;
    let mut state = result.state;
    if !(state.get_best_cost() < current.value()) {
        return Ok(None);
    }
    Ok(state.take_best_param())
}

/// Errors that mean "no acceptable step from here" rather than a broken
/// objective or configuration.
fn is_search_failure(err: &OptError) -> bool {
    matches!(
        err,
        OptError::NonFiniteObjective { .. }
            | OptError::InvalidGradient { .. }
            | OptError::ConditionViolated { .. }
            | OptError::InvalidParameter { .. }
            | OptError::PotentialBug { .. }
            | OptError::BackendError { .. }
    )
}
