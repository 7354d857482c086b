//! Configuration and result types for the optimizer.
//!
//! - [`Tolerances`]: relative stopping tolerances and the iteration cap.
//! - [`LineSearcher`] / [`OptimizerType`]: string-parsable solver choices.
//! - [`TronOptions`]: trust-region specific limits.
//! - [`OptimizerConfig`]: everything an [`Optimizer`] needs, with per-type
//!   defaults.
//! - [`OptimOutcome`]: normalized result returned by the high-level
//!   [`minimize`] API.
//!
//! [`Optimizer`]: crate::optimization::solver::engine::Optimizer
//! [`minimize`]: crate::optimization::solver::api::minimize
use std::str::FromStr;

use crate::optimization::{
    errors::{OptError, OptResult},
    solver::{
        constraints::ConstraintMap,
        state::OptimizerState,
        tracker::ConvergenceReason,
        types::{Cost, FnEvalMap, Theta},
        validation::{verify_tol_cost, verify_tol_grad},
    },
};

/// Choice of line search used inside the L-BFGS solver.
///
/// Parsing is case-insensitive (`"MoreThuente"`, `"hagerzhang"`, ...).
/// Unknown names return `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Step rule driving the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerType {
    /// Limited-memory BFGS with a line search.
    Lbfgs,
    /// Trust-region Newton with truncated conjugate gradient.
    Tron,
}

impl FromStr for OptimizerType {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lbfgs" | "l-bfgs" => Ok(OptimizerType::Lbfgs),
            "tron" => Ok(OptimizerType::Tron),
            _ => Err(OptError::InvalidOptimizerType {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'LBFGS' or 'TRON'.",
            }),
        }
    }
}

/// Relative stopping tolerances and the iteration cap.
///
/// - `tol_grad`: stop when `‖g_k‖ <= tol_grad · ‖g_0‖`.
/// - `tol_cost`: stop when `|f_k − f_{k−1}| <= tol_cost · |f_0|`.
/// - `max_iter`: hard cap on accepted iterations (always required).
///
/// `f_0`/`g_0` come from the stored initial state of the optimizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: usize,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: usize) -> OptResult<Self> {
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Trust-region limits.
///
/// - `max_cg_iterations`: cap on truncated-CG iterations per trial step.
/// - `max_improvement_failures`: rejected trial steps tolerated in one
///   iteration before giving up and returning the previous point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TronOptions {
    pub max_cg_iterations: usize,
    pub max_improvement_failures: usize,
}

impl TronOptions {
    pub const DEFAULT_MAX_CG_ITERATIONS: usize = 20;
    pub const DEFAULT_MAX_IMPROVEMENT_FAILURES: usize = 5;

    /// # Errors
    /// [`OptError::InvalidTronOption`] if either limit is zero.
    pub fn new(max_cg_iterations: usize, max_improvement_failures: usize) -> OptResult<Self> {
        if max_cg_iterations == 0 {
            return Err(OptError::InvalidTronOption {
                option: "max_cg_iterations",
                value: max_cg_iterations,
                reason: "Must be greater than zero.",
            });
        }
        if max_improvement_failures == 0 {
            return Err(OptError::InvalidTronOption {
                option: "max_improvement_failures",
                value: max_improvement_failures,
                reason: "Must be greater than zero.",
            });
        }
        Ok(Self { max_cg_iterations, max_improvement_failures })
    }
}

impl Default for TronOptions {
    fn default() -> Self {
        Self {
            max_cg_iterations: Self::DEFAULT_MAX_CG_ITERATIONS,
            max_improvement_failures: Self::DEFAULT_MAX_IMPROVEMENT_FAILURES,
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `optimizer_type`: L-BFGS or TRON.
/// - `tols`: relative tolerances and iteration cap.
/// - `line_searcher`: line search used by L-BFGS (ignored by TRON).
/// - `lbfgs_mem`: L-BFGS history size; `None` uses [`DEFAULT_LBFGS_MEM`].
/// - `tron`: trust-region limits (ignored by L-BFGS).
/// - `constraints`: optional per-feature box constraints.
/// - `track_states`: record every accepted state in the tracker.
/// - `reuse_previous_initial_state`: keep the first solve's initial state as
///   the convergence reference for later solves.
/// - `verbose`: log per-iteration progress at `info` instead of `debug`.
///
/// Defaults (see [`OptimizerConfig::lbfgs`] / [`OptimizerConfig::tron`]):
/// - L-BFGS: 100 iterations, tolerance 1e-7, More–Thuente, memory 10.
/// - TRON: 15 iterations, tolerance 1e-5, 20 CG iterations, 5 failures.
///
/// [`DEFAULT_LBFGS_MEM`]: crate::optimization::solver::types::DEFAULT_LBFGS_MEM
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    pub optimizer_type: OptimizerType,
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub lbfgs_mem: Option<usize>,
    pub tron: TronOptions,
    pub constraints: Option<ConstraintMap>,
    pub track_states: bool,
    pub reuse_previous_initial_state: bool,
    pub verbose: bool,
}

impl OptimizerConfig {
    pub const LBFGS_DEFAULT_MAX_ITER: usize = 100;
    pub const LBFGS_DEFAULT_TOLERANCE: f64 = 1e-7;
    pub const TRON_DEFAULT_MAX_ITER: usize = 15;
    pub const TRON_DEFAULT_TOLERANCE: f64 = 1e-5;

    /// Default L-BFGS configuration.
    pub fn lbfgs() -> Self {
        Self::for_type(OptimizerType::Lbfgs)
    }

    /// Default TRON configuration.
    pub fn tron() -> Self {
        Self::for_type(OptimizerType::Tron)
    }

    /// Defaults for the given optimizer type.
    pub fn for_type(optimizer_type: OptimizerType) -> Self {
        let (tol, max_iter) = match optimizer_type {
            OptimizerType::Lbfgs => (Self::LBFGS_DEFAULT_TOLERANCE, Self::LBFGS_DEFAULT_MAX_ITER),
            OptimizerType::Tron => (Self::TRON_DEFAULT_TOLERANCE, Self::TRON_DEFAULT_MAX_ITER),
        };
        Self {
            optimizer_type,
            tols: Tolerances { tol_grad: Some(tol), tol_cost: Some(tol), max_iter },
            line_searcher: LineSearcher::MoreThuente,
            lbfgs_mem: None,
            tron: TronOptions::default(),
            constraints: None,
            track_states: true,
            reuse_previous_initial_state: false,
            verbose: false,
        }
    }

    /// Replace the tolerances.
    pub fn with_tolerances(mut self, tols: Tolerances) -> Self {
        self.tols = tols;
        self
    }

    /// Attach box constraints.
    pub fn with_constraints(mut self, constraints: ConstraintMap) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Choose the L-BFGS line search.
    pub fn with_line_searcher(mut self, line_searcher: LineSearcher) -> Self {
        self.line_searcher = line_searcher;
        self
    }

    /// Set the L-BFGS history size.
    ///
    /// # Errors
    /// [`OptError::InvalidLBFGSMem`] if `mem == 0`.
    pub fn with_lbfgs_mem(mut self, mem: usize) -> OptResult<Self> {
        if mem == 0 {
            return Err(OptError::InvalidLBFGSMem {
                mem,
                reason: "L-BFGS memory must be greater than zero.",
            });
        }
        self.lbfgs_mem = Some(mem);
        Ok(self)
    }

    pub fn with_tron_options(mut self, tron: TronOptions) -> Self {
        self.tron = tron;
        self
    }

    pub fn with_state_tracking(mut self, track_states: bool) -> Self {
        self.track_states = track_states;
        self
    }

    pub fn with_reuse_previous_initial_state(mut self, reuse: bool) -> Self {
        self.reuse_previous_initial_state = reuse;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::lbfgs()
    }
}

/// Canonical result returned by `minimize`.
///
/// - `coefficients`: final coefficient vector.
/// - `value`: objective value at `coefficients`.
/// - `converged`: `true` unless the run hit the iteration cap.
/// - `reason`: why the run stopped.
/// - `iterations`: number of accepted iterations.
/// - `fn_evals`: dataset passes (`"objective_count"`) and Hessian-vector
///   products (`"hessian_vector_count"`).
/// - `grad_norm`: Euclidean norm of the final gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub coefficients: Theta,
    pub value: Cost,
    pub converged: bool,
    pub reason: ConvergenceReason,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: f64,
}

impl OptimOutcome {
    /// Build an outcome from the final optimizer state.
    pub fn new(final_state: OptimizerState, reason: ConvergenceReason, fn_evals: FnEvalMap) -> Self {
        let converged = reason != ConvergenceReason::MaxIterations;
        let iterations = final_state.iteration();
        let grad_norm = final_state.gradient_norm();
        let value = final_state.value();
        Self {
            coefficients: final_state.into_coefficients(),
            value,
            converged,
            reason,
            iterations,
            fn_evals,
            grad_norm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation in `Tolerances::new`, `TronOptions::new`, and
    //   `OptimizerConfig::with_lbfgs_mem`.
    // - Case-insensitive parsing of solver choices.
    // - Per-type defaults.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `Tolerances::new` accepts absent tolerances but rejects a zero
    // iteration cap and non-positive tolerances.
    fn tolerances_validate_inputs() {
        assert!(Tolerances::new(None, None, 10).is_ok());
        assert!(matches!(Tolerances::new(None, None, 0), Err(OptError::InvalidMaxIter { .. })));
        assert!(matches!(
            Tolerances::new(Some(-1.0), None, 10),
            Err(OptError::InvalidTolGrad { .. })
        ));
        assert!(matches!(
            Tolerances::new(None, Some(f64::INFINITY), 10),
            Err(OptError::InvalidTolCost { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Solver names parse regardless of case; unknown names carry the input.
    fn solver_choices_parse_case_insensitively() {
        assert_eq!("HAGERZHANG".parse::<LineSearcher>().unwrap(), LineSearcher::HagerZhang);
        assert_eq!("morethuente".parse::<LineSearcher>().unwrap(), LineSearcher::MoreThuente);
        assert_eq!("Tron".parse::<OptimizerType>().unwrap(), OptimizerType::Tron);
        assert_eq!("L-BFGS".parse::<OptimizerType>().unwrap(), OptimizerType::Lbfgs);
        match "newton".parse::<OptimizerType>() {
            Err(OptError::InvalidOptimizerType { name, .. }) => assert_eq!(name, "newton"),
            other => panic!("expected InvalidOptimizerType, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Each optimizer type gets its own iteration cap and tolerance, and
    // invalid TRON/L-BFGS limits are rejected.
    fn defaults_depend_on_optimizer_type() {
        let lbfgs = OptimizerConfig::default();
        assert_eq!(lbfgs.optimizer_type, OptimizerType::Lbfgs);
        assert_eq!(lbfgs.tols.max_iter, 100);
        assert_eq!(lbfgs.tols.tol_grad, Some(1e-7));

        let tron = OptimizerConfig::tron();
        assert_eq!(tron.tols.max_iter, 15);
        assert_eq!(tron.tols.tol_cost, Some(1e-5));
        assert_eq!(tron.tron, TronOptions::new(20, 5).unwrap());

        assert!(matches!(TronOptions::new(0, 5), Err(OptError::InvalidTronOption { .. })));
        assert!(matches!(
            OptimizerConfig::lbfgs().with_lbfgs_mem(0),
            Err(OptError::InvalidLBFGSMem { mem: 0, .. })
        ));
    }
}
