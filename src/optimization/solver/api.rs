//! solver::api — one-call minimization entry point.
use crate::{
    data::Dataset,
    function::objective::ObjectiveFunction,
    optimization::{
        errors::{OptError, OptResult},
        solver::{
            engine::Optimizer,
            traits::{OptimOutcome, OptimizerConfig},
            types::Theta,
        },
    },
};

/// Minimize `f` over `data` with a freshly built optimizer.
///
/// Parameters
/// ----------
/// - `f`: objective providing value and gradient (and, for TRON, optionally
///   an analytic Hessian-vector product).
/// - `data`: local or partitioned dataset.
/// - `initial`: starting coefficients; zeros when `None`.
/// - `config`: optimizer type, tolerances, constraints and solver options.
///
/// Returns
/// -------
/// [`OptimOutcome`] with the final coefficients and value, the termination
/// reason, the number of iterations, evaluation counts and the final
/// gradient norm.
///
/// Errors
/// ------
/// Everything [`Optimizer::optimize`] reports, including
/// [`OptError::NonFiniteObjective`] when the objective stops being finite.
pub fn minimize<F: ObjectiveFunction>(
    f: &F, data: &Dataset, initial: Option<Theta>, config: &OptimizerConfig,
) -> OptResult<OptimOutcome> {
    let mut optimizer = Optimizer::new(config.clone());
    optimizer.optimize(f, data, initial)?;
    let reason = optimizer.states_tracker().convergence_reason().ok_or(OptError::UnknownError)?;
    let final_state = optimizer.current_state().cloned().ok_or(OptError::MissingCoefficients)?;
    Ok(OptimOutcome::new(final_state, reason, optimizer.fn_evals().clone()))
}
