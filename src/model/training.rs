//! model::training — fit a GLM family end to end.
//!
//! Pairs each [`TaskType`] with its canonical loss, minimizes the
//! (optionally L2-regularized) objective with [`minimize`], and wraps the
//! fitted coefficients in the matching model.
use log::info;

use crate::{
    data::Dataset,
    function::glm::GlmObjective,
    model::{
        coefficients::Coefficients,
        glm::{GeneralizedLinearModel, TaskType, model_for_task},
    },
    optimization::{
        errors::OptResult,
        solver::{minimize, traits::{OptimOutcome, OptimizerConfig}, types::Theta},
    },
};

/// Train a model for `task` on `data`.
///
/// Parameters
/// ----------
/// - `task`: family to fit; selects the loss (squared, logistic, Poisson).
/// - `l2_weight`: ridge penalty `½ λ ‖w‖²`; 0 disables it.
/// - `initial`: warm start; zeros when `None`.
/// - `config`: optimizer settings.
///
/// Returns
/// -------
/// The fitted model together with the optimizer outcome.
///
/// Errors
/// ------
/// [`OptError::InvalidRegularization`](crate::optimization::errors::OptError)
/// for a bad `l2_weight`, plus everything [`minimize`] reports.
pub fn train_model(
    task: TaskType, data: &Dataset, l2_weight: f64, initial: Option<Theta>,
    config: &OptimizerConfig,
) -> OptResult<(Box<dyn GeneralizedLinearModel>, OptimOutcome)> {
    let outcome = match task {
        TaskType::LinearRegression => {
            minimize(&GlmObjective::squared(l2_weight)?, data, initial, config)?
        }
        TaskType::LogisticRegression => {
            minimize(&GlmObjective::logistic(l2_weight)?, data, initial, config)?
        }
        TaskType::PoissonRegression => {
            minimize(&GlmObjective::poisson(l2_weight)?, data, initial, config)?
        }
    };
    info!(
        "trained {task} model: {} after {} iterations, objective = {:.10e}",
        outcome.reason, outcome.iterations, outcome.value
    );
    let model = model_for_task(task, Coefficients::new(outcome.coefficients.clone()));
    Ok((model, outcome))
}
