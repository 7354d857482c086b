//! model — trained generalized linear models.
//!
//! - [`coefficients::Coefficients`]: fitted means and optional variances,
//!   with the effective-parameter count used by information criteria.
//! - [`glm::GeneralizedLinearModel`]: the capability the evaluation engine
//!   consumes, plus the linear, logistic and Poisson families.
//! - [`training::train_model`]: fit a family with the optimizer.

pub mod coefficients;
pub mod glm;
pub mod training;

pub use self::coefficients::{Coefficients, EFFECTIVE_PARAMETER_TOLERANCE};
pub use self::glm::{
    GeneralizedLinearModel, LinearRegressionModel, LogisticRegressionModel, PoissonRegressionModel,
    TaskType, model_for_task,
};
pub use self::training::train_model;
