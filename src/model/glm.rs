//! model::glm — the generalized-linear-model capability and its families.
//!
//! Purpose
//! -------
//! Describe a trained GLM by what the evaluation engine needs from it: the
//! coefficients, the task it solves, and its inverse link ("mean function")
//! on the margin scale. Metric selection keys off the capability tags
//! [`GeneralizedLinearModel::is_regression`] and
//! [`GeneralizedLinearModel::is_binary_classifier`] plus the [`TaskType`].
//!
//! Key behaviors
//! -------------
//! - Margins are `xᵀw + offset`; scores are `mean_function(margin)`.
//! - Linear and Poisson regression are regression models; logistic
//!   regression is a binary classifier.
//!
//! Invariants & assumptions
//! ------------------------
//! - Feature vectors passed in have the coefficients' dimension; this is
//!   checked once per dataset by the evaluation engine, not per record.
use std::fmt;

use ndarray::Array1;

use crate::{
    data::Features,
    model::coefficients::Coefficients,
    optimization::numerical_stability::safe_logistic,
};

/// The learning task a model was trained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    LinearRegression,
    LogisticRegression,
    PoissonRegression,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskType::LinearRegression => "linear regression",
            TaskType::LogisticRegression => "logistic regression",
            TaskType::PoissonRegression => "poisson regression",
        };
        f.write_str(name)
    }
}

/// A trained generalized linear model.
pub trait GeneralizedLinearModel: Send + Sync {
    fn coefficients(&self) -> &Coefficients;

    fn task_type(&self) -> TaskType;

    /// Inverse link applied to a margin.
    fn mean_function(&self, margin: f64) -> f64;

    /// `xᵀw + offset`.
    fn compute_margin_with_offset(&self, features: &Features, offset: f64) -> f64 {
        features.dot(self.coefficients().means()) + offset
    }

    /// `mean_function(xᵀw + offset)`.
    fn compute_mean_function_with_offset(&self, features: &Features, offset: f64) -> f64 {
        self.mean_function(self.compute_margin_with_offset(features, offset))
    }

    fn is_regression(&self) -> bool {
        matches!(self.task_type(), TaskType::LinearRegression | TaskType::PoissonRegression)
    }

    fn is_binary_classifier(&self) -> bool {
        self.task_type() == TaskType::LogisticRegression
    }
}

/// Identity link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressionModel {
    coefficients: Coefficients,
}

/// Logistic link; scores are probabilities of the positive class.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegressionModel {
    coefficients: Coefficients,
}

/// Log link; scores are expected counts.
#[derive(Debug, Clone, PartialEq)]
pub struct PoissonRegressionModel {
    coefficients: Coefficients,
}

macro_rules! impl_model_constructors {
    ($($model:ident),+) => {$(
        impl $model {
            pub fn new(coefficients: Coefficients) -> Self {
                Self { coefficients }
            }

            /// Model from coefficient means only.
            pub fn from_means(means: Array1<f64>) -> Self {
                Self::new(Coefficients::new(means))
            }
        }
    )+};
}

impl_model_constructors!(LinearRegressionModel, LogisticRegressionModel, PoissonRegressionModel);

impl GeneralizedLinearModel for LinearRegressionModel {
    fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    fn task_type(&self) -> TaskType {
        TaskType::LinearRegression
    }

    fn mean_function(&self, margin: f64) -> f64 {
        margin
    }
}

impl GeneralizedLinearModel for LogisticRegressionModel {
    fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    fn task_type(&self) -> TaskType {
        TaskType::LogisticRegression
    }

    fn mean_function(&self, margin: f64) -> f64 {
        safe_logistic(margin)
    }
}

impl LogisticRegressionModel {
    /// 1.0 when the predicted probability exceeds `threshold`, else 0.0.
    pub fn predict_class_with_offset(&self, features: &Features, offset: f64, threshold: f64) -> f64 {
        if self.compute_mean_function_with_offset(features, offset) > threshold { 1.0 } else { 0.0 }
    }
}

impl GeneralizedLinearModel for PoissonRegressionModel {
    fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    fn task_type(&self) -> TaskType {
        TaskType::PoissonRegression
    }

    fn mean_function(&self, margin: f64) -> f64 {
        margin.exp()
    }
}

/// Box a model of the given task around `coefficients`.
pub fn model_for_task(task: TaskType, coefficients: Coefficients) -> Box<dyn GeneralizedLinearModel> {
    match task {
        TaskType::LinearRegression => Box::new(LinearRegressionModel::new(coefficients)),
        TaskType::LogisticRegression => Box::new(LogisticRegressionModel::new(coefficients)),
        TaskType::PoissonRegression => Box::new(PoissonRegressionModel::new(coefficients)),
    }
}
