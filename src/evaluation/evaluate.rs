//! evaluation::evaluate — derive every applicable metric for a model.
//!
//! Purpose
//! -------
//! Score a dataset once with a trained [`GeneralizedLinearModel`] and derive
//! all metrics the model's capabilities support from that single pass.
//!
//! Key behaviors
//! -------------
//! - Regression models get MAE, MSE and RMSE; binary classifiers get the
//!   areas under ROC and precision/recall plus peak F1.
//! - Poisson models report the mean of `y·m − eᵐ − lnΓ(1 + y)`; logistic
//!   models report the mean Bernoulli log-likelihood of the score clamped
//!   to `[1e-9, 1 − 1e-9]`. Linear models have no likelihood metric.
//! - With a likelihood metric, the corrected AIC
//!   `2(k − n·LL) + 2k(k + 1)/(n − k − 1)` is added, where `k` counts
//!   coefficients with `|w| > 1e-9`. It is omitted when `n − k − 1 <= 0`.
//! - Means on partitioned data are per-partition running means merged with
//!   [`IncrementalMean::merge`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Model dimension equals the dataset's feature dimension; checked before
//!   scoring.
//! - Keys of the result are the name constants in
//!   [`metrics`](crate::evaluation::metrics); regression and classifier key
//!   sets are disjoint.
use std::collections::HashMap;

use log::debug;
use rayon::prelude::*;
use statrs::function::gamma::ln_gamma;

use crate::{
    data::Dataset,
    evaluation::{
        binary::binary_metrics,
        errors::{EvalError, EvalResult},
        mean::IncrementalMean,
        metrics::{
            AKAIKE_INFORMATION_CRITERION, AREA_UNDER_PRECISION_RECALL, AREA_UNDER_ROC,
            DATA_LOG_LIKELIHOOD, MEAN_ABSOLUTE_ERROR, MEAN_SQUARE_ERROR, PEAK_F1_SCORE,
            ROOT_MEAN_SQUARE_ERROR,
        },
        scoring::{ScoredRecord, score_dataset},
    },
    model::{
        coefficients::EFFECTIVE_PARAMETER_TOLERANCE,
        glm::{GeneralizedLinearModel, TaskType},
    },
    optimization::numerical_stability::clamp_probability,
};

/// Metric name to value.
pub type EvaluationResults = HashMap<String, f64>;

/// Evaluate `model` on `data`.
///
/// Errors
/// ------
/// - [`EvalError::CoefficientDimMismatch`] if the model and the data
///   disagree in dimension.
/// - [`EvalError::NonFiniteScore`] if a record's margin or score is NaN or
///   infinite.
/// - [`EvalError::DegenerateLabels`] for a classifier on single-class labels.
/// - [`EvalError::NonFiniteLogLikelihood`] if a per-record likelihood term is
///   NaN or infinite.
pub fn evaluate(model: &dyn GeneralizedLinearModel, data: &Dataset) -> EvalResult<EvaluationResults> {
    let dim = data.num_features();
    if model.coefficients().len() != dim {
        return Err(EvalError::CoefficientDimMismatch {
            expected: dim,
            found: model.coefficients().len(),
        });
    }

    let scored = score_dataset(model, data)?;
    let mut results = EvaluationResults::new();

    if model.is_regression() {
        let mae = partitioned_mean(&scored, |r| (r.score - r.label).abs());
        let mse = partitioned_mean(&scored, |r| (r.score - r.label).powi(2));
        if let (Some(mae), Some(mse)) = (mae, mse) {
            results.insert(MEAN_ABSOLUTE_ERROR.to_string(), mae);
            results.insert(MEAN_SQUARE_ERROR.to_string(), mse);
            results.insert(ROOT_MEAN_SQUARE_ERROR.to_string(), mse.sqrt());
        }
    } else {
        debug!("{} is not a regression model; skipping error metrics", model.task_type());
    }

    if model.is_binary_classifier() {
        let mut pairs: Vec<(f64, f64)> =
            scored.iter().flatten().map(|r| (r.score, r.label)).collect();
        let binary = binary_metrics(&mut pairs)?;
        results.insert(AREA_UNDER_ROC.to_string(), binary.area_under_roc);
        results.insert(AREA_UNDER_PRECISION_RECALL.to_string(), binary.area_under_precision_recall);
        results.insert(PEAK_F1_SCORE.to_string(), binary.peak_f1);
    } else {
        debug!("{} is not a binary classifier; skipping ranking metrics", model.task_type());
    }

    let log_likelihood = match model.task_type() {
        TaskType::PoissonRegression => {
            partitioned_try_mean(&scored, |r| checked(r, poisson_log_likelihood(r.margin, r.label)))?
        }
        TaskType::LogisticRegression => {
            partitioned_try_mean(&scored, |r| checked(r, logistic_log_likelihood(r.score, r.label)))?
        }
        TaskType::LinearRegression => None,
    };

    if let Some(ll) = log_likelihood {
        results.insert(DATA_LOG_LIKELIHOOD.to_string(), ll);
        let k = model.coefficients().effective_parameter_count(EFFECTIVE_PARAMETER_TOLERANCE);
        match akaike_information_criterion(data.len(), k, ll) {
            Some(aic) => {
                results.insert(AKAIKE_INFORMATION_CRITERION.to_string(), aic);
            }
            None => debug!(
                "omitting AIC: {} records leave no degrees of freedom for {k} effective parameters",
                data.len()
            ),
        }
    }

    Ok(results)
}

/// `y·m − eᵐ − lnΓ(1 + y)` for margin `m` and count `y`.
pub fn poisson_log_likelihood(margin: f64, label: f64) -> f64 {
    label * margin - margin.exp() - ln_gamma(1.0 + label)
}

/// `ln p` for a positive label (`> 0.5`), `ln(1 − p)` otherwise, with the
/// score clamped away from 0 and 1.
pub fn logistic_log_likelihood(score: f64, label: f64) -> f64 {
    let p = clamp_probability(score);
    if label > 0.5 { p.ln() } else { (1.0 - p).ln() }
}

/// Small-sample corrected AIC for `n` records, `k` effective parameters and
/// mean log-likelihood `ll`; `None` when `n − k − 1 <= 0`.
pub fn akaike_information_criterion(n: usize, k: usize, ll: f64) -> Option<f64> {
    let denominator = n as f64 - k as f64 - 1.0;
    if denominator <= 0.0 {
        return None;
    }
    let (n, k) = (n as f64, k as f64);
    Some(2.0 * (k - n * ll) + 2.0 * k * (k + 1.0) / denominator)
}

fn checked(record: &ScoredRecord, value: f64) -> EvalResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFiniteLogLikelihood { score: record.score, label: record.label, value })
    }
}

fn partitioned_mean<F>(scored: &[Vec<ScoredRecord>], f: F) -> Option<f64>
where
    F: Fn(&ScoredRecord) -> f64 + Sync,
{
    scored
        .par_iter()
        .map(|partition| partition.iter().map(&f).collect::<IncrementalMean>())
        .reduce(IncrementalMean::new, IncrementalMean::merge)
        .mean()
}

fn partitioned_try_mean<F>(scored: &[Vec<ScoredRecord>], f: F) -> EvalResult<Option<f64>>
where
    F: Fn(&ScoredRecord) -> EvalResult<f64> + Sync,
{
    let partials: Vec<IncrementalMean> = scored
        .par_iter()
        .map(|partition| {
            partition.iter().try_fold(IncrementalMean::new(), |acc, record| -> EvalResult<_> {
                Ok(acc.push(f(record)?))
            })
        })
        .collect::<EvalResult<_>>()?;
    Ok(partials.into_iter().fold(IncrementalMean::new(), IncrementalMean::merge).mean())
}
