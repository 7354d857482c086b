//! evaluation::selection — pick the best of several evaluated models.
use crate::evaluation::{
    errors::{EvalError, EvalResult},
    evaluate::EvaluationResults,
    metrics::metadata,
};

/// Return the candidate whose `metric` is best under the metric's ordering.
///
/// Candidates without the metric (or with a NaN value) are skipped; on ties
/// the earliest candidate wins.
///
/// # Errors
/// - [`EvalError::UnknownMetric`] if `metric` is not in the metadata table.
/// - [`EvalError::NoCandidates`] for an empty input.
/// - [`EvalError::MissingMetric`] if no candidate reports `metric`.
pub fn select_best<K>(
    candidates: impl IntoIterator<Item = (K, EvaluationResults)>, metric: &str,
) -> EvalResult<(K, EvaluationResults)> {
    let meta = metadata(metric).ok_or_else(|| EvalError::UnknownMetric { name: metric.to_string() })?;
    let mut seen = false;
    let mut best: Option<(f64, K, EvaluationResults)> = None;
    for (key, results) in candidates {
        seen = true;
        let Some(&value) = results.get(metric) else { continue };
        if value.is_nan() {
            continue;
        }
        if best.as_ref().is_none_or(|(incumbent, _, _)| meta.is_better(value, *incumbent)) {
            best = Some((value, key, results));
        }
    }
    match best {
        Some((_, key, results)) => Ok((key, results)),
        None if !seen => Err(EvalError::NoCandidates),
        None => Err(EvalError::MissingMetric { name: metric.to_string() }),
    }
}
