//! evaluation — metric engine for trained GLMs.
//!
//! Purpose
//! -------
//! Compute error, ranking, likelihood and information-criterion metrics for
//! a [`GeneralizedLinearModel`](crate::model::GeneralizedLinearModel) over a
//! local or partitioned [`Dataset`](crate::data::Dataset), from a single
//! scoring pass.
//!
//! Key behaviors
//! -------------
//! - [`evaluate`] selects metrics by model capability and returns them keyed
//!   by the constants in [`metrics`].
//! - [`metrics::METRIC_METADATA`] describes every metric (ordering, range).
//! - [`select_best`] compares evaluations of competing models.
//!
//! Conventions
//! -----------
//! - Unsupported model/metric combinations are skipped, not errors.
//! - Skipped subsets and the guarded AIC are reported at `debug` level.

pub mod binary;
pub mod errors;
pub mod evaluate;
pub mod mean;
pub mod metrics;
pub mod scoring;
pub mod selection;

pub use self::errors::{EvalError, EvalResult};
pub use self::evaluate::{EvaluationResults, evaluate};
pub use self::mean::IncrementalMean;
pub use self::metrics::{METRIC_METADATA, MetricMetadata, MetricOrdering, metadata};
pub use self::selection::select_best;
