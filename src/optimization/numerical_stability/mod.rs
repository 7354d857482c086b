//! numerical_stability — numerically robust link functions.
//!
//! Purpose
//! -------
//! Collect the stable scalar transforms shared by the GLM losses, the
//! concrete models, and the log-likelihood metrics, together with the
//! probability clamp used when scoring Bernoulli likelihoods.
//!
//! Conventions
//! -----------
//! - Pure `f64 -> f64` helpers; no I/O, logging, or global state, so they
//!   are safe to call inside per-record folds.
//! - Inputs are assumed finite; records are validated upstream.

pub mod transformations;

pub use self::transformations::{
    LOG_LIKELIHOOD_EPSILON, clamp_probability, safe_logistic, safe_softplus,
};
