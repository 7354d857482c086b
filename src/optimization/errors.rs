//! optimization::errors — unified error surface for the solver stack.
//!
//! Purpose
//! -------
//! Collect every failure the optimizer can report (configuration mistakes,
//! malformed constraints, numerical breakdowns, backend solver errors, and
//! invalid input data) into one enum, [`OptError`], with a common result
//! alias [`OptResult<T>`].
//!
//! Conventions
//! -----------
//! - Variants carry the offending value and a short `&'static str` reason
//!   where the value alone does not explain the rejection.
//! - Argmin errors never cross module boundaries raw: [`From<Error>`]
//!   first recovers an [`OptError`] that was tunnelled through argmin by the
//!   objective adapter, then maps [`ArgminError`] kinds one to one.
use argmin::core::{ArgminError, Error};

use crate::data::errors::DataError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient / Hessian ----
    /// Gradient dimensions do not match coefficient dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite.
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// The objective has no analytic Hessian-vector product; finite
    /// differences of the gradient are used instead.
    HessianVectorNotImplemented,

    // ---- Options ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// Objective change tolerance needs to be positive and finite.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// Invalid line searcher name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },
    /// Invalid optimizer type name.
    InvalidOptimizerType {
        name: String,
        reason: &'static str,
    },
    /// lbfgs_mem needs to be at least 1.
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },
    /// A TRON option is out of range.
    InvalidTronOption {
        option: &'static str,
        value: usize,
        reason: &'static str,
    },
    /// Regularization weight needs to be finite and non-negative.
    InvalidRegularization {
        weight: f64,
        reason: &'static str,
    },

    // ---- Constraints ----
    /// Bounds for one feature are NaN or inverted.
    InvalidConstraint {
        index: usize,
        lower: f64,
        upper: f64,
        reason: &'static str,
    },
    /// A constrained feature index is outside the coefficient vector.
    ConstraintIndexOutOfRange {
        index: usize,
        dim: usize,
    },

    // ---- Objective / state ----
    /// The objective value or gradient became NaN or infinite.
    NonFiniteObjective {
        value: f64,
    },
    /// Initial coefficients do not match the data dimension.
    CoefficientDimMismatch {
        expected: usize,
        found: usize,
    },
    /// A step rule was asked to iterate before `init`.
    StepRuleNotInitialized {
        name: &'static str,
    },
    /// The backend solver returned a state without coefficients.
    MissingCoefficients,

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckpointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Data ----
    /// The dataset handed to the optimizer failed validation.
    InvalidData(DataError),

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient / Hessian ----
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }
            OptError::HessianVectorNotImplemented => {
                write!(f, "Hessian-vector product not implemented")
            }

            // ---- Options ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid objective change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidOptimizerType { name, reason } => {
                write!(f, "Invalid optimizer type '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }
            OptError::InvalidTronOption { option, value, reason } => {
                write!(f, "Invalid TRON option {option} = {value}: {reason}")
            }
            OptError::InvalidRegularization { weight, reason } => {
                write!(f, "Invalid regularization weight {weight}: {reason}")
            }

            // ---- Constraints ----
            OptError::InvalidConstraint { index, lower, upper, reason } => {
                write!(f, "Invalid bounds [{lower}, {upper}] for feature {index}: {reason}")
            }
            OptError::ConstraintIndexOutOfRange { index, dim } => {
                write!(f, "Constraint on feature {index} is out of range for dimension {dim}")
            }

            // ---- Objective / state ----
            OptError::NonFiniteObjective { value } => {
                write!(f, "Non-finite objective value or gradient: {value}")
            }
            OptError::CoefficientDimMismatch { expected, found } => {
                write!(f, "Coefficient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::StepRuleNotInitialized { name } => {
                write!(f, "Step rule {name} used before initialization")
            }
            OptError::MissingCoefficients => {
                write!(f, "Solver state is missing coefficients")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Data ----
            OptError::InvalidData(err) => write!(f, "Invalid data: {err}"),

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<DataError> for OptError {
    fn from(err: DataError) -> Self {
        OptError::InvalidData(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Recovery of an `OptError` tunnelled through `argmin::core::Error`.
    // - Mapping of `ArgminError` kinds and foreign errors.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // An `OptError` raised inside an argmin callback comes back unchanged.
    fn argmin_error_round_trips_opt_error() {
        let tunnelled: Error = OptError::NonFiniteObjective { value: f64::INFINITY }.into();
        assert_eq!(OptError::from(tunnelled), OptError::NonFiniteObjective { value: f64::INFINITY });
    }

    #[test]
    // Purpose
    // -------
    // Argmin's own error kinds map to the matching wrapper variant, and any
    // other error becomes `BackendError` carrying its message.
    fn argmin_error_kinds_are_mapped() {
        let condition: Error = ArgminError::ConditionViolated { text: "descent".to_string() }.into();
        assert_eq!(
            OptError::from(condition),
            OptError::ConditionViolated { text: "descent".to_string() }
        );

        let foreign: Error = DataError::EmptyDataset.into();
        match OptError::from(foreign) {
            OptError::BackendError { text } => assert!(text.contains("no records")),
            other => panic!("expected BackendError, got {other:?}"),
        }
    }
}
