//! Adapter that exposes an [`ObjectiveFunction`] over a [`Dataset`] as an
//! `argmin` problem, and as the evaluation surface step rules use.
//!
//! Every evaluation goes through [`ObjectiveAdapter::evaluate`], which
//! computes value and gradient together in one dataset pass and caches the
//! most recent point. Argmin asks for `cost` and `gradient` separately at
//! the same parameters; with the cache the second call is free, and so is
//! the step rule's final `calculate_state` on the accepted point.
//!
//! Under box constraints the adapter exposes `f∘P` (objective at the
//! projected point) with the projected gradient, both to argmin and in the
//! states it builds, so line searches and convergence checks see the
//! constrained problem.
use std::cell::{Cell, RefCell};

use argmin::core::{CostFunction, Error, Gradient};
use log::trace;

use crate::{
    data::Dataset,
    function::objective::ObjectiveFunction,
    optimization::{
        errors::{OptError, OptResult},
        solver::{
            constraints::ConstraintMap,
            finite_diff::hessian_vector_fd,
            state::OptimizerState,
            types::{Cost, FnEvalMap, Grad, Theta},
            validation::validate_grad,
        },
    },
};

#[derive(Debug, Clone)]
struct CachedEvaluation {
    coefficients: Theta,
    value: Cost,
    gradient: Grad,
}

/// Evaluation counters and the single-entry value/gradient cache of a solve.
#[derive(Debug, Default)]
pub struct EvaluationLedger {
    cache: RefCell<Option<CachedEvaluation>>,
    objective_count: Cell<u64>,
    hessian_vector_count: Cell<u64>,
}

impl EvaluationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of full value/gradient passes over the data.
    pub fn objective_count(&self) -> u64 {
        self.objective_count.get()
    }

    /// Number of Hessian-vector products requested.
    pub fn hessian_vector_count(&self) -> u64 {
        self.hessian_vector_count.get()
    }

    pub fn counts(&self) -> FnEvalMap {
        FnEvalMap::from([
            ("objective_count".to_string(), self.objective_count()),
            ("hessian_vector_count".to_string(), self.hessian_vector_count()),
        ])
    }
}

/// Objective, data, constraints, and ledger of one solve.
///
/// - `CostFunction::cost` / `Gradient::gradient` return an
///   [`OptError::NonFiniteObjective`] (tunnelled through argmin) when the
///   objective is not finite, so line searches never accept such a point.
/// - [`calculate_state`](Self::calculate_state) never fails on non-finite
///   values; the engine turns those into `ObjectiveNotFinite`.
pub struct ObjectiveAdapter<'a, F: ObjectiveFunction> {
    f: &'a F,
    data: &'a Dataset,
    constraints: Option<&'a ConstraintMap>,
    ledger: &'a EvaluationLedger,
}

impl<F: ObjectiveFunction> Clone for ObjectiveAdapter<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: ObjectiveFunction> Copy for ObjectiveAdapter<'_, F> {}

impl<'a, F: ObjectiveFunction> ObjectiveAdapter<'a, F> {
    pub fn new(
        f: &'a F, data: &'a Dataset, constraints: Option<&'a ConstraintMap>,
        ledger: &'a EvaluationLedger,
    ) -> Self {
        Self { f, data, constraints, ledger }
    }

    pub fn data(&self) -> &'a Dataset {
        self.data
    }

    pub fn ledger(&self) -> &'a EvaluationLedger {
        self.ledger
    }

    /// Clamp `coefficients` onto the constraint box (identity without one).
    pub fn project(&self, coefficients: Theta) -> Theta {
        match self.constraints {
            Some(c) => c.project(coefficients),
            None => coefficients,
        }
    }

    /// `true` when the adapter carries box constraints.
    pub fn is_constrained(&self) -> bool {
        self.constraints.is_some_and(|c| !c.is_empty())
    }

    /// Zero the entries of `vector` on coordinates active at `coefficients`.
    ///
    /// `gradient` must be the projected gradient at `coefficients`, as stored
    /// in the states this adapter builds.
    pub fn zero_active(&self, coefficients: &Theta, gradient: &Grad, vector: &mut Theta) {
        if let Some(c) = self.constraints {
            c.zero_active(coefficients, gradient, vector);
        }
    }

    /// Value and gradient at `coefficients`, served from cache when possible.
    ///
    /// # Errors
    /// - Any error returned by the objective.
    /// - [`OptError::GradientDimMismatch`] if the gradient has the wrong length.
    pub fn evaluate(&self, coefficients: &Theta) -> OptResult<(Cost, Grad)> {
        if let Some(hit) = self.ledger.cache.borrow().as_ref() {
            if hit.coefficients == *coefficients {
                return Ok((hit.value, hit.gradient.clone()));
            }
        }
        let (value, gradient) = self.f.calculate(self.data, coefficients)?;
        self.ledger.objective_count.set(self.ledger.objective_count.get() + 1);
        if gradient.len() != coefficients.len() {
            return Err(OptError::GradientDimMismatch {
                expected: coefficients.len(),
                found: gradient.len(),
            });
        }
        trace!("objective evaluated: value = {value:.10e}");
        *self.ledger.cache.borrow_mut() = Some(CachedEvaluation {
            coefficients: coefficients.clone(),
            value,
            gradient: gradient.clone(),
        });
        Ok((value, gradient))
    }

    /// Value of `f∘P` and its projected gradient at `coefficients`.
    pub fn evaluate_projected(&self, coefficients: &Theta) -> OptResult<(Cost, Grad)> {
        match self.constraints {
            Some(c) if !c.is_empty() => {
                let (value, gradient) = self.evaluate(&c.project(coefficients.clone()))?;
                Ok((value, c.project_gradient(coefficients, gradient)))
            }
            _ => self.evaluate(coefficients),
        }
    }

    /// Project `coefficients`, evaluate there, and wrap as a state carrying
    /// the projected gradient.
    pub fn calculate_state(&self, coefficients: Theta, iteration: usize) -> OptResult<OptimizerState> {
        let coefficients = self.project(coefficients);
        let (value, gradient) = self.evaluate_projected(&coefficients)?;
        Ok(OptimizerState::new(coefficients, value, gradient, iteration))
    }

    /// Hessian-vector product at `coefficients`.
    ///
    /// Uses the objective's analytic product when it has one and falls back
    /// to forward differences of the gradient otherwise.
    pub fn hessian_vector(&self, coefficients: &Theta, direction: &Theta) -> OptResult<Grad> {
        self.ledger.hessian_vector_count.set(self.ledger.hessian_vector_count.get() + 1);
        match self.f.hessian_vector(self.data, coefficients, direction) {
            Ok(product) => {
                validate_grad(&product, coefficients.len())?;
                Ok(product)
            }
            Err(OptError::HessianVectorNotImplemented) => {
                hessian_vector_fd(coefficients, direction, |x| self.evaluate(x).map(|(_, g)| g))
            }
            Err(e) => Err(e),
        }
    }
}

impl<F: ObjectiveFunction> CostFunction for ObjectiveAdapter<'_, F> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, coefficients: &Self::Param) -> Result<Self::Output, Error> {
        let (value, _) = self.evaluate_projected(coefficients)?;
        if !value.is_finite() {
            return Err(OptError::NonFiniteObjective { value }.into());
        }
        Ok(value)
    }
}

impl<F: ObjectiveFunction> Gradient for ObjectiveAdapter<'_, F> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, coefficients: &Self::Param) -> Result<Self::Gradient, Error> {
        let (value, gradient) = self.evaluate_projected(coefficients)?;
        if !value.is_finite() {
            return Err(OptError::NonFiniteObjective { value }.into());
        }
        validate_grad(&gradient, coefficients.len())?;
        Ok(gradient)
    }
}
