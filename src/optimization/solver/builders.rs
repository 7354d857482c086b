//! solver::builders — construct step rules and line searches.
//!
//! Purpose
//! -------
//! Hide Argmin's generic wiring: L-BFGS steps search with either the
//! Hager–Zhang or the More–Thuente line search, and an [`AnyStepRule`] is
//! built from an [`OptimizerConfig`].
//!
//! Conventions
//! -----------
//! - The L-BFGS memory is `config.lbfgs_mem` or [`DEFAULT_LBFGS_MEM`].
//! - Line-search parameters are Argmin's defaults; the optimizer loop owns
//!   every stopping rule of the outer iteration.
use crate::optimization::solver::{
    lbfgs::LbfgsStep,
    step::AnyStepRule,
    traits::{OptimizerConfig, OptimizerType},
    tron::TronStep,
    types::{DEFAULT_LBFGS_MEM, HagerZhangLS, MoreThuenteLS},
};

/// Hager–Zhang line search with Argmin's default parameters.
pub fn build_line_search_hager_zhang() -> HagerZhangLS {
    HagerZhangLS::new()
}

/// More–Thuente line search with Argmin's default parameters.
pub fn build_line_search_more_thuente() -> MoreThuenteLS {
    MoreThuenteLS::new()
}

/// Step rule for `config.optimizer_type`.
pub fn build_step_rule(config: &OptimizerConfig) -> AnyStepRule {
    match config.optimizer_type {
        OptimizerType::Lbfgs => AnyStepRule::Lbfgs(LbfgsStep::new(
            config.line_searcher,
            config.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM),
        )),
        OptimizerType::Tron => AnyStepRule::Tron(TronStep::new(config.tron)),
    }
}
