//! function — objectives the optimizer can minimize.
//!
//! - [`objective::ObjectiveFunction`]: the capability the optimizer consumes
//!   (value + gradient in one pass, optional Hessian-vector product).
//! - [`loss`]: pointwise losses on the margin scale for the three canonical
//!   GLM families.
//! - [`glm::GlmObjective`]: sum of pointwise losses over a dataset with an
//!   optional L2 penalty.

pub mod glm;
pub mod loss;
pub mod objective;

pub use self::glm::GlmObjective;
pub use self::loss::{LogisticLoss, PointwiseLoss, PoissonLoss, SquaredLoss};
pub use self::objective::ObjectiveFunction;
