//! data — labeled records, datasets, and broadcast plumbing.
//!
//! Purpose
//! -------
//! Own the input side of the crate: records ([`LabeledPoint`]) with dense or
//! sparse [`Features`], the two-case [`Dataset`] sum type (partitioned vs
//! local), and the [`Broadcast`] guard used to share per-iteration
//! coefficients with partition workers.
//!
//! Conventions
//! -----------
//! - Data-parallel work on partitioned data uses `rayon`; the local variant is
//!   always processed sequentially on the calling thread.
//! - Validation happens once at construction and reports [`DataError`];
//!   downstream code assumes validated input.

pub mod broadcast;
pub mod dataset;
pub mod errors;
pub mod point;

pub use self::broadcast::{Broadcast, BroadcastRegistry};
pub use self::dataset::{Dataset, LocalDataset, PartitionedDataset};
pub use self::errors::{DataError, DataResult};
pub use self::point::{Features, LabeledPoint, SparseVector};
