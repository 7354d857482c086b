//! data::dataset — local and partitioned datasets behind one sum type.
//!
//! Purpose
//! -------
//! Give every algorithm in the crate a single input type, [`Dataset`], that is
//! either a partitioned collection processed data-parallel across workers or
//! an ordered in-memory collection processed on the calling thread. The same
//! optimizer and evaluation code runs unchanged on both.
//!
//! Key behaviors
//! -------------
//! - [`Dataset::aggregate`] is the tree-aggregate primitive: fold every
//!   partition with `seq_op` starting from `zero()`, then combine partials
//!   with `comb_op`. On partitioned data the coefficient vector is broadcast
//!   once per call and released before returning.
//! - [`Dataset::map_partitions`] runs a per-partition closure (in parallel for
//!   partitioned data) and returns the per-partition results in partition
//!   order; the local variant is a single partition.
//!
//! Invariants & assumptions
//! ------------------------
//! - Datasets are validated on construction: at least one record, every
//!   record has the same feature dimension, labels and offsets are finite.
//! - Partitions may individually be empty; only the total must be non-zero.
//! - `seq_op`/`comb_op` must be associative/commutative up to floating-point
//!   rounding; no ordering across partitions is guaranteed.
use ndarray::Array1;
use rayon::prelude::*;

use crate::data::{
    broadcast::{Broadcast, BroadcastRegistry},
    errors::{DataError, DataResult},
    point::LabeledPoint,
};

/// Records split into partitions, processed in parallel.
#[derive(Debug)]
pub struct PartitionedDataset {
    partitions: Vec<Vec<LabeledPoint>>,
    dim: usize,
    len: usize,
    broadcasts: BroadcastRegistry,
}

/// Ordered records processed on the calling thread.
#[derive(Debug, Clone)]
pub struct LocalDataset {
    records: Vec<LabeledPoint>,
    dim: usize,
}

/// Input to the optimizer and the evaluation engine.
#[derive(Debug)]
pub enum Dataset {
    Distributed(PartitionedDataset),
    Local(LocalDataset),
}

impl PartitionedDataset {
    /// Build from explicit partitions.
    ///
    /// # Errors
    /// See [`validate_records`]; [`DataError::EmptyDataset`] if all partitions
    /// are empty.
    pub fn new(partitions: Vec<Vec<LabeledPoint>>) -> DataResult<Self> {
        let dim = validate_records(partitions.iter().flatten())?;
        let len = partitions.iter().map(Vec::len).sum();
        Ok(Self { partitions, dim, len, broadcasts: BroadcastRegistry::default() })
    }

    /// Split `records` into `num_partitions` contiguous, near-equal chunks.
    pub fn from_records(records: Vec<LabeledPoint>, num_partitions: usize) -> DataResult<Self> {
        let num_partitions = num_partitions.max(1);
        let chunk = records.len().div_ceil(num_partitions).max(1);
        let mut partitions: Vec<Vec<LabeledPoint>> = Vec::with_capacity(num_partitions);
        let mut iter = records.into_iter().peekable();
        while iter.peek().is_some() {
            partitions.push(iter.by_ref().take(chunk).collect());
        }
        Self::new(partitions)
    }

    pub fn partitions(&self) -> &[Vec<LabeledPoint>] {
        &self.partitions
    }

    /// Broadcast bookkeeping for this dataset.
    pub fn broadcasts(&self) -> &BroadcastRegistry {
        &self.broadcasts
    }
}

impl LocalDataset {
    /// # Errors
    /// See [`validate_records`].
    pub fn new(records: Vec<LabeledPoint>) -> DataResult<Self> {
        let dim = validate_records(records.iter())?;
        Ok(Self { records, dim })
    }

    pub fn records(&self) -> &[LabeledPoint] {
        &self.records
    }
}

impl Dataset {
    /// Local dataset from ordered records.
    pub fn local(records: Vec<LabeledPoint>) -> DataResult<Self> {
        Ok(Dataset::Local(LocalDataset::new(records)?))
    }

    /// Partitioned dataset from explicit partitions.
    pub fn distributed(partitions: Vec<Vec<LabeledPoint>>) -> DataResult<Self> {
        Ok(Dataset::Distributed(PartitionedDataset::new(partitions)?))
    }

    /// Feature dimension shared by every record.
    pub fn num_features(&self) -> usize {
        match self {
            Dataset::Distributed(d) => d.dim,
            Dataset::Local(l) => l.dim,
        }
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        match self {
            Dataset::Distributed(d) => d.len,
            Dataset::Local(l) => l.records.len(),
        }
    }

    /// Always `false` for a validated dataset.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_partitions(&self) -> usize {
        match self {
            Dataset::Distributed(d) => d.partitions.len(),
            Dataset::Local(_) => 1,
        }
    }

    /// Broadcast counters; `None` for local data, which never broadcasts.
    pub fn broadcasts(&self) -> Option<&BroadcastRegistry> {
        match self {
            Dataset::Distributed(d) => Some(&d.broadcasts),
            Dataset::Local(_) => None,
        }
    }

    /// Fold every record against `coefficients` and reduce the partials.
    ///
    /// Parameters
    /// ----------
    /// - `coefficients`: vector every `seq_op` call reads; broadcast once on
    ///   partitioned data and released before returning.
    /// - `zero`: produces the neutral accumulator (one per partition plus the
    ///   reduction identity).
    /// - `seq_op`: folds one record into an accumulator.
    /// - `comb_op`: merges two partial accumulators.
    ///
    /// Returns
    /// -------
    /// The fully reduced accumulator. Local data is a single sequential fold,
    /// so the result equals the partitioned result up to reduction order.
    pub fn aggregate<A, Z, S, C>(
        &self, coefficients: &Array1<f64>, zero: Z, seq_op: S, comb_op: C,
    ) -> A
    where
        A: Send,
        Z: Fn() -> A + Sync + Send,
        S: Fn(A, &LabeledPoint, &Array1<f64>) -> A + Sync + Send,
        C: Fn(A, A) -> A + Sync + Send,
    {
        match self {
            Dataset::Distributed(d) => {
                let broadcast = Broadcast::new(coefficients.clone(), &d.broadcasts);
                let result = d
                    .partitions
                    .par_iter()
                    .map(|partition| {
                        let w = broadcast.handle();
                        partition.iter().fold(zero(), |acc, point| seq_op(acc, point, w.as_ref()))
                    })
                    .reduce(&zero, &comb_op);
                broadcast.unpersist();
                result
            }
            Dataset::Local(l) => {
                l.records.iter().fold(zero(), |acc, point| seq_op(acc, point, coefficients))
            }
        }
    }

    /// Apply `f` to every partition, returning results in partition order.
    pub fn map_partitions<T, F>(&self, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&[LabeledPoint]) -> T + Sync + Send,
    {
        match self {
            Dataset::Distributed(d) => d.partitions.par_iter().map(|p| f(p.as_slice())).collect(),
            Dataset::Local(l) => vec![f(l.records.as_slice())],
        }
    }
}

/// Validate records and return their common feature dimension.
///
/// # Errors
/// - [`DataError::EmptyDataset`] if there are no records.
/// - [`DataError::FeatureDimMismatch`] for the first record whose dimension
///   differs from the first record's.
/// - [`DataError::NonFiniteLabel`] / [`DataError::NonFiniteOffset`].
pub fn validate_records<'a>(records: impl Iterator<Item = &'a LabeledPoint>) -> DataResult<usize> {
    let mut dim: Option<usize> = None;
    for (record, point) in records.enumerate() {
        let found = point.features.dim();
        let expected = *dim.get_or_insert(found);
        if found != expected {
            return Err(DataError::FeatureDimMismatch { record, expected, found });
        }
        if !point.label.is_finite() {
            return Err(DataError::NonFiniteLabel { record, value: point.label });
        }
        if !point.offset.is_finite() {
            return Err(DataError::NonFiniteOffset { record, value: point.offset });
        }
    }
    dim.ok_or(DataError::EmptyDataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::point::Features;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction/validation of local and partitioned datasets.
    // - Agreement of `aggregate` across representations.
    // - Release of the coefficient broadcast after each aggregate.
    // -------------------------------------------------------------------------

    fn points(n: usize) -> Vec<LabeledPoint> {
        (0..n)
            .map(|i| {
                let x = i as f64;
                LabeledPoint::new(Features::dense(array![1.0, x]).unwrap(), 0.5 * x)
            })
            .collect()
    }

    #[test]
    // Purpose
    // -------
    // `aggregate` returns the same sum of margins on local data and on the
    // same records split into uneven partitions.
    //
    // Given
    // -----
    // - 7 records with features [1, i]; w = [1, 2]; margins 1 + 2i.
    //
    // Expect
    // ------
    // - Both sums equal Σ(1 + 2i) = 7 + 42 = 49.
    fn aggregate_agrees_between_local_and_partitioned() {
        // Arrange
        let w = array![1.0, 2.0];
        let local = Dataset::local(points(7)).unwrap();
        let distributed = Dataset::Distributed(PartitionedDataset::from_records(points(7), 3).unwrap());

        // Act
        let sum = |d: &Dataset| d.aggregate(&w, || 0.0, |acc, p, w| acc + p.margin(w), |a, b| a + b);

        // Assert
        assert_eq!(sum(&local), 49.0);
        assert_eq!(sum(&distributed), 49.0);
        assert_eq!(distributed.num_partitions(), 3);
        assert_eq!(distributed.len(), 7);
    }

    #[test]
    // Purpose
    // -------
    // Each aggregate on partitioned data issues exactly one broadcast and
    // leaves none live afterwards.
    fn aggregate_releases_broadcast() {
        let w = array![0.0, 1.0];
        let data = Dataset::Distributed(PartitionedDataset::from_records(points(10), 4).unwrap());
        for _ in 0..3 {
            let _ = data.aggregate(&w, || 0usize, |acc, _, _| acc + 1, |a, b| a + b);
        }
        let registry = data.broadcasts().unwrap();
        assert_eq!(registry.issued(), 3);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    // Purpose
    // -------
    // Validation rejects empty data, mismatched dimensions, and non-finite
    // labels; empty partitions are tolerated when others hold records.
    fn validation_rejects_malformed_datasets() {
        assert!(matches!(Dataset::local(Vec::new()), Err(DataError::EmptyDataset)));
        assert!(matches!(Dataset::distributed(vec![Vec::new(), Vec::new()]), Err(DataError::EmptyDataset)));

        let mut mixed = points(2);
        mixed.push(LabeledPoint::new(Features::dense(array![1.0]).unwrap(), 0.0));
        assert!(matches!(
            Dataset::local(mixed),
            Err(DataError::FeatureDimMismatch { record: 2, expected: 2, found: 1 })
        ));

        let bad_label = vec![LabeledPoint::new(Features::dense(array![1.0]).unwrap(), f64::NAN)];
        assert!(matches!(Dataset::local(bad_label), Err(DataError::NonFiniteLabel { record: 0, .. })));

        let ok = Dataset::distributed(vec![Vec::new(), points(2)]).unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.num_features(), 2);
    }
}
