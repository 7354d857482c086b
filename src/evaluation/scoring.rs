//! evaluation::scoring — the single scoring pass shared by every metric.
use crate::{
    data::Dataset,
    evaluation::errors::{EvalError, EvalResult},
    model::glm::GeneralizedLinearModel,
};

/// Model output for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRecord {
    /// `mean_function(margin)`.
    pub score: f64,
    /// `xᵀw + offset`.
    pub margin: f64,
    pub label: f64,
}

/// Score every record of `data`, keeping the partition structure.
///
/// Partitioned data is scored in parallel, one output vector per partition;
/// local data yields a single vector in record order.
///
/// # Errors
/// [`EvalError::NonFiniteScore`] for the first record whose margin or score
/// is NaN or infinite.
pub fn score_dataset(
    model: &dyn GeneralizedLinearModel, data: &Dataset,
) -> EvalResult<Vec<Vec<ScoredRecord>>> {
    let scored = data.map_partitions(|partition| {
        partition
            .iter()
            .map(|point| ScoredRecord {
                score: model.compute_mean_function_with_offset(&point.features, point.offset),
                margin: model.compute_margin_with_offset(&point.features, point.offset),
                label: point.label,
            })
            .collect::<Vec<_>>()
    });
    match scored.iter().flatten().find(|r| !(r.score.is_finite() && r.margin.is_finite())) {
        Some(bad) => Err(EvalError::NonFiniteScore { score: bad.score, margin: bad.margin }),
        None => Ok(scored),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{Features, LabeledPoint, PartitionedDataset},
        model::glm::PoissonRegressionModel,
    };
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Partition structure is preserved and margins include offsets.
    fn scoring_keeps_partitions_and_offsets() {
        let records: Vec<LabeledPoint> = (0..5)
            .map(|i| LabeledPoint::with_offset(Features::dense(array![i as f64]).unwrap(), 1.0, 0.5))
            .collect();
        let data = Dataset::Distributed(PartitionedDataset::from_records(records, 2).unwrap());
        let model = PoissonRegressionModel::from_means(array![0.0]);

        let scored = score_dataset(&model, &data).unwrap();

        assert_eq!(scored.iter().map(Vec::len).collect::<Vec<_>>(), vec![3, 2]);
        for record in scored.iter().flatten() {
            assert_eq!(record.margin, 0.5);
            assert_eq!(record.score, 0.5f64.exp());
        }
    }

    #[test]
    // Purpose
    // -------
    // A record whose score overflows, or a model with a NaN coefficient,
    // fails the scoring pass instead of producing poisoned scores.
    //
    // Given
    // -----
    // - Poisson model w = [1]; one record with x = 1000, so exp overflows.
    // - The same data under w = [NaN].
    //
    // Expect
    // ------
    // - `NonFiniteScore` with an infinite score and margin 1000, then with a
    //   NaN margin.
    fn non_finite_scores_are_rejected() {
        // Arrange
        let records = vec![
            LabeledPoint::new(Features::dense(array![0.5]).unwrap(), 1.0),
            LabeledPoint::new(Features::dense(array![1000.0]).unwrap(), 1.0),
        ];
        let data = Dataset::local(records).unwrap();
        let overflowing = PoissonRegressionModel::from_means(array![1.0]);
        let nan = PoissonRegressionModel::from_means(array![f64::NAN]);

        // Act
        let overflow = score_dataset(&overflowing, &data);
        let poisoned = score_dataset(&nan, &data);

        // Assert
        assert_eq!(overflow, Err(EvalError::NonFiniteScore { score: f64::INFINITY, margin: 1000.0 }));
        assert!(matches!(poisoned, Err(EvalError::NonFiniteScore { margin, .. }) if margin.is_nan()));
    }
}
