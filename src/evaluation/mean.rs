//! evaluation::mean — mergeable running mean.
//!
//! [`IncrementalMean`] keeps `(count, mean)` and updates it one value at a
//! time with Welford's recurrence. Two partial means (e.g. from different
//! partitions) merge with
//!
//! `mean = mean_a + (mean_b − mean_a) · count_b / (count_a + count_b)`,
//!
//! which is order-independent up to rounding, so partitioned data can be
//! reduced in any tree shape.

/// Running mean of a stream of values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IncrementalMean {
    count: u64,
    mean: f64,
}

impl IncrementalMean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one value into the mean.
    pub fn push(mut self, value: f64) -> Self {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
        self
    }

    /// Combine two partial means.
    pub fn merge(self, other: Self) -> Self {
        if other.count == 0 {
            return self;
        }
        if self.count == 0 {
            return other;
        }
        let count = self.count + other.count;
        let mean = self.mean + (other.mean - self.mean) * (other.count as f64 / count as f64);
        Self { count, mean }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean of everything pushed; `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }
}

impl FromIterator<f64> for IncrementalMean {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::push)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // Merging per-partition means reproduces the single-pass mean for any
    // split, including empty partitions.
    //
    // Given
    // -----
    // - values 1..=10 split as [1..3], [], [4..10] and as [1..9], [10].
    //
    // Expect
    // ------
    // - every merged mean is 5.5 within 1e-12, counts are 10.
    fn merged_partitions_match_single_pass() {
        // Arrange
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let single: IncrementalMean = values.iter().copied().collect();

        // Act
        let a: IncrementalMean = values[..3].iter().copied().collect();
        let empty = IncrementalMean::new();
        let b: IncrementalMean = values[3..].iter().copied().collect();
        let three_way = a.merge(empty).merge(b);
        let reversed = b.merge(empty.merge(a));
        let c: IncrementalMean = values[..9].iter().copied().collect();
        let d: IncrementalMean = values[9..].iter().copied().collect();

        // Assert
        assert_relative_eq!(single.mean().unwrap(), 5.5, epsilon = 1e-12);
        assert_relative_eq!(three_way.mean().unwrap(), 5.5, epsilon = 1e-12);
        assert_relative_eq!(reversed.mean().unwrap(), 5.5, epsilon = 1e-12);
        assert_relative_eq!(c.merge(d).mean().unwrap(), 5.5, epsilon = 1e-12);
        assert_eq!(three_way.count(), 10);
        assert_eq!(IncrementalMean::new().mean(), None);
    }
}
