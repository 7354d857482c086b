//! data::broadcast — scoped read-only sharing of driver values with partitions.
//!
//! A [`Broadcast`] wraps a value the driver hands to every partition worker for
//! the duration of one distributed computation (typically the coefficient
//! vector of the current iteration). Workers only read it through
//! [`Broadcast::handle`]. The broadcast is released when the guard is dropped
//! or explicitly [`Broadcast::unpersist`]ed, so a value from iteration `k`
//! can never be read while iteration `k+1` is being evaluated.
//!
//! Every broadcast is registered with a [`BroadcastRegistry`] owned by the
//! dataset, which keeps `issued`/`live` counters. `live` must be back at zero
//! after every evaluation; a non-zero value is a leaked broadcast.
use std::sync::{
    Arc,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};

/// Issued/live counters for broadcasts created against one dataset.
#[derive(Debug, Default)]
pub struct BroadcastRegistry {
    issued: AtomicU64,
    live: AtomicUsize,
}

impl BroadcastRegistry {
    /// Total number of broadcasts ever created.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    /// Broadcasts created but not yet released.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

/// Read-only value shared with all partitions for one computation.
#[derive(Debug)]
pub struct Broadcast<'r, T> {
    value: Arc<T>,
    registry: &'r BroadcastRegistry,
}

impl<'r, T> Broadcast<'r, T> {
    pub fn new(value: T, registry: &'r BroadcastRegistry) -> Self {
        registry.issued.fetch_add(1, Ordering::Relaxed);
        registry.live.fetch_add(1, Ordering::AcqRel);
        Self { value: Arc::new(value), registry }
    }

    /// A worker-side handle to the shared value.
    pub fn handle(&self) -> Arc<T> {
        Arc::clone(&self.value)
    }

    /// Release the broadcast now.
    pub fn unpersist(self) {
        drop(self);
    }
}

impl<T> Drop for Broadcast<'_, T> {
    fn drop(&mut self) {
        self.registry.live.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // The registry counts a broadcast as live until it is unpersisted, and
    // as issued forever after.
    fn registry_tracks_live_and_issued_broadcasts() {
        // Arrange
        let registry = BroadcastRegistry::default();

        // Act
        let first = Broadcast::new(vec![1.0_f64, 2.0], &registry);
        let handle = first.handle();
        let live_during = registry.live();
        first.unpersist();
        {
            let _second = Broadcast::new(3.0_f64, &registry);
        }

        // Assert
        assert_eq!(live_during, 1);
        assert_eq!(registry.live(), 0);
        assert_eq!(registry.issued(), 2);
        assert_eq!(handle.as_slice(), &[1.0, 2.0]);
    }
}
