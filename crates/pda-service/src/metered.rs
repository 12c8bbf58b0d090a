//! Counter decorator that reports contention to the metrics facade.

use pda_registry::{AtomicCounter, CounterError};

/// Wraps an [`AtomicCounter`] and counts every contended increment as
/// `pda_counter_retries_total`.
#[derive(Debug)]
pub struct MeteredCounter<C> {
    inner: C,
}

impl<C: AtomicCounter> MeteredCounter<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: AtomicCounter> AtomicCounter for MeteredCounter<C> {
    fn atomic_increment(&self, key: &str) -> Result<u64, CounterError> {
        let result = self.inner.atomic_increment(key);
        if matches!(result, Err(CounterError::Contended { .. })) {
            metrics::counter!("pda_counter_retries_total").increment(1);
        }
        result
    }

    fn current(&self, key: &str) -> Result<u64, CounterError> {
        self.inner.current(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pda_registry::InMemoryCounter;

    #[test]
    fn passes_values_through() {
        let counter = MeteredCounter::new(InMemoryCounter::new());
        assert_eq!(counter.atomic_increment("k").unwrap(), 1);
        assert_eq!(counter.atomic_increment("k").unwrap(), 2);
        assert_eq!(counter.current("k").unwrap(), 2);
        assert_eq!(counter.inner().current("k").unwrap(), 2);
    }
}
