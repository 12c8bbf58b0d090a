//! # Atomic Counters
//!
//! [`AtomicCounter`] is the storage capability behind per-zone sequence
//! numbers: a fetch-and-increment that can never hand the same value to two
//! callers. A database backend implements it with `UPDATE … RETURNING` or a
//! row lock, a cache with `INCR`; [`InMemoryCounter`] serves single-node
//! deployments and tests with a compare-and-swap loop.
//!
//! Backends signal a lost race with [`CounterError::Contended`]. The caller
//! decides how often to retry, through a [`RetryPolicy`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::error::CounterError;

/// Atomic fetch-and-increment keyed by counter name.
pub trait AtomicCounter: Send + Sync {
    /// Add one to the counter and return the new value. A missing counter
    /// starts at zero, so its first increment returns 1.
    fn atomic_increment(&self, key: &str) -> Result<u64, CounterError>;

    /// Read the current value without changing it.
    fn current(&self, key: &str) -> Result<u64, CounterError>;
}

impl<T: AtomicCounter + ?Sized> AtomicCounter for Arc<T> {
    fn atomic_increment(&self, key: &str) -> Result<u64, CounterError> {
        (**self).atomic_increment(key)
    }

    fn current(&self, key: &str) -> Result<u64, CounterError> {
        (**self).current(key)
    }
}

/// In-process counter map. Each key owns an `AtomicU64` advanced by a
/// bounded compare-and-swap loop.
#[derive(Debug)]
pub struct InMemoryCounter {
    counters: DashMap<String, Arc<AtomicU64>>,
    max_spins: u32,
}

impl InMemoryCounter {
    /// Default number of CAS attempts before reporting contention.
    pub const DEFAULT_MAX_SPINS: u32 = 64;

    /// Create an empty counter map.
    pub fn new() -> Self {
        Self::with_max_spins(Self::DEFAULT_MAX_SPINS)
    }

    /// Create an empty counter map with a custom CAS attempt bound.
    pub fn with_max_spins(max_spins: u32) -> Self {
        Self {
            counters: DashMap::new(),
            max_spins: max_spins.max(1),
        }
    }

    /// Set a counter's starting value, e.g. when loading zones whose
    /// sequences were issued by a previous process.
    pub fn seed(&self, key: &str, value: u64) {
        self.slot(key).store(value, Ordering::Release);
    }

    fn slot(&self, key: &str) -> Arc<AtomicU64> {
        // Clone the Arc out so the shard lock is released before the CAS loop.
        Arc::clone(
            self.counters
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AtomicU64::new(0)))
                .value(),
        )
    }
}

impl Default for InMemoryCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicCounter for InMemoryCounter {
    fn atomic_increment(&self, key: &str) -> Result<u64, CounterError> {
        let slot = self.slot(key);
        let mut current = slot.load(Ordering::Acquire);
        for _ in 0..self.max_spins {
            let next = current.checked_add(1).ok_or_else(|| {
                CounterError::Unavailable(format!("counter {key} overflowed"))
            })?;
            match slot.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return Ok(next),
                Err(actual) => current = actual,
            }
        }
        Err(CounterError::Contended {
            key: key.to_string(),
        })
    }

    fn current(&self, key: &str) -> Result<u64, CounterError> {
        Ok(self
            .counters
            .get(key)
            .map(|slot| slot.load(Ordering::Acquire))
            .unwrap_or(0))
    }
}

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each time after.
    pub base_backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy. At least one attempt is always made.
    pub fn new(max_attempts: u32, base_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(10);
        self.base_backoff.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn first_increment_returns_one() {
        let c = InMemoryCounter::new();
        assert_eq!(c.current("zone:a").unwrap(), 0);
        assert_eq!(c.atomic_increment("zone:a").unwrap(), 1);
        assert_eq!(c.atomic_increment("zone:a").unwrap(), 2);
        assert_eq!(c.atomic_increment("zone:b").unwrap(), 1);
        assert_eq!(c.current("zone:a").unwrap(), 2);
    }

    #[test]
    fn seed_sets_starting_point() {
        let c = InMemoryCounter::new();
        c.seed("zone:a", 41);
        assert_eq!(c.atomic_increment("zone:a").unwrap(), 42);
    }

    #[test]
    fn concurrent_increments_never_collide() {
        let c = Arc::new(InMemoryCounter::with_max_spins(10_000));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&c);
                thread::spawn(move || {
                    (0..500)
                        .map(|_| c.atomic_increment("zone:hot").unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for v in h.join().unwrap() {
                assert!(seen.insert(v), "value {v} issued twice");
            }
        }
        assert_eq!(seen.len(), 4_000);
        assert_eq!(c.current("zone:hot").unwrap(), 4_000);
    }

    #[test]
    fn backoff_doubles() {
        let p = RetryPolicy::new(4, Duration::from_millis(5));
        assert_eq!(p.backoff(1), Duration::from_millis(5));
        assert_eq!(p.backoff(2), Duration::from_millis(10));
        assert_eq!(p.backoff(3), Duration::from_millis(20));
    }

    #[test]
    fn policy_always_allows_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }
}
