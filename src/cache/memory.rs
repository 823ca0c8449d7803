//! In-process list cache layered in front of the disk cache
//!
//! A `MemoryCache` remembers one snapshot and the instant it was stored.
//! Freshness is pull-evaluated against a TTL supplied by the reader.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A snapshot and when it was stored
#[derive(Debug, Clone)]
pub struct MemoryEntry<T> {
    pub stored_at: Instant,
    pub value: T,
}

/// Single-slot, time-stamped cache
///
/// The lock is only taken for the copy in or out, never across an await;
/// two concurrent misses may both refetch and the later store wins.
#[derive(Debug)]
pub struct MemoryCache<T> {
    entry: Mutex<Option<MemoryEntry<T>>>,
}

impl<T: Clone> MemoryCache<T> {
    pub fn new() -> Self {
        Self {
            entry: Mutex::new(None),
        }
    }

    /// Cache pre-populated with `value`, stamped now.
    pub fn seeded(value: T) -> Self {
        let cache = Self::new();
        cache.store(value);
        cache
    }

    /// The stored value if it is younger than `ttl`.
    pub fn fresh(&self, ttl: Duration) -> Option<T> {
        let guard = self.entry.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .filter(|entry| entry.stored_at.elapsed() < ttl)
            .map(|entry| entry.value.clone())
    }

    /// Replaces the stored value, stamping it now.
    pub fn store(&self, value: T) {
        let mut guard = self.entry.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(MemoryEntry {
            stored_at: Instant::now(),
            value,
        });
    }

    /// Current entry regardless of age.
    pub fn peek(&self) -> Option<MemoryEntry<T>> {
        self.entry.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
