//! Per-document write serialization
//!
//! One mutex per statebook key. Load-modify-save on the same file runs one at
//! a time; different files proceed in parallel.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Registry of per-document mutexes
///
/// Clones share the registry, so every [`Statebook`](crate::Statebook)
/// built with the same locks serializes against the others.
#[derive(Debug, Clone, Default)]
pub struct DocumentLocks {
    by_key: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl DocumentLocks {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn mutex_for(&self, key: &str) -> Arc<Mutex<()>> {
        if let Some(existing) = self.by_key.get(key) {
            return Arc::clone(existing.value());
        }
        // shard guard released before the caller blocks on the mutex
        let entry = self.by_key.entry(key.to_string()).or_default();
        Arc::clone(entry.value())
    }

    /// Run `f` while holding the lock for `key`
    pub fn with_lock<R>(&self, key: &str, f: impl FnOnce() -> R) -> R {
        let mutex = self.mutex_for(key);
        let _guard = mutex.lock();
        f()
    }

    /// Number of keys seen so far
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn same_key_is_exclusive() {
        let locks = DocumentLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let overlap = Arc::new(AtomicUsize::new(0));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let locks = locks.clone();
                let inside = Arc::clone(&inside);
                let overlap = Arc::clone(&overlap);
                scope.spawn(move || {
                    for _ in 0..50 {
                        locks.with_lock("book.json", || {
                            if inside.fetch_add(1, Ordering::SeqCst) > 0 {
                                overlap.fetch_add(1, Ordering::SeqCst);
                            }
                            std::thread::yield_now();
                            inside.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                });
            }
        });

        assert_eq!(overlap.load(Ordering::SeqCst), 0);
        assert_eq!(locks.len(), 1);
    }

    #[test]
    fn keys_are_independent() {
        let locks = DocumentLocks::new();
        let nested = locks.with_lock("a.json", || locks.with_lock("b.json", || 7));
        assert_eq!(nested, 7);
        assert_eq!(locks.len(), 2);
    }
}
