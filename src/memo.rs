//! Run-scoped memoization shared across worker threads.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A `Mutex<HashMap>` cache of pure computations.
///
/// Values are computed outside the lock, so two workers racing on the same key may
/// both compute it; the first insert wins and both get the same value back.
#[derive(Debug)]
pub struct Memo<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> Memo<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(hit) = self.lock().get(&key) {
            return hit.clone();
        }
        let value = compute();
        self.lock().entry(key).or_insert(value).clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, V>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K: Eq + Hash, V: Clone> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn computes_once_per_key() {
        let memo: Memo<u32, u32> = Memo::new();
        let calls = Cell::new(0);
        for _ in 0..3 {
            let v = memo.get_or_insert_with(7, || {
                calls.set(calls.get() + 1);
                49
            });
            assert_eq!(v, 49);
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(memo.len(), 1);
    }
}
