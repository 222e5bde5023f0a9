//! Bounded LRU memoization of endpoint results.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

/// Defines the behavior of the in-memory result cache for an API call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Read from the cache if an entry is present; otherwise fetch from the network
    /// and write the result to the cache. (Default)
    #[default]
    Use,
    /// Always fetch from the network, bypassing any cached entry, and write the new
    /// result to the cache.
    Refresh,
    /// Always fetch from the network and do not read from or write to the cache.
    Bypass,
}

impl CacheMode {
    pub(crate) const fn reads(self) -> bool {
        matches!(self, Self::Use)
    }

    pub(crate) const fn writes(self) -> bool {
        !matches!(self, Self::Bypass)
    }
}

/// Operation name plus its fully resolved, crumb-free arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    op: &'static str,
    args: String,
}

impl CacheKey {
    pub(crate) fn new(op: &'static str, args: impl Into<String>) -> Self {
        Self {
            op,
            args: args.into(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    value: Value,
    stamp: u64,
}

#[derive(Debug, Default)]
struct LruState {
    entries: HashMap<CacheKey, Entry>,
    // stamp -> key, oldest first
    order: BTreeMap<u64, CacheKey>,
    clock: u64,
}

impl LruState {
    fn touch(&mut self, key: &CacheKey) -> Option<&Entry> {
        self.clock += 1;
        let now = self.clock;
        let entry = self.entries.get_mut(key)?;
        self.order.remove(&entry.stamp);
        entry.stamp = now;
        self.order.insert(now, key.clone());
        Some(&*entry)
    }
}

/// A thread-safe, size-bounded LRU cache of decoded JSON results.
///
/// The lock is never held across an await point.
#[derive(Debug)]
pub(crate) struct ResultCache {
    capacity: usize,
    state: Mutex<LruState>,
}

impl ResultCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(LruState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn get(&self, key: &CacheKey) -> Option<Value> {
        if self.capacity == 0 {
            return None;
        }
        self.lock().touch(key).map(|e| e.value.clone())
    }

    pub(crate) fn put(&self, key: CacheKey, value: Value) {
        if self.capacity == 0 {
            return;
        }
        let mut state = self.lock();
        state.clock += 1;
        let stamp = state.clock;
        if let Some(old) = state.entries.insert(key.clone(), Entry { value, stamp }) {
            state.order.remove(&old.stamp);
        }
        state.order.insert(stamp, key);

        while state.entries.len() > self.capacity {
            let Some((_, oldest)) = state.order.pop_first() else {
                break;
            };
            state.entries.remove(&oldest);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub(crate) fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
    }
}
