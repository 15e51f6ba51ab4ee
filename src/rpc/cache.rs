use bitcoin::Txid;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Capacity used by [`ScriptCache::new`]
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Thread-safe cache of first-input unlocking scripts
///
/// Mined transactions never change, so an entry stays valid until it is
/// evicted. Holds at most `capacity` entries, dropping the oldest insert first.
#[derive(Clone)]
pub struct ScriptCache {
    entries: Arc<Mutex<Entries>>,
    stats: Arc<Mutex<CacheStats>>,
    capacity: usize,
}

#[derive(Default)]
struct Entries {
    scripts: HashMap<Txid, Vec<u8>>,
    order: VecDeque<Txid>,
}

impl Default for ScriptCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl ScriptCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty cache holding at most `capacity` scripts; zero disables caching
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Entries::default())),
            stats: Arc::new(Mutex::new(CacheStats::default())),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached script for `txid`, counting a hit or a miss
    pub fn get(&self, txid: &Txid) -> Option<Vec<u8>> {
        let found = lock(&self.entries).scripts.get(txid).cloned();
        let mut stats = lock(&self.stats);
        if found.is_some() {
            stats.hits += 1;
            debug!("Cache hit for transaction: {}", txid);
        } else {
            stats.misses += 1;
            debug!("Cache miss for transaction: {}", txid);
        }
        found
    }

    pub fn put(&self, txid: Txid, script: Vec<u8>) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = lock(&self.entries);
        if entries.scripts.insert(txid, script).is_none() {
            entries.order.push_back(txid);
        }
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.scripts.remove(&oldest);
                debug!("Evicted cached script for transaction: {}", oldest);
            }
        }
        debug!("Cached script for transaction: {}", txid);
    }

    pub fn contains(&self, txid: &Txid) -> bool {
        lock(&self.entries).scripts.contains_key(txid)
    }

    pub fn get_stats(&self) -> CacheStats {
        lock(&self.stats).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cache performance statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            (self.hits as f64 / (self.hits + self.misses) as f64) * 100.0
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }
}
