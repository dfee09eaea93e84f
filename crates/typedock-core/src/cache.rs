//! Declaration caching
//!
//! Process-wide store mapping module specifiers to resolved declaration
//! text plus usage statistics. Entries are created and replaced only by the
//! fetch coordinator; everything else reads.

use crate::devtools::format_bytes;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Resolution state of a specifier.
///
/// `Idle` means no entry exists yet; `Loading` is tracked by the fetch
/// coordinator's in-flight table, so stored entries are always `Loaded` or
/// `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// A cached declaration for one specifier.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Specifier exactly as requested (version suffix included)
    pub specifier: String,

    /// Resolved declaration text, shared with all callers
    pub declaration: Arc<str>,

    /// Declaration size in bytes
    pub size_bytes: u64,

    /// Terminal state of the resolution episode
    pub state: LoadState,

    /// Whether the text was synthesized rather than fetched. Fallback
    /// entries are provisional: an explicit re-resolution may replace them
    /// with registry-fetched text.
    pub fallback: bool,
}

impl CacheEntry {
    /// Entry for a successfully fetched (or built-in) declaration
    pub fn loaded(specifier: &str, declaration: Arc<str>) -> Self {
        Self {
            specifier: specifier.to_string(),
            size_bytes: declaration.len() as u64,
            declaration,
            state: LoadState::Loaded,
            fallback: false,
        }
    }

    /// Entry for a synthesized fallback after a failed fetch
    pub fn failed(specifier: &str, declaration: Arc<str>) -> Self {
        Self {
            specifier: specifier.to_string(),
            size_bytes: declaration.len() as u64,
            declaration,
            state: LoadState::Failed,
            fallback: true,
        }
    }
}

/// Cache usage statistics, recomputed on demand.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of distinct cached declarations
    pub total_types: usize,

    /// Total declaration bytes held
    pub total_bytes: u64,

    /// Human-readable rendering of `total_bytes`
    pub size: String,

    /// Lookups answered from the cache
    pub hit_count: u64,

    /// Resolution episodes that had to fetch or synthesize
    pub miss_count: u64,

    /// hits / (hits + misses) as a whole percentage, 0 when no lookups
    pub hit_rate: u32,
}

/// Keyed declaration store shared across the acquisition session.
///
/// Entries persist for the lifetime of the session; there is no eviction.
/// `clear` is the only reclamation and also resets the hit/miss counters.
pub struct DeclarationCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DeclarationCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Read an entry without touching the statistics.
    pub fn peek(&self, specifier: &str) -> Option<CacheEntry> {
        self.entries.lock().get(specifier).cloned()
    }

    /// Whether an entry exists for the specifier.
    pub fn contains(&self, specifier: &str) -> bool {
        self.entries.lock().contains_key(specifier)
    }

    /// Insert or replace the entry for a specifier.
    pub fn insert(&self, entry: CacheEntry) {
        self.entries.lock().insert(entry.specifier.clone(), entry);
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Specifiers with a stored entry, sorted for stable display.
    pub fn loaded_modules(&self) -> Vec<String> {
        let mut modules: Vec<String> = self.entries.lock().keys().cloned().collect();
        modules.sort();
        modules
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Derive current statistics.
    pub fn stats(&self) -> CacheStats {
        let (total_types, total_bytes) = {
            let entries = self.entries.lock();
            let bytes: u64 = entries.values().map(|e| e.size_bytes).sum();
            (entries.len(), bytes)
        };

        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        let hit_rate = if lookups == 0 {
            0
        } else {
            ((hits * 100 + lookups / 2) / lookups) as u32
        };

        CacheStats {
            total_types,
            total_bytes,
            size: format_bytes(total_bytes),
            hit_count: hits,
            miss_count: misses,
            hit_rate,
        }
    }

    /// Empty the store and reset statistics to zero.
    ///
    /// In-flight resolutions are not cancelled; an episode that settles
    /// after the clear repopulates the cache with its result.
    pub fn clear(&self) {
        self.entries.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

impl Default for DeclarationCache {
    fn default() -> Self {
        Self::new()
    }
}
