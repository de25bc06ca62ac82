//! Replacement cache
//! Created: 2026-09-20
//!
//! Remembers every accepted glyph substitution of a run so that the same
//! glyph drawn at the same place resolves to the same replacement, for
//! example when a page fills and then clips the same text.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::types::{Glyph, Matrix, WritingMode};

/// Matrix components are compared as integer multiples of this step
pub const KEY_EPSILON: f64 = 1e-4;

/// A matrix rounded to [`KEY_EPSILON`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuantizedMatrix([i64; 6]);

impl QuantizedMatrix {
    pub fn new(m: &Matrix) -> Self {
        let q = |v: f64| (v / KEY_EPSILON).round() as i64;
        Self([q(m.a), q(m.b), q(m.c), q(m.d), q(m.e), q(m.f)])
    }
}

/// Identity of one glyph occurrence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubstitutionKey {
    pub font: String,
    /// Glyph matrix under the CTM
    pub matrix: QuantizedMatrix,
    pub unicode: char,
    pub glyph: u32,
    pub wmode: WritingMode,
}

impl SubstitutionKey {
    pub fn for_glyph(glyph: &Glyph, ctm: &Matrix) -> Self {
        Self {
            font: glyph.font_name().to_string(),
            matrix: QuantizedMatrix::new(&glyph.matrix.concat(ctm)),
            unicode: glyph.unicode,
            glyph: glyph.glyph,
            wmode: glyph.wmode,
        }
    }
}

/// Character and glyph drawn in place of an original
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Replacement {
    pub unicode: char,
    pub glyph: u32,
}

impl Replacement {
    pub fn of(glyph: &Glyph) -> Self {
        Self {
            unicode: glyph.unicode,
            glyph: glyph.glyph,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Total entries
    pub entries: usize,
    /// New keys committed
    pub inserts: u64,
    /// Commits that found the key already present
    pub reuses: u64,
}

/// Substitution memo for one page run. Entries are never evicted or
/// overwritten.
#[derive(Debug, Clone, Default)]
pub struct ReplacementCache {
    entries: HashMap<SubstitutionKey, Replacement>,
    stats: CacheStats,
}

impl ReplacementCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SubstitutionKey) -> Option<Replacement> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &SubstitutionKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Store `replacement` unless `key` is already present. Returns the
    /// value the cache holds for `key` afterwards.
    pub fn insert(&mut self, key: SubstitutionKey, replacement: Replacement) -> Replacement {
        let mut inserted = false;
        let stored = *self.entries.entry(key).or_insert_with(|| {
            inserted = true;
            replacement
        });
        if inserted {
            self.stats.inserts += 1;
        } else {
            self.stats.reuses += 1;
        }
        self.stats.entries = self.entries.len();
        stored
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SubstitutionKey, &Replacement)> {
        self.entries.iter()
    }
}

/// Cache shared between workers anonymizing chunks in parallel
#[derive(Debug, Clone, Default)]
pub struct SharedReplacementCache {
    inner: Arc<Mutex<ReplacementCache>>,
}

impl SharedReplacementCache {
    pub fn new(cache: ReplacementCache) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn get(&self, key: &SubstitutionKey) -> Option<Replacement> {
        self.inner.lock().get(key)
    }

    /// Commit a whole accepted candidate atomically. Keys another worker
    /// committed first keep their value; the returned list holds the
    /// replacement that won for each key, in order.
    pub fn commit_all(&self, entries: Vec<(SubstitutionKey, Replacement)>) -> Vec<Replacement> {
        let mut cache = self.inner.lock();
        entries
            .into_iter()
            .map(|(key, replacement)| cache.insert(key, replacement))
            .collect()
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> ReplacementCache {
        self.inner.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
