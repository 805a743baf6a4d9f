use std::{
    collections::HashMap,
    hash::{DefaultHasher, Hash, Hasher},
    sync::{LazyLock, RwLock}
};

use crate::{diagnostics::FileDiagnostic, validate::SqlDialect};

/// Global per-process diagnostic cache
static DIAGNOSTIC_CACHE: LazyLock<RwLock<DiagnosticCache>> =
    LazyLock::new(|| RwLock::new(DiagnosticCache::new(1000)));

/// Cache of analysis results keyed by file content and dialect.
///
/// Purely additive: identical content always produces identical diagnostics,
/// so a hit skips the per-file pipeline entirely.
pub struct DiagnosticCache {
    cache:    HashMap<u64, Vec<FileDiagnostic>>,
    max_size: usize
}

impl DiagnosticCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            cache: HashMap::with_capacity(max_size),
            max_size
        }
    }

    fn hash_key(text: &str, dialect: SqlDialect, min_confidence: f64) -> u64 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        format!("{:?}", dialect).hash(&mut hasher);
        min_confidence.to_bits().hash(&mut hasher);
        hasher.finish()
    }

    pub fn get(
        &self,
        text: &str,
        dialect: SqlDialect,
        min_confidence: f64
    ) -> Option<Vec<FileDiagnostic>> {
        let key = Self::hash_key(text, dialect, min_confidence);
        self.cache.get(&key).cloned()
    }

    pub fn insert(
        &mut self,
        text: &str,
        dialect: SqlDialect,
        min_confidence: f64,
        diagnostics: Vec<FileDiagnostic>
    ) {
        // Simple eviction: clear half when full
        if self.cache.len() >= self.max_size {
            let keys: Vec<_> = self.cache.keys().take(self.max_size / 2).copied().collect();
            for key in keys {
                self.cache.remove(&key);
            }
        }

        let key = Self::hash_key(text, dialect, min_confidence);
        self.cache.insert(key, diagnostics);
    }
}

/// Get cached diagnostics or None
pub fn get_cached(
    text: &str,
    dialect: SqlDialect,
    min_confidence: f64
) -> Option<Vec<FileDiagnostic>> {
    DIAGNOSTIC_CACHE
        .read()
        .ok()?
        .get(text, dialect, min_confidence)
}

/// Cache a unit's diagnostics
pub fn cache_diagnostics(
    text: &str,
    dialect: SqlDialect,
    min_confidence: f64,
    diagnostics: Vec<FileDiagnostic>
) {
    if let Ok(mut cache) = DIAGNOSTIC_CACHE.write() {
        cache.insert(text, dialect, min_confidence, diagnostics);
    }
}
