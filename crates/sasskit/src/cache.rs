/*
 * cache.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Per-run import cache: each distinct (context, reference) pair is
 * resolved through the cascade at most once.
 */

//! Import caching.
//!
//! [`AsyncImportCache`] owns the resolution logic; [`ImportCache`] is a
//! synchronous facade over the identical state machine, driven to
//! completion with `pollster::block_on`. There is deliberately no
//! separate synchronous implementation, so the two variants cannot
//! diverge in resolution order or caching semantics — only in where
//! suspension may occur.
//!
//! Entries are never evicted mid-run: stylesheets are assumed immutable
//! for the duration of one compile. A caller may retain a cache across
//! sequential compiles to amortize resolution, but must not run two
//! compiles concurrently against the same cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use url::Url;

use crate::error::{CompileError, Result};
use crate::importer::{ResolvedImport, ResolverOrigin, ResolverSet};

type CacheKey = (Option<Url>, String);

#[derive(Debug, Clone)]
enum CacheEntry {
    Resolved(Arc<ResolvedImport>),
    /// Terminal marker: the cascade was exhausted for this key.
    NotFound,
}

/// Memoizing front-end to the resolution cascade.
#[derive(Debug)]
pub struct AsyncImportCache {
    resolvers: ResolverSet,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    /// Canonical URLs in load order, with their dependency flag. A URL
    /// is a dependency when it was loaded through a secondary resolver,
    /// or entry-relative from a stylesheet that is itself a dependency.
    loaded: Mutex<Vec<(Url, bool)>>,
}

impl AsyncImportCache {
    pub fn new(resolvers: ResolverSet) -> Self {
        Self {
            resolvers,
            entries: Mutex::new(HashMap::new()),
            loaded: Mutex::new(Vec::new()),
        }
    }

    /// Resolve `reference` as seen from `context`, memoized per key.
    ///
    /// The first call for a key runs the cascade and stores the outcome
    /// (success or not-found); later calls return the stored outcome
    /// without invoking any resolver, so resolver side effects fire at
    /// most once per distinct import site per run. Ambiguity and I/O
    /// errors are not cached; they abort the run before a retry could
    /// ever be attempted.
    pub async fn resolve(
        &self,
        context: Option<&Url>,
        reference: &str,
    ) -> Result<Arc<ResolvedImport>> {
        let key = (context.cloned(), reference.to_string());
        if let Some(entry) = self.lookup(&key) {
            tracing::trace!(reference, "import cache hit");
            return match entry {
                CacheEntry::Resolved(resolved) => Ok(resolved),
                CacheEntry::NotFound => Err(self.not_found(context, reference)),
            };
        }

        match self.resolvers.resolve(context, reference).await? {
            Some(resolved) => {
                let resolved = Arc::new(resolved);
                self.record_loaded(context, &resolved);
                self.insert(key, CacheEntry::Resolved(Arc::clone(&resolved)));
                Ok(resolved)
            }
            None => {
                self.insert(key, CacheEntry::NotFound);
                Err(self.not_found(context, reference))
            }
        }
    }

    /// Register an in-memory entry point that was never resolved
    /// through the cascade, so it still appears among the loaded URLs.
    pub(crate) fn register_entry(&self, resolved: ResolvedImport) -> Arc<ResolvedImport> {
        let resolved = Arc::new(resolved);
        let mut loaded = self.loaded.lock().expect("loaded set poisoned");
        if !loaded.iter().any(|(url, _)| *url == resolved.url) {
            loaded.push((resolved.url.clone(), false));
        }
        resolved
    }

    /// Whether `url` was loaded as a dependency (through a secondary
    /// resolver rather than relative to the entry point).
    pub fn is_dependency(&self, url: &Url) -> bool {
        let loaded = self.loaded.lock().expect("loaded set poisoned");
        loaded
            .iter()
            .find(|(loaded_url, _)| loaded_url == url)
            .is_some_and(|(_, dep)| *dep)
    }

    /// Canonical URLs loaded so far, in load order.
    pub fn loaded_urls(&self) -> Vec<Url> {
        let loaded = self.loaded.lock().expect("loaded set poisoned");
        loaded.iter().map(|(url, _)| url.clone()).collect()
    }

    fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        let entries = self.entries.lock().expect("cache entries poisoned");
        entries.get(key).cloned()
    }

    fn insert(&self, key: CacheKey, entry: CacheEntry) {
        let mut entries = self.entries.lock().expect("cache entries poisoned");
        entries.insert(key, entry);
    }

    fn record_loaded(&self, context: Option<&Url>, resolved: &ResolvedImport) {
        let dependency = match resolved.origin {
            // Entry-relative loads inherit dependency-ness from their
            // importing stylesheet.
            ResolverOrigin::EntryRelative => {
                context.map(|url| self.is_dependency(url)).unwrap_or(false)
            }
            _ => true,
        };
        let mut loaded = self.loaded.lock().expect("loaded set poisoned");
        if !loaded.iter().any(|(url, _)| *url == resolved.url) {
            loaded.push((resolved.url.clone(), dependency));
        }
    }

    fn not_found(&self, context: Option<&Url>, reference: &str) -> CompileError {
        CompileError::ImportNotFound {
            reference: reference.to_string(),
            context: context.cloned(),
        }
    }
}

/// Synchronous variant of [`AsyncImportCache`].
///
/// Delegates every operation to the async cache and drives it to
/// completion on the calling thread, so the externally observable
/// resolution order and caching semantics are identical by
/// construction.
#[derive(Debug)]
pub struct ImportCache {
    inner: AsyncImportCache,
}

impl ImportCache {
    pub fn new(resolvers: ResolverSet) -> Self {
        Self {
            inner: AsyncImportCache::new(resolvers),
        }
    }

    pub fn resolve(&self, context: Option<&Url>, reference: &str) -> Result<Arc<ResolvedImport>> {
        pollster::block_on(self.inner.resolve(context, reference))
    }

    pub fn is_dependency(&self, url: &Url) -> bool {
        self.inner.is_dependency(url)
    }

    pub fn loaded_urls(&self) -> Vec<Url> {
        self.inner.loaded_urls()
    }

    /// The shared state machine, for running the async orchestrator
    /// against a caller-retained cache.
    pub fn as_async(&self) -> &AsyncImportCache {
        &self.inner
    }
}
