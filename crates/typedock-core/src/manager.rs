//! Acquisition session facade
//!
//! Wires the cache, fetch coordinator, registration sink, and document
//! watcher together and exposes the manual trigger surface plus a
//! read-only state snapshot for UI display. One manager is constructed per
//! editing session with its collaborators injected; there is no global
//! instance.

use crate::ambient::{self, SUPPORTED_LIBRARIES};
use crate::cache::{CacheStats, DeclarationCache};
use crate::config::AcquisitionConfig;
use crate::fetcher::{FetchCoordinator, Resolved};
use crate::host::{DeclarationSink, LanguageHost};
use crate::registry::TypeRegistry;
use crate::watcher::DocumentWatcher;
use serde::Serialize;
use std::sync::Arc;

/// Read-only view of the acquisition state, cheap enough for a polling UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionSnapshot {
    /// Specifiers with a cached declaration
    pub loaded: Vec<String>,

    /// Specifiers with a resolution in flight
    pub loading: Vec<String>,

    /// Current cache statistics
    pub stats: CacheStats,

    /// Libraries with hand-authored declarations available offline
    pub supported: Vec<String>,
}

/// Type-acquisition session over one language-service host.
pub struct AcquisitionManager {
    cache: Arc<DeclarationCache>,
    coordinator: Arc<FetchCoordinator>,
    watcher: DocumentWatcher,
    host: Arc<dyn LanguageHost>,
}

impl AcquisitionManager {
    /// Build a session from its collaborators.
    ///
    /// The curated library declarations are registered with the host up
    /// front so common imports get rich completions before any fetch; the
    /// cache and statistics are untouched until a resolution actually
    /// happens.
    pub fn new(
        host: Arc<dyn LanguageHost>,
        registry: Arc<dyn TypeRegistry>,
        config: AcquisitionConfig,
    ) -> Self {
        let cache = Arc::new(DeclarationCache::new());
        let sink = DeclarationSink::new(host.clone());

        for name in SUPPORTED_LIBRARIES {
            if let Some(text) = ambient::builtin_declaration(name) {
                sink.register(name, text);
            }
        }

        let coordinator = Arc::new(FetchCoordinator::new(
            cache.clone(),
            registry,
            sink,
            &config,
        ));
        let watcher = DocumentWatcher::new(coordinator.clone(), cache.clone(), &config);

        Self {
            cache,
            coordinator,
            watcher,
            host,
        }
    }

    /// Resolve one specifier through the normal cached path.
    pub async fn resolve(&self, specifier: &str) -> Resolved {
        self.coordinator.resolve(specifier).await
    }

    /// Explicitly load a library, bypassing the debounce loop.
    ///
    /// Unlike `resolve`, a provisional fallback entry is treated as stale
    /// and re-fetched; a successful fetch overwrites the entry and its
    /// host registrations.
    pub async fn load_library(&self, specifier: &str) -> Resolved {
        self.coordinator.resolve_fresh(specifier).await
    }

    /// Feed the latest document text into the debounced analysis loop.
    pub fn on_document_changed(&self, text: &str) {
        self.watcher.on_document_changed(text);
    }

    /// Empty the declaration cache and reset statistics.
    ///
    /// In-flight resolutions are not cancelled and will repopulate the
    /// cache when they settle.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn loaded_modules(&self) -> Vec<String> {
        self.cache.loaded_modules()
    }

    pub fn loading_modules(&self) -> Vec<String> {
        self.coordinator.loading()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn supported_libraries(&self) -> Vec<String> {
        SUPPORTED_LIBRARIES.iter().map(|s| s.to_string()).collect()
    }

    /// Current state in one non-blocking read.
    pub fn snapshot(&self) -> AcquisitionSnapshot {
        AcquisitionSnapshot {
            loaded: self.loaded_modules(),
            loading: self.loading_modules(),
            stats: self.cache_stats(),
            supported: self.supported_libraries(),
        }
    }

    /// The language-service host this session registers into.
    pub fn host(&self) -> &Arc<dyn LanguageHost> {
        &self.host
    }
}
