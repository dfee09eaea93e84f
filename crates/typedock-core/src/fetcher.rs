//! Fetch coordination
//!
//! Turns "give me the declaration for this specifier" into at most one
//! registry fetch per loading episode, under a global concurrency cap,
//! with synthesized fallback on any failure. `resolve` never returns an
//! error: the worst case is degraded (ambient) declaration text.

use crate::ambient;
use crate::cache::{CacheEntry, DeclarationCache};
use crate::config::AcquisitionConfig;
use crate::host::DeclarationSink;
use crate::registry::TypeRegistry;
use crate::scanner::split_name_version;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::time::timeout;

/// Outcome of one `resolve` call.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Specifier as requested
    pub specifier: String,

    /// Declaration text, shared with every caller of the same episode
    pub declaration: Arc<str>,

    /// True when the text was synthesized instead of fetched
    pub fallback: bool,

    /// True when answered from the cache without opening an episode
    pub from_cache: bool,
}

/// Settled result published to everyone who joined an episode.
#[derive(Debug, Clone)]
struct EpisodeResult {
    declaration: Arc<str>,
    fallback: bool,
}

/// Coordinates declaration resolution for the session.
///
/// The cache and the in-flight table are mutated only here; all other
/// components read.
pub struct FetchCoordinator {
    cache: Arc<DeclarationCache>,
    registry: Arc<dyn TypeRegistry>,
    sink: DeclarationSink,

    /// One shared pending resolution per specifier. Entry lifetime is the
    /// loading episode: created when the episode opens, removed when it
    /// settles.
    in_flight: Mutex<HashMap<String, watch::Receiver<Option<EpisodeResult>>>>,

    /// Admission gate bounding concurrent registry fetches. Waiters
    /// suspend; tokio's FIFO queue rules out starvation.
    gate: Semaphore,

    enable_cache: bool,
    fetch_timeout: Duration,
}

impl FetchCoordinator {
    pub fn new(
        cache: Arc<DeclarationCache>,
        registry: Arc<dyn TypeRegistry>,
        sink: DeclarationSink,
        config: &AcquisitionConfig,
    ) -> Self {
        Self {
            cache,
            registry,
            sink,
            in_flight: Mutex::new(HashMap::new()),
            // a zero cap would suspend every fetch forever
            gate: Semaphore::new(config.max_concurrent_loads.max(1)),
            enable_cache: config.enable_cache,
            fetch_timeout: Duration::from_millis(config.fetch_timeout_ms),
        }
    }

    /// Resolve a specifier to declaration text.
    ///
    /// Cache hit, in-flight join, or a fresh episode — in that order. Never
    /// fails; network trouble settles the episode with a synthesized
    /// fallback entry instead.
    pub async fn resolve(&self, specifier: &str) -> Resolved {
        self.resolve_inner(specifier, false).await
    }

    /// Resolve, treating an existing fallback entry as stale.
    ///
    /// The upgrade path for explicit re-resolution: a provisional fallback
    /// entry is re-fetched and, on success, overwritten together with its
    /// host registrations. Non-fallback entries still count as hits.
    pub async fn resolve_fresh(&self, specifier: &str) -> Resolved {
        self.resolve_inner(specifier, true).await
    }

    /// Specifiers with a resolution currently in flight, sorted.
    pub fn loading(&self) -> Vec<String> {
        let mut loading: Vec<String> = self.in_flight.lock().keys().cloned().collect();
        loading.sort();
        loading
    }

    /// Whether a resolution for the specifier is currently in flight.
    pub fn is_loading(&self, specifier: &str) -> bool {
        self.in_flight.lock().contains_key(specifier)
    }

    async fn resolve_inner(&self, specifier: &str, refresh_fallback: bool) -> Resolved {
        if self.enable_cache {
            if let Some(entry) = self.cache.peek(specifier) {
                let stale = entry.fallback && refresh_fallback;
                if !stale {
                    self.cache.record_hit();
                    return Resolved {
                        specifier: specifier.to_string(),
                        declaration: entry.declaration,
                        fallback: entry.fallback,
                        from_cache: true,
                    };
                }
            }
        }

        // Join the in-flight episode if one exists, otherwise open one.
        // The lock spans both the check and the reservation so two callers
        // can never open competing episodes for the same specifier.
        let publisher = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.get(specifier) {
                Some(receiver) => Err(receiver.clone()),
                None => {
                    let (sender, receiver) = watch::channel(None);
                    in_flight.insert(specifier.to_string(), receiver);
                    Ok(sender)
                }
            }
        };

        match publisher {
            Err(receiver) => {
                let settled = await_settlement(receiver).await;
                match settled {
                    Some(result) => Resolved {
                        specifier: specifier.to_string(),
                        declaration: result.declaration,
                        fallback: result.fallback,
                        from_cache: false,
                    },
                    // The opener vanished without publishing. Drop the dead
                    // reservation so a later resolve can open a fresh
                    // episode, and degrade to a local fallback rather than
                    // hang or fail.
                    None => {
                        {
                            let mut in_flight = self.in_flight.lock();
                            let abandoned = in_flight
                                .get(specifier)
                                .map(|r| r.has_changed().is_err())
                                .unwrap_or(false);
                            if abandoned {
                                in_flight.remove(specifier);
                            }
                        }
                        let (name, _) = split_name_version(specifier);
                        tracing::warn!(module = name, "episode abandoned, using local fallback");
                        Resolved {
                            specifier: specifier.to_string(),
                            declaration: Arc::from(ambient::synthesize_fallback(name)),
                            fallback: true,
                            from_cache: false,
                        }
                    }
                }
            }
            Ok(sender) => {
                let result = self.run_episode(specifier).await;

                // Publish order matters: the cache entry is already stored,
                // so removing the reservation before waking joiners leaves
                // no instant where a new caller sees neither.
                self.in_flight.lock().remove(specifier);
                let _ = sender.send(Some(result.clone()));

                Resolved {
                    specifier: specifier.to_string(),
                    declaration: result.declaration,
                    fallback: result.fallback,
                    from_cache: false,
                }
            }
        }
    }

    /// Run one loading episode: built-in, fetched, or synthesized. Always
    /// settles; stores the entry and registers it with the host.
    async fn run_episode(&self, specifier: &str) -> EpisodeResult {
        let (name, version) = split_name_version(specifier);

        // Curated libraries resolve offline and consume no fetch slot.
        if let Some(text) = ambient::builtin_declaration(name) {
            let declaration: Arc<str> = Arc::from(text);
            self.settle(specifier, declaration.clone(), false);
            return EpisodeResult {
                declaration,
                fallback: false,
            };
        }

        let fetched = match self.gate.acquire().await {
            Ok(_permit) => {
                match timeout(
                    self.fetch_timeout,
                    self.registry.fetch_declaration(name, version),
                )
                .await
                {
                    Ok(Ok(text)) => Some(text),
                    Ok(Err(err)) => {
                        tracing::warn!(module = name, error = %err, "declaration fetch failed");
                        None
                    }
                    Err(_) => {
                        tracing::warn!(module = name, "declaration fetch timed out");
                        None
                    }
                }
            }
            // The gate is never closed; treat a closed gate like any other
            // unavailable registry rather than panic.
            Err(_) => None,
        };

        match fetched {
            Some(text) => {
                let declaration: Arc<str> = Arc::from(text);
                self.settle(specifier, declaration.clone(), false);
                tracing::info!(module = name, bytes = declaration.len(), "declaration loaded");
                EpisodeResult {
                    declaration,
                    fallback: false,
                }
            }
            None => {
                let declaration: Arc<str> = Arc::from(ambient::synthesize_fallback(name));
                self.settle(specifier, declaration.clone(), true);
                EpisodeResult {
                    declaration,
                    fallback: true,
                }
            }
        }
    }

    /// Store the episode result and push it to the host. Counts the miss
    /// for this episode: it existed because the cache could not answer.
    fn settle(&self, specifier: &str, declaration: Arc<str>, fallback: bool) {
        let entry = if fallback {
            CacheEntry::failed(specifier, declaration.clone())
        } else {
            CacheEntry::loaded(specifier, declaration.clone())
        };

        self.cache.record_miss();
        self.cache.insert(entry);
        self.sink.register(specifier, &declaration);
    }
}

/// Wait for an episode to publish its result.
async fn await_settlement(
    mut receiver: watch::Receiver<Option<EpisodeResult>>,
) -> Option<EpisodeResult> {
    loop {
        if let Some(result) = receiver.borrow_and_update().clone() {
            return Some(result);
        }
        if receiver.changed().await.is_err() {
            // Sender dropped; take whatever was published, if anything.
            return receiver.borrow().clone();
        }
    }
}
