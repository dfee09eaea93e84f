//! Debounced document analysis
//!
//! Watches the live document and re-runs the specifier scan after a quiet
//! period. Every edit restarts the pending timer, so no network activity
//! happens while edits are still arriving; once the timer elapses the scan
//! runs over the *latest* text, not the text at schedule time.

use crate::cache::DeclarationCache;
use crate::config::AcquisitionConfig;
use crate::fetcher::FetchCoordinator;
use crate::scanner::scan_specifiers;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Drives the scanner and fetch coordinator from document edits.
///
/// Must be used inside a tokio runtime: each edit spawns the debounce
/// timer task onto the current runtime.
pub struct DocumentWatcher {
    coordinator: Arc<FetchCoordinator>,
    cache: Arc<DeclarationCache>,

    /// Most recent document text; read when the debounce timer fires
    latest: Arc<Mutex<String>>,

    /// Pending debounce task, aborted and replaced on every edit
    pending: Mutex<Option<JoinHandle<()>>>,

    debounce: Duration,
    enabled: bool,
}

impl DocumentWatcher {
    pub fn new(
        coordinator: Arc<FetchCoordinator>,
        cache: Arc<DeclarationCache>,
        config: &AcquisitionConfig,
    ) -> Self {
        Self {
            coordinator,
            cache,
            latest: Arc::new(Mutex::new(String::new())),
            pending: Mutex::new(None),
            debounce: Duration::from_millis(config.debounce_ms),
            enabled: config.enable_auto_loading,
        }
    }

    /// Record an edit and restart the debounce timer. Fire-and-forget.
    ///
    /// Restarting cancels only the pending *scan*; resolutions already
    /// started by an earlier scan keep running, and their results are
    /// cached and registered even if the document has moved on.
    pub fn on_document_changed(&self, text: &str) {
        if !self.enabled {
            return;
        }

        *self.latest.lock() = text.to_string();

        let coordinator = self.coordinator.clone();
        let cache = self.cache.clone();
        let latest = self.latest.clone();
        let debounce = self.debounce;

        let mut pending = self.pending.lock();
        if let Some(task) = pending.take() {
            task.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let text = latest.lock().clone();
            let specifiers = scan_specifiers(&text);
            tracing::debug!(count = specifiers.len(), "document scan complete");

            for specifier in specifiers {
                // Loaded and loading specifiers are skipped here; the
                // coordinator would dedup them anyway, but not driving it
                // at all keeps the quiet path allocation-free.
                if cache.contains(&specifier) || coordinator.is_loading(&specifier) {
                    continue;
                }

                let coordinator = coordinator.clone();
                tokio::spawn(async move {
                    coordinator.resolve(&specifier).await;
                });
            }
        }));
    }

    /// Whether a debounce timer is currently pending.
    pub fn scan_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }
}
