//! Shared test doubles for the integration suites
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use typedock_core::{
    AcquisitionConfig, AcquisitionManager, MemoryHost, RegistryError, TypeRegistry,
};

/// In-memory registry with scripted responses and instrumentation.
///
/// Every fetch is counted, and an in-flight gauge records the high-water
/// mark of concurrent fetches so tests can assert the coordinator's
/// admission gate.
pub struct FakeRegistry {
    responses: Mutex<HashMap<String, String>>,
    delay: Duration,
    fetches: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            delay: Duration::from_millis(50),
            fetches: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        let mut registry = Self::new();
        registry.delay = delay;
        registry
    }

    /// Script a successful response for a module name.
    pub fn publish(&self, name: &str, declaration: &str) {
        self.responses
            .lock()
            .insert(name.to_string(), declaration.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TypeRegistry for FakeRegistry {
    async fn fetch_declaration(
        &self,
        name: &str,
        _version: Option<&str>,
    ) -> Result<String, RegistryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.responses.lock().get(name) {
            Some(declaration) => Ok(declaration.clone()),
            None => Err(RegistryError::NotFound(name.to_string())),
        }
    }
}

/// Build a manager over a [`MemoryHost`] and the given registry.
pub fn manager_with(
    registry: Arc<FakeRegistry>,
    config: AcquisitionConfig,
) -> (AcquisitionManager, Arc<MemoryHost>) {
    let host = Arc::new(MemoryHost::new());
    let manager = AcquisitionManager::new(host.clone(), registry, config);
    (manager, host)
}

/// Wait until nothing is loading any more, bounded so a stuck test fails
/// instead of hanging.
pub async fn settle(manager: &AcquisitionManager) {
    for _ in 0..200 {
        if manager.loading_modules().is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("resolutions did not settle");
}
