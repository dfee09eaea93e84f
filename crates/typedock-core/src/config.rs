//! Acquisition configuration

use crate::registry::DEFAULT_REGISTRY;
use serde::{Deserialize, Serialize};

/// Quiet period after the last edit before the document is re-scanned
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Maximum simultaneously in-flight registry fetches
pub const DEFAULT_MAX_CONCURRENT_LOADS: usize = 3;

/// Upper bound on a single registry fetch before falling back
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Tunables for the type-acquisition session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AcquisitionConfig {
    /// When false, every resolution bypasses cache reads and re-fetches.
    /// Entries are still written so the state reporter stays truthful.
    pub enable_cache: bool,

    /// When false, document changes are ignored and resolution happens
    /// only through explicit `load_library` calls.
    pub enable_auto_loading: bool,

    /// Debounce delay for the analysis loop, in milliseconds
    pub debounce_ms: u64,

    /// Concurrency cap on in-flight registry fetches. Bounds fetches, not
    /// cache entries; cached and failed specifiers consume no slot.
    pub max_concurrent_loads: usize,

    /// Per-fetch timeout, in milliseconds
    pub fetch_timeout_ms: u64,

    /// Base URL of the declaration registry
    pub registry_url: String,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            enable_cache: true,
            enable_auto_loading: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            max_concurrent_loads: DEFAULT_MAX_CONCURRENT_LOADS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            registry_url: DEFAULT_REGISTRY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AcquisitionConfig::default();
        assert!(config.enable_cache);
        assert!(config.enable_auto_loading);
        assert_eq!(config.debounce_ms, 1000);
        assert_eq!(config.max_concurrent_loads, 3);
        assert_eq!(config.registry_url, DEFAULT_REGISTRY);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: AcquisitionConfig =
            serde_json::from_str(r#"{"maxConcurrentLoads": 8, "enableCache": false}"#).unwrap();
        assert_eq!(config.max_concurrent_loads, 8);
        assert!(!config.enable_cache);
        assert_eq!(config.debounce_ms, 1000);
    }
}
