//! Diagnostics for embedding developer tools
//!
//! Aggregates the acquisition state into a JSON report a dev panel (or the
//! CLI) can render directly, and provides the byte formatting the stats
//! surface uses.

use crate::manager::AcquisitionManager;
use serde_json::{json, Value};

/// Render a byte count the way the stats panel displays it.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Snapshot the full acquisition state as JSON.
///
/// Includes what the polling snapshot has plus the host's registered
/// declaration paths, so "the fetch succeeded but the host never saw it"
/// is visible at a glance.
pub fn diagnose(manager: &AcquisitionManager) -> Value {
    let snapshot = manager.snapshot();
    let host_paths = manager.host().declaration_paths();

    json!({
        "loadedModules": snapshot.loaded,
        "loadingModules": snapshot.loading,
        "cacheStats": snapshot.stats,
        "supportedLibraries": snapshot.supported,
        "hostPathCount": host_paths.len(),
        "hostPaths": host_paths,
    })
}
