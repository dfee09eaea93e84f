//! Language-service host integration
//!
//! The host is an external collaborator: it accepts virtual declaration
//! files keyed by path and answers completion queries internally. The core
//! only ever writes declarations and lists what has been written.

use crate::scanner::split_name_version;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// A declaration write rejected by the host.
#[derive(Debug, Error)]
#[error("host rejected declaration at {path}: {reason}")]
pub struct HostError {
    pub path: String,
    pub reason: String,
}

/// The embedded language-service host.
///
/// Calls are synchronous, idempotent on same-path overwrite, and
/// side-effect-free beyond the host's internal symbol table.
pub trait LanguageHost: Send + Sync {
    /// Write declaration text under a virtual path, overwriting any
    /// previous content at that path.
    fn add_declaration(&self, path: &str, source: &str) -> Result<(), HostError>;

    /// Paths of all extra declaration files the host currently holds.
    fn declaration_paths(&self) -> Vec<String>;
}

/// Virtual paths a module's declaration is registered under.
///
/// The host's module-resolution strategy is not fully predictable, so each
/// declaration is written to a direct module path, a typed-package alias,
/// and a flat single-file path; whichever the host probes, it finds the
/// text.
pub fn virtual_paths(name: &str) -> [String; 3] {
    [
        format!("file:///node_modules/{name}/index.d.ts"),
        format!("file:///node_modules/@types/{name}/index.d.ts"),
        format!("file:///node_modules/{name}.d.ts"),
    ]
}

/// Pushes resolved declarations into the host.
#[derive(Clone)]
pub struct DeclarationSink {
    host: Arc<dyn LanguageHost>,
}

impl DeclarationSink {
    pub fn new(host: Arc<dyn LanguageHost>) -> Self {
        Self { host }
    }

    /// Register a declaration under all conventional paths for the
    /// specifier's module name (version suffix stripped).
    ///
    /// Idempotent: re-registering overwrites previous content at the same
    /// paths and never removes declarations for other modules. A rejected
    /// write is logged and swallowed; resolution state is kept regardless
    /// so statistics stay truthful even when autocompletion is degraded.
    pub fn register(&self, specifier: &str, declaration: &str) {
        let (name, _version) = split_name_version(specifier);

        let mut written = 0usize;
        for path in virtual_paths(name) {
            match self.host.add_declaration(&path, declaration) {
                Ok(()) => written += 1,
                Err(err) => {
                    tracing::warn!(module = name, error = %err, "declaration write rejected");
                }
            }
        }

        tracing::debug!(module = name, paths = written, "registered module declaration");
    }
}

/// In-memory [`LanguageHost`] used by the CLI and tests.
#[derive(Default)]
pub struct MemoryHost {
    declarations: Mutex<HashMap<String, String>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declaration text currently stored at a path.
    pub fn declaration(&self, path: &str) -> Option<String> {
        self.declarations.lock().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.declarations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.lock().is_empty()
    }
}

impl LanguageHost for MemoryHost {
    fn add_declaration(&self, path: &str, source: &str) -> Result<(), HostError> {
        self.declarations
            .lock()
            .insert(path.to_string(), source.to_string());
        Ok(())
    }

    fn declaration_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.declarations.lock().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_paths_conventions() {
        let paths = virtual_paths("lodash");
        assert_eq!(paths[0], "file:///node_modules/lodash/index.d.ts");
        assert_eq!(paths[1], "file:///node_modules/@types/lodash/index.d.ts");
        assert_eq!(paths[2], "file:///node_modules/lodash.d.ts");
    }

    #[test]
    fn test_register_writes_all_paths() {
        let host = Arc::new(MemoryHost::new());
        let sink = DeclarationSink::new(host.clone());

        sink.register("lodash", "declare module 'lodash';");

        assert_eq!(host.len(), 3);
        for path in virtual_paths("lodash") {
            assert_eq!(
                host.declaration(&path).unwrap(),
                "declare module 'lodash';"
            );
        }
    }

    #[test]
    fn test_register_strips_version_suffix() {
        let host = Arc::new(MemoryHost::new());
        let sink = DeclarationSink::new(host.clone());

        sink.register("lodash@4.17.21", "text");

        assert!(host
            .declaration("file:///node_modules/lodash/index.d.ts")
            .is_some());
    }

    #[test]
    fn test_reregister_overwrites_without_touching_others() {
        let host = Arc::new(MemoryHost::new());
        let sink = DeclarationSink::new(host.clone());

        sink.register("lodash", "fallback");
        sink.register("axios", "axios decl");
        sink.register("lodash", "upgraded");

        assert_eq!(
            host.declaration("file:///node_modules/lodash/index.d.ts")
                .unwrap(),
            "upgraded"
        );
        assert_eq!(
            host.declaration("file:///node_modules/axios/index.d.ts")
                .unwrap(),
            "axios decl"
        );
        assert_eq!(host.len(), 6);
    }

    #[test]
    fn test_rejecting_host_does_not_panic() {
        struct RejectingHost;

        impl LanguageHost for RejectingHost {
            fn add_declaration(&self, path: &str, _source: &str) -> Result<(), HostError> {
                Err(HostError {
                    path: path.to_string(),
                    reason: "read-only".to_string(),
                })
            }

            fn declaration_paths(&self) -> Vec<String> {
                Vec::new()
            }
        }

        let sink = DeclarationSink::new(Arc::new(RejectingHost));
        sink.register("lodash", "text");
    }
}
