//! Typedock Core Library
//!
//! This crate provides module type acquisition for embedded code editors,
//! including:
//! - Bare-specifier scanning of live source text
//! - Declaration caching with hit/miss statistics
//! - Deduplicated, concurrency-capped registry fetching with ambient
//!   fallback synthesis
//! - Declaration registration into a language-service host under redundant
//!   virtual paths
//! - A debounced document-analysis loop
//! - A session facade with a read-only state snapshot and diagnostics

pub mod ambient;
pub mod cache;
pub mod config;
pub mod devtools;
pub mod fetcher;
pub mod host;
pub mod manager;
pub mod registry;
pub mod scanner;
pub mod watcher;

pub use ambient::{builtin_declaration, synthesize_fallback, SUPPORTED_LIBRARIES};
pub use cache::{CacheEntry, CacheStats, DeclarationCache, LoadState};
pub use config::AcquisitionConfig;
pub use devtools::{diagnose, format_bytes};
pub use fetcher::{FetchCoordinator, Resolved};
pub use host::{DeclarationSink, HostError, LanguageHost, MemoryHost};
pub use manager::{AcquisitionManager, AcquisitionSnapshot};
pub use registry::{HttpTypeRegistry, RegistryError, TypeRegistry, DEFAULT_REGISTRY};
pub use scanner::{scan_specifiers, split_name_version};
pub use watcher::DocumentWatcher;
