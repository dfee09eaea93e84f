//! Typedock command-line harness
//!
//! Exercises the acquisition library against real source files: scan a
//! file for bare specifiers, prefetch their declarations from a registry,
//! or print the full diagnostics report.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use typedock_core::{
    diagnose, scan_specifiers, AcquisitionConfig, AcquisitionManager, HttpTypeRegistry,
    MemoryHost, DEFAULT_REGISTRY,
};

#[derive(Parser)]
#[command(name = "typedock")]
#[command(about = "Module type acquisition for embedded code editors", long_about = None)]
#[command(version)]
struct Cli {
    /// Registry base URL
    #[arg(long, default_value = DEFAULT_REGISTRY, global = true)]
    registry: String,

    /// Maximum concurrent declaration fetches
    #[arg(long, default_value_t = 3, global = true)]
    max_concurrent: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the bare module specifiers a source file imports
    Scan {
        /// Source file to scan
        file: PathBuf,
    },
    /// Resolve declarations for every specifier in a source file
    Fetch {
        /// Source file to scan and resolve
        file: PathBuf,
    },
    /// Resolve declarations, then print the JSON diagnostics report
    Report {
        /// Source file to scan and resolve
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("typedock_core=info")),
        )
        .init();

    let cli = Cli::parse();

    let config = AcquisitionConfig {
        registry_url: cli.registry.clone(),
        max_concurrent_loads: cli.max_concurrent,
        // the debounce loop is an editor concern; the CLI resolves eagerly
        enable_auto_loading: false,
        ..AcquisitionConfig::default()
    };

    match cli.command {
        Commands::Scan { file } => {
            let text = read_source(&file)?;
            let mut specifiers: Vec<String> = scan_specifiers(&text).into_iter().collect();
            specifiers.sort();

            for specifier in specifiers {
                println!("{specifier}");
            }
        }
        Commands::Fetch { file } => {
            let manager = build_manager(&config)?;
            fetch_all(&manager, &file).await?;
        }
        Commands::Report { file } => {
            let manager = build_manager(&config)?;
            fetch_all(&manager, &file).await?;
            println!("{}", serde_json::to_string_pretty(&diagnose(&manager))?);
        }
    }

    Ok(())
}

fn read_source(file: &PathBuf) -> anyhow::Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

fn build_manager(config: &AcquisitionConfig) -> anyhow::Result<AcquisitionManager> {
    let registry =
        HttpTypeRegistry::with_url(&config.registry_url).context("invalid registry URL")?;

    Ok(AcquisitionManager::new(
        Arc::new(MemoryHost::new()),
        Arc::new(registry),
        config.clone(),
    ))
}

async fn fetch_all(manager: &AcquisitionManager, file: &PathBuf) -> anyhow::Result<()> {
    let text = read_source(file)?;
    let mut specifiers: Vec<String> = scan_specifiers(&text).into_iter().collect();
    specifiers.sort();

    if specifiers.is_empty() {
        println!("no bare module specifiers found");
        return Ok(());
    }

    for specifier in specifiers {
        let resolved = manager.load_library(&specifier).await;
        let outcome = if resolved.fallback {
            "fallback"
        } else {
            "loaded"
        };
        println!(
            "{:<30} {} ({} bytes)",
            resolved.specifier,
            outcome,
            resolved.declaration.len()
        );
    }

    Ok(())
}
