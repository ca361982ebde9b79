// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fingerprint;
pub mod fs;
pub mod inputs;
pub mod logging;
pub mod normalize;
pub mod snapshot;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::{default_config_path, load_and_validate};
use crate::config::model::ConfigFile;
use crate::engine::{
    default_workers, FingerprintEngine, HistoryComparison, TaskCheck, TaskExecutionDecision,
    UpToDateChecker,
};
use crate::fingerprint::{FileFingerprintStore, FingerprintStore, MemoryFingerprintStore};
use crate::fs::RealFileSystem;
use crate::inputs::TaskInputs;
use crate::normalize::NormalizerRegistry;
use crate::snapshot::FsSnapshotProvider;
use crate::types::StoreMode;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and input freezing
/// - the fingerprint store
/// - the worker pool and up-to-date checker
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let cfg = load_and_validate(&config_path)?;
    let root_dir = config_root_dir(&config_path);

    if args.dry_run {
        print_dry_run(&cfg, &root_dir);
        return Ok(());
    }

    let tasks = select_tasks(
        cfg.task_inputs(&root_dir, NormalizerRegistry::new())?,
        args.task.as_deref(),
    )?;

    let fs = Arc::new(RealFileSystem);
    let store: Box<dyn FingerprintStore> = match cfg.config.store {
        StoreMode::File => Box::new(FileFingerprintStore::new(
            fs.clone(),
            cfg.store_path(&root_dir),
        )),
        StoreMode::Memory => Box::new(MemoryFingerprintStore::new()),
    };

    let workers = args
        .workers
        .or(cfg.config.workers)
        .unwrap_or_else(default_workers);
    let engine = FingerprintEngine::new(Arc::new(FsSnapshotProvider::new(fs)), workers);
    info!(workers = engine.workers(), tasks = tasks.len(), "checking tasks");

    let checker = UpToDateChecker::new(engine.clone(), store);

    // No output tracking here: output state is reported as unchanged.
    let checks = tokio::select! {
        checks = checker.check_all(tasks, false) => checks?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            engine.cancel();
            warn!("interrupted; fingerprints were not stored");
            return Err(anyhow!("interrupted"));
        }
    };

    print_report(&checks);

    if args.record {
        for check in checks.iter().filter(|c| c.decision.should_execute()) {
            checker.record(check)?;
        }
        if args.task.is_none() {
            let active: Vec<&str> = cfg.task.keys().map(String::as_str).collect();
            checker.prune(&active)?;
        }
    }

    Ok(())
}

/// Keep only `only` when given; unknown names are an error.
fn select_tasks(tasks: Vec<Arc<TaskInputs>>, only: Option<&str>) -> Result<Vec<Arc<TaskInputs>>> {
    let Some(name) = only else {
        return Ok(tasks);
    };
    let selected: Vec<_> = tasks.into_iter().filter(|t| t.task() == name).collect();
    if selected.is_empty() {
        return Err(anyhow!("unknown task '{name}'"));
    }
    Ok(selected)
}

/// Directory that relative roots are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "build/Taskprint.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Taskprint.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// One line per task, followed by what changed when inputs changed.
fn print_report(checks: &[TaskCheck]) {
    for check in checks {
        println!("{}: {}", check.task, check.decision);

        let Some(HistoryComparison::Compared { properties, .. }) = &check.comparison else {
            continue;
        };
        if !matches!(check.decision, TaskExecutionDecision::Execute(_)) {
            continue;
        }
        for comparison in properties.iter().filter(|c| !c.is_unchanged()) {
            for result in comparison.results() {
                println!("    {}: {result}", comparison.property_name());
            }
        }
    }
}

/// Simple dry-run output: print tasks and their declared inputs.
fn print_dry_run(cfg: &ConfigFile, root_dir: &Path) {
    println!("taskprint dry-run");
    match cfg.config.workers {
        Some(workers) => println!("  config.workers = {workers}"),
        None => println!("  config.workers = {} (available parallelism)", default_workers()),
    }
    println!("  config.store = {:?}", cfg.config.store);
    if cfg.config.store == StoreMode::File {
        println!("  config.store_path = {}", cfg.store_path(root_dir).display());
    }
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        for (property, input) in task.inputs.iter() {
            let root = input
                .root
                .as_ref()
                .map(|r| r.display().to_string())
                .unwrap_or_else(|| "<none>".to_string());
            println!(
                "      {property}: root={root} kind={:?} path_sensitivity={:?}",
                input.kind, input.path_sensitivity
            );
            if let Some(ref normalizer) = input.normalizer {
                println!("        normalizer: {normalizer}");
            }
            if input.optional {
                println!("        optional: true");
            }
            if input.skip_when_empty {
                println!("        skip_when_empty: true");
            }
            if !input.include.is_empty() {
                println!("        include: {:?}", input.include);
            }
            if !input.exclude.is_empty() {
                println!("        exclude: {:?}", input.exclude);
            }
        }
    }

    debug!("dry-run complete (no fingerprinting)");
}
