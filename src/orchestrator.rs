//! Compilation orchestrator.
//!
//! This module coordinates the whole pipeline for a batch of scenarios:
//! loading, topology construction, per-communication path resolution and
//! rule synthesis, and writing one rule-set document per router.
//!
//! Scenarios share no state, so a batch runs them in parallel on a rayon
//! pool. Within a scenario everything is sequential and communications are
//! folded into the rule book in input order, which keeps output
//! byte-for-byte reproducible.

use crate::rules::{synthesize_rules, RuleBook, RuleError};
use crate::scenario::{ScenarioInput, ValidationError};
use crate::scenario_loader::{discover_scenarios, load_scenario, ScenarioFile};
use crate::topology::{resolve_path, PathError, Topology, TopologyError};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// What to do with a communication whose subnets are not connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum UnreachablePolicy {
    /// Abandon the whole scenario; nothing is written for it
    #[default]
    Abort,
    /// Log the communication and compile the rest of the scenario
    Skip,
}

/// Runtime options for a compilation batch
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Worker threads for the batch (0 = rayon default)
    pub jobs: usize,
    pub unreachable: UnreachablePolicy,
}

/// Errors that abandon a scenario before anything is written
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Invalid scenario: {0}")]
    Validation(#[from] ValidationError),
    #[error("Invalid topology: {0}")]
    Topology(#[from] TopologyError),
    #[error("Communication #{index}: {error}")]
    Path { index: usize, error: PathError },
    #[error("Communication #{index}: {error}")]
    Rule { index: usize, error: RuleError },
}

/// Rule book of one scenario, plus the communications left out of it
#[derive(Debug, Clone)]
pub struct CompiledScenario {
    pub rulebook: RuleBook,
    /// Unreachable communications skipped under [`UnreachablePolicy::Skip`]
    pub skipped: Vec<(usize, PathError)>,
}

/// Outcome of one successfully processed scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioSummary {
    pub id: u64,
    pub routers: usize,
    pub rules: usize,
    pub skipped: usize,
    pub output_dir: PathBuf,
}

/// A scenario that could not be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioFailure {
    pub id: u64,
    pub path: PathBuf,
    pub reason: String,
}

/// Results of a batch, both lists ordered by scenario id
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub succeeded: Vec<ScenarioSummary>,
    pub failed: Vec<ScenarioFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Compile a scenario into per-router rule buffers
pub fn compile_scenario(
    input: &ScenarioInput,
    policy: UnreachablePolicy,
) -> std::result::Result<CompiledScenario, CompileError> {
    input.validate()?;
    let topology = Topology::build(&input.network)?;
    let subnets = &input.network.subnets;

    let mut skipped = Vec::new();
    let rulebook = input.communications.iter().enumerate().try_fold(
        RuleBook::new(input.router_count()),
        |mut book, (index, comm)| -> std::result::Result<RuleBook, CompileError> {
            let path = match resolve_path(&topology, comm.source_subnet_id, comm.target_subnet_id) {
                Ok(path) => path,
                Err(error @ PathError::Unreachable { .. }) if policy == UnreachablePolicy::Skip => {
                    warn!("Skipping communication #{}: {}", index, error);
                    skipped.push((index, error));
                    return Ok(book);
                }
                Err(error) => return Err(CompileError::Path { index, error }),
            };

            let rules = synthesize_rules(comm, &path, subnets, &topology)
                .map_err(|error| CompileError::Rule { index, error })?;
            debug!(
                "Communication #{}: {} router hops, {} rules",
                index,
                path.router_count(),
                rules.len()
            );
            let expected = rules.len();
            let appended = book.extend(rules);
            if appended != expected {
                warn!(
                    "Communication #{}: {} of {} rules target routers outside the rule book and were dropped",
                    index,
                    expected - appended,
                    expected
                );
            }
            debug_assert_eq!(appended, expected, "rules dropped for communication #{}", index);
            Ok(book)
        },
    )?;

    Ok(CompiledScenario { rulebook, skipped })
}

/// Write one document per router under `<output_dir>/<id>/`.
///
/// Returns the scenario's output directory.
pub fn write_scenario_output(output_dir: &Path, id: u64, compiled: &CompiledScenario) -> Result<PathBuf> {
    let scenario_dir = output_dir.join(id.to_string());
    fs::create_dir_all(&scenario_dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", scenario_dir.display()))?;

    for (router, document) in compiled.rulebook.documents() {
        let path = scenario_dir.join(router.to_string());
        write_atomic(&path, document.as_bytes())?;
        debug!("{} bytes written on {}", document.len(), path.display());
    }

    Ok(scenario_dir)
}

/// Write through a temporary file in the same directory, then rename
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)
        .wrap_err_with(|| format!("Failed to create temporary file in '{}'", dir.display()))?;
    file.write_all(contents)
        .wrap_err_with(|| format!("Failed to write '{}'", path.display()))?;
    file.persist(path)
        .map_err(|e| eyre!("Failed to persist '{}': {}", path.display(), e.error))?;
    Ok(())
}

/// Load, compile and write a single scenario file
pub fn process_scenario_file(
    file: &ScenarioFile,
    output_dir: &Path,
    options: &CompileOptions,
) -> Result<ScenarioSummary> {
    let input = load_scenario(&file.path)?;
    let compiled = compile_scenario(&input, options.unreachable)
        .wrap_err_with(|| format!("Failed to compile scenario {}", file.id))?;
    let scenario_dir = write_scenario_output(output_dir, file.id, &compiled)?;

    let summary = ScenarioSummary {
        id: file.id,
        routers: compiled.rulebook.router_count(),
        rules: compiled.rulebook.total_rules(),
        skipped: compiled.skipped.len(),
        output_dir: scenario_dir,
    };
    info!(
        "Scenario {}: {} rules across {} routers written to {:?}",
        summary.id, summary.rules, summary.routers, summary.output_dir
    );
    Ok(summary)
}

/// Compile every scenario under `input_dir` into `output_dir`.
///
/// A failing scenario is logged and recorded in the report; the rest of the
/// batch still runs. Only problems with the directories themselves are
/// returned as errors.
pub fn run_batch(input_dir: &Path, output_dir: &Path, options: &CompileOptions) -> Result<BatchReport> {
    let files = discover_scenarios(input_dir)?;
    fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", output_dir.display()))?;

    let process_all = || -> Vec<(ScenarioFile, Result<ScenarioSummary>)> {
        files
            .par_iter()
            .map(|file| (file.clone(), process_scenario_file(file, output_dir, options)))
            .collect()
    };

    let results = if options.jobs > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs)
            .build()
            .wrap_err("Failed to build worker pool")?;
        pool.install(process_all)
    } else {
        process_all()
    };

    // par_iter().collect() keeps input order, so the report is ordered by id
    let mut report = BatchReport::default();
    for (file, result) in results {
        match result {
            Ok(summary) => report.succeeded.push(summary),
            Err(e) => {
                error!("Scenario {} ({}) failed: {:#}", file.id, file.path.display(), e);
                report.failed.push(ScenarioFailure {
                    id: file.id,
                    path: file.path,
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    Ok(report)
}
