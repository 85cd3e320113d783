//! End-to-end development run: demand in, requirements/design/code trace out.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::core::trace::{RunResult, TraceEntry};
use crate::io::collaborator::Collaborator;
use crate::io::config::RunnerConfig;
use crate::io::output::write_run_output;
use crate::pipeline::{ENTRY_AGENT, waterfall};
use crate::runner::{RunOptions, Runner};

/// Run the waterfall pipeline on `demand` and persist the result under `output_dir`.
///
/// The output directory is created before any agent runs so an unwritable
/// destination fails fast.
#[instrument(skip_all, fields(output_dir = %output_dir.display()))]
pub fn dev<C: Collaborator, F: FnMut(&TraceEntry)>(
    demand: &str,
    output_dir: &Path,
    collaborator: &C,
    config: &RunnerConfig,
    on_turn: F,
) -> Result<RunResult> {
    config.validate()?;
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir {}", output_dir.display()))?;

    let graph = waterfall()?;
    let result = Runner::new(&graph, collaborator)
        .with_options(RunOptions {
            strict_handoffs: config.strict_handoffs,
        })
        .run_with(ENTRY_AGENT, demand, config.max_iterations, on_turn)?;

    let path = write_run_output(output_dir, &result)?;
    info!(path = %path.display(), exhausted = result.is_exhausted(), "wrote run output");
    Ok(result)
}
