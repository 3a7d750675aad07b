//! Runs the pipeline end to end.
//!
//! Resolve -> read -> process -> provenance -> write. The orchestrator owns
//! every side effect; the stages it calls are either pure or limited to the
//! reads they document.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, instrument};

use super::output::{OutputWriter, WrittenOutputs};
use super::{provenance, resolver, transform};
use crate::domain::ResolvedInputs;
use crate::error::PipelineError;

/// Everything needed to start a run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub inputs: Vec<PathBuf>,
    pub config: PathBuf,
    pub pipeline_version: String,
    pub out_dir: PathBuf,
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub written: WrittenOutputs,
}

/// Pipeline orchestrator
#[derive(Debug, Default)]
pub struct Orchestrator;

impl Orchestrator {
    pub fn new() -> Self {
        Self
    }

    /// Execute one run. Errors from the core are returned as
    /// [`PipelineError`] inside the `anyhow::Error` so callers can downcast.
    #[instrument(skip_all, fields(version = %request.pipeline_version))]
    pub fn run(&self, request: &RunRequest) -> Result<RunReport> {
        let resolved = resolver::resolve(
            request.inputs.as_slice(),
            &request.config,
            &request.pipeline_version,
        )?;

        let raw_inputs = read_inputs(&resolved)?;

        let processed = transform::process(&raw_inputs, resolved.config().parameters())
            .map_err(PipelineError::from)?;
        info!(artifacts = processed.len(), bytes = processed.total_bytes(), "Processed inputs");

        let provenance = provenance::build(
            resolved
                .input_hashes()
                .iter()
                .map(|(path, hash)| (path.as_str(), hash.as_str())),
            resolved.config_hash(),
            resolved.pipeline_version(),
            resolved.config().parameters(),
        );
        info!(run_id = %provenance.run_id(), "Built provenance");

        let writer = OutputWriter::new(&request.out_dir);
        let written = writer.write(&processed, &provenance)?;
        info!(out_dir = %writer.out_dir().display(), "Wrote outputs");

        Ok(RunReport {
            run_id: provenance.run_id().to_string(),
            written,
        })
    }
}

/// Read every resolved input fully before any processing starts
fn read_inputs(resolved: &ResolvedInputs) -> Result<BTreeMap<String, Vec<u8>>, PipelineError> {
    resolved
        .inputs()
        .map(|(id, path)| {
            let bytes = std::fs::read(path).map_err(|e| PipelineError::io(path, e))?;
            Ok((id.to_string(), bytes))
        })
        .collect()
}
