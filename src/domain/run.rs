//! The resolved identity of a single run.
//!
//! Built once by the resolver and read-only afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::pipeline::PipelineConfig;

/// Fully validated inputs, config and version for one run
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInputs {
    /// Identifier of each entry in `input_paths`, same order
    input_ids: Vec<String>,
    input_paths: Vec<PathBuf>,
    input_hashes: BTreeMap<String, String>,
    config: PipelineConfig,
    config_hash: String,
    pipeline_version: String,
}

impl ResolvedInputs {
    /// Assemble the record. Callers must have validated every field; the
    /// resolver is the only producer.
    pub(crate) fn new(
        inputs: Vec<(String, PathBuf)>,
        input_hashes: BTreeMap<String, String>,
        config: PipelineConfig,
        config_hash: String,
        pipeline_version: String,
    ) -> Self {
        debug_assert_eq!(inputs.len(), input_hashes.len());
        let (input_ids, input_paths) = inputs.into_iter().unzip();
        Self {
            input_ids,
            input_paths,
            input_hashes,
            config,
            config_hash,
            pipeline_version,
        }
    }

    /// Absolute input paths, in the order the caller supplied them
    pub fn input_paths(&self) -> &[PathBuf] {
        &self.input_paths
    }

    /// Input identifier (absolute path string) -> SHA-256 of the file bytes
    pub fn input_hashes(&self) -> &BTreeMap<String, String> {
        &self.input_hashes
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn pipeline_version(&self) -> &str {
        &self.pipeline_version
    }

    /// Iterate `(identifier, path)` pairs in input order
    pub fn inputs(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.input_ids
            .iter()
            .zip(&self.input_paths)
            .map(|(id, path)| (id.as_str(), path.as_path()))
    }
}
