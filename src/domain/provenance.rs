//! Provenance record for a run.
//!
//! The record documents a run without influencing it. `run_id` is derived
//! only from the fields named in [`DETERMINISTIC_SCOPE`]; `timestamp_utc` and
//! `execution_environment` are audit-only.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The fields that determine `run_id` and the processed artifacts
pub const DETERMINISTIC_SCOPE: &str = "inputs + config + pipeline_version";

/// Name recorded as the implementation in every provenance record
pub const IMPLEMENTATION_NAME: &str = env!("CARGO_PKG_NAME");

/// One input file and its content hash
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InputRecord {
    pub path: String,
    pub sha256: String,
}

/// Where the run executed (audit-only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionEnvironment {
    /// `<os>-<arch>`, e.g. `linux-x86_64`
    pub platform: String,
    pub os_family: String,
    pub implementation: String,
    pub runtime_version: String,
}

impl ExecutionEnvironment {
    /// Describe the current process
    pub fn current() -> Self {
        Self {
            platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            os_family: std::env::consts::FAMILY.to_string(),
            implementation: IMPLEMENTATION_NAME.to_string(),
            runtime_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Immutable provenance record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    run_id: String,
    pipeline_version: String,
    timestamp_utc: String,
    inputs: Vec<InputRecord>,
    config_sha256: String,
    parameters: Map<String, Value>,
    execution_environment: ExecutionEnvironment,
    deterministic_scope: String,
}

impl Provenance {
    /// Assemble a record. `inputs` must already be sorted by path.
    pub(crate) fn new(
        run_id: String,
        pipeline_version: String,
        timestamp_utc: String,
        inputs: Vec<InputRecord>,
        config_sha256: String,
        parameters: Map<String, Value>,
        execution_environment: ExecutionEnvironment,
    ) -> Self {
        debug_assert!(inputs.windows(2).all(|w| w[0].path <= w[1].path));
        Self {
            run_id,
            pipeline_version,
            timestamp_utc,
            inputs,
            config_sha256,
            parameters,
            execution_environment,
            deterministic_scope: DETERMINISTIC_SCOPE.to_string(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn pipeline_version(&self) -> &str {
        &self.pipeline_version
    }

    pub fn timestamp_utc(&self) -> &str {
        &self.timestamp_utc
    }

    /// Inputs sorted by path
    pub fn inputs(&self) -> &[InputRecord] {
        &self.inputs
    }

    pub fn config_sha256(&self) -> &str {
        &self.config_sha256
    }

    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    pub fn execution_environment(&self) -> &ExecutionEnvironment {
        &self.execution_environment
    }

    pub fn deterministic_scope(&self) -> &str {
        &self.deterministic_scope
    }

    /// Recompute the run id from the record's own deterministic fields and
    /// compare it with the stored one.
    pub fn verify_run_id(&self) -> bool {
        let recomputed = crate::core::provenance::derive_run_id(
            self.inputs
                .iter()
                .map(|r| (r.path.as_str(), r.sha256.as_str())),
            &self.config_sha256,
            &self.pipeline_version,
        );
        recomputed == self.run_id
    }

    /// Indented, key-sorted JSON for `provenance.json`
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        // Value objects are BTreeMap-backed, so every level comes out key-sorted
        let value = serde_json::to_value(self)?;
        serde_json::to_string_pretty(&value)
    }
}
