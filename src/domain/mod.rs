//! Domain records for a pipeline run.
//!
//! - ResolvedInputs: the validated identity of a run
//! - ProcessedArtifact: transformed payloads
//! - Provenance: the audit record

pub mod artifact;
pub mod provenance;
pub mod run;

pub use artifact::ProcessedArtifact;
pub use provenance::{ExecutionEnvironment, InputRecord, Provenance, DETERMINISTIC_SCOPE};
pub use run::ResolvedInputs;
