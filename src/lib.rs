//! detpipe - Deterministic layered data pipeline
//!
//! Given input files and a JSON config, produces byte-identical transformed
//! artifacts and a provenance record. The same inputs, config and pipeline
//! version always give the same artifacts and the same run identifier.
//!
//! # Architecture
//!
//! Data flows one way through the layers:
//!
//! ```text
//! resolver -> transform -> provenance -> output
//! ```
//!
//! - `core::resolver` validates paths and config and hashes everything
//! - `core::transform` is a pure function over bytes
//! - `core::provenance` derives the run id and builds the audit record
//! - `core::output` writes artifacts and `provenance.json`
//!
//! # Usage
//!
//! ```bash
//! detpipe --inputs a.txt b.txt --config config.json --version 1.0.0 --out out/
//! ```

pub mod cli;
pub mod core;
pub mod domain;
pub mod error;

// Re-export main types at crate root for convenience
pub use crate::core::{Orchestrator, PipelineConfig, RunReport, RunRequest, Transform};
pub use domain::{ProcessedArtifact, Provenance, ResolvedInputs};
pub use error::PipelineError;
