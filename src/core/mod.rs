//! The deterministic core and the glue around it.
//!
//! This module contains:
//! - canonical / hasher: stable encoding and SHA-256 digests
//! - pipeline / resolver: config validation and run identity
//! - transform: pure byte transforms
//! - provenance: run id derivation and audit record assembly
//! - output / orchestrator: file writing and end-to-end execution

pub mod canonical;
pub mod hasher;
pub mod orchestrator;
pub mod output;
pub mod pipeline;
pub mod provenance;
pub mod resolver;
pub mod transform;

// Re-export commonly used types
pub use canonical::{canonicalize, EncodingError};
pub use hasher::{hash_bytes, hash_canonical, hash_file, ContentHasher};
pub use orchestrator::{Orchestrator, RunReport, RunRequest};
pub use output::{OutputWriter, WrittenOutputs};
pub use pipeline::{PipelineConfig, Transform};
pub use provenance::derive_run_id;
pub use resolver::{load_config, resolve, validate_paths};
pub use transform::{process, process_with, ProcessingError, TransformParams};
