//! Input resolution: establishes the identity of a run.
//!
//! Checks run in a fixed order so that cheap failures come first and no input
//! bytes are read until the config is known to be valid:
//!
//! 1. pipeline version non-empty
//! 2. input paths exist and are regular files
//! 3. config loads and validates
//! 4. inputs are canonicalized; repeats of one file collapse to the first
//! 5. input files and config are hashed

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use super::hasher::{hash_canonical, hash_file};
use super::pipeline::PipelineConfig;
use crate::domain::ResolvedInputs;
use crate::error::PipelineError;

/// Validate that every path names an existing regular file
pub fn validate_paths(paths: &[PathBuf]) -> Result<(), PipelineError> {
    if paths.is_empty() {
        return Err(PipelineError::input("No input files provided."));
    }

    for path in paths {
        if !path.exists() {
            return Err(PipelineError::input(format!(
                "Input file does not exist: {}",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(PipelineError::input(format!(
                "Input path is not a file: {}",
                path.display()
            )));
        }
    }

    Ok(())
}

/// Load and validate the pipeline config
pub fn load_config(path: &Path) -> Result<PipelineConfig, PipelineError> {
    PipelineConfig::from_file(path)
}

/// Validate everything and compute the hashes that identify this run
#[instrument(skip_all, fields(inputs = input_paths.len()))]
pub fn resolve<P: AsRef<Path>>(
    input_paths: &[P],
    config_path: &Path,
    pipeline_version: &str,
) -> Result<ResolvedInputs, PipelineError> {
    let pipeline_version = pipeline_version.trim();
    if pipeline_version.is_empty() {
        return Err(PipelineError::input("pipeline_version must be non-empty"));
    }

    let paths = input_paths
        .iter()
        .map(|p| absolute(p.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    validate_paths(&paths)?;

    let config = load_config(&absolute(config_path)?)?;
    debug!(transform = %config.transform(), seed = %config.seed(), "Config validated");

    // Resolve symlinks now that every path is known to exist. The input list
    // is a set: the same file under another spelling keeps its first position.
    let mut seen = HashSet::new();
    let mut inputs = Vec::with_capacity(paths.len());
    for path in &paths {
        let canonical = path.canonicalize().map_err(|e| PipelineError::io(path, e))?;
        if !seen.insert(canonical.clone()) {
            debug!(input = %path.display(), "Skipping repeated input");
            continue;
        }
        inputs.push((path_id(&canonical)?, canonical));
    }

    let mut input_hashes = BTreeMap::new();
    for (id, path) in &inputs {
        let digest = hash_file(path)?;
        debug!(input = %id, sha256 = %digest, "Hashed input");
        input_hashes.insert(id.clone(), digest);
    }

    let config_hash = hash_canonical(config.parameters())?;
    info!(config_sha256 = %config_hash, version = pipeline_version, "Inputs resolved");

    Ok(ResolvedInputs::new(
        inputs,
        input_hashes,
        config,
        config_hash,
        pipeline_version.to_string(),
    ))
}

/// Make a path absolute against the current directory, without touching the filesystem
fn absolute(path: &Path) -> Result<PathBuf, PipelineError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| PipelineError::io(path, e))?;
    Ok(cwd.join(path))
}

/// Input identifiers are absolute path strings; non-UTF-8 paths cannot be recorded
fn path_id(path: &Path) -> Result<String, PipelineError> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        PipelineError::input(format!(
            "Input path is not valid UTF-8: {}",
            path.display()
        ))
    })
}
