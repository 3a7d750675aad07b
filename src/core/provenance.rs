//! Run identifier derivation and provenance assembly.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::hasher::ContentHasher;
use crate::domain::{ExecutionEnvironment, InputRecord, Provenance};

/// Derive the deterministic run identifier.
///
/// SHA-256 over each `path` then `hash` in path-sorted order, then the config
/// hash, then the pipeline version. Timestamp and environment never enter.
pub fn derive_run_id<'a, I>(input_hashes: I, config_hash: &str, pipeline_version: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs: Vec<(&str, &str)> = input_hashes.into_iter().collect();
    pairs.sort_unstable();

    let mut hasher = ContentHasher::new();
    for (path, hash) in pairs {
        hasher.update(path);
        hasher.update(hash);
    }
    hasher.update(config_hash);
    hasher.update(pipeline_version);

    hasher.finish()
}

/// Build a provenance record stamped with the current time and environment
pub fn build<'a, I>(
    input_hashes: I,
    config_hash: &str,
    pipeline_version: &str,
    parameters: &Map<String, Value>,
) -> Provenance
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    build_at(
        input_hashes,
        config_hash,
        pipeline_version,
        parameters,
        Utc::now(),
        ExecutionEnvironment::current(),
    )
}

/// Build a provenance record with an explicit timestamp and environment
pub fn build_at<'a, I>(
    input_hashes: I,
    config_hash: &str,
    pipeline_version: &str,
    parameters: &Map<String, Value>,
    timestamp: DateTime<Utc>,
    environment: ExecutionEnvironment,
) -> Provenance
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut inputs: Vec<InputRecord> = input_hashes
        .into_iter()
        .map(|(path, sha256)| InputRecord {
            path: path.to_string(),
            sha256: sha256.to_string(),
        })
        .collect();
    inputs.sort();

    let run_id = derive_run_id(
        inputs.iter().map(|r| (r.path.as_str(), r.sha256.as_str())),
        config_hash,
        pipeline_version,
    );

    Provenance::new(
        run_id,
        pipeline_version.to_string(),
        format_timestamp(timestamp),
        inputs,
        config_hash.to_string(),
        parameters.clone(),
        environment,
    )
}

/// ISO-8601 with microseconds and an explicit `+00:00` offset
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, false)
}
