//! Pure byte transforms.
//!
//! `(raw_inputs, parameters) -> ProcessedArtifact`, with no I/O, no clock and
//! no global state. Parameters are validated here as well as in the config
//! loader so the transformer stays correct when called on its own.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::canonical::integer_text;
use super::pipeline::Transform;
use crate::domain::ProcessedArtifact;

/// Processing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Unsupported transform: {0}")]
    UnsupportedTransform(String),

    #[error("Input {id} is not valid UTF-8: {reason}")]
    InvalidUtf8 { id: String, reason: String },
}

/// Typed transform parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformParams {
    pub transform: Transform,
    /// Recorded with the run; no current transform consumes it
    pub seed: Number,
}

impl TransformParams {
    /// Extract and validate parameters from a raw parameter map
    pub fn from_parameters(parameters: &Map<String, Value>) -> Result<Self, ProcessingError> {
        let transform = parameters
            .get("transform")
            .ok_or(ProcessingError::MissingParameter("transform"))?;
        let seed = parameters
            .get("seed")
            .ok_or(ProcessingError::MissingParameter("seed"))?;

        let transform = match transform {
            Value::String(name) => name
                .parse::<Transform>()
                .map_err(|_| ProcessingError::UnsupportedTransform(name.clone()))?,
            other => {
                return Err(ProcessingError::InvalidParameter {
                    name: "transform",
                    reason: format!("expected a string, got {other}"),
                })
            }
        };

        let seed = match seed {
            Value::Number(n) if integer_text(n).is_some() => n.clone(),
            other => {
                return Err(ProcessingError::InvalidParameter {
                    name: "seed",
                    reason: format!("expected an integer, got {other}"),
                })
            }
        };

        Ok(Self { transform, seed })
    }
}

/// Transform every raw input under a raw parameter map
pub fn process(
    raw_inputs: &BTreeMap<String, Vec<u8>>,
    parameters: &Map<String, Value>,
) -> Result<ProcessedArtifact, ProcessingError> {
    let params = TransformParams::from_parameters(parameters)?;
    process_with(raw_inputs, &params)
}

/// Transform every raw input under already-validated parameters
pub fn process_with(
    raw_inputs: &BTreeMap<String, Vec<u8>>,
    params: &TransformParams,
) -> Result<ProcessedArtifact, ProcessingError> {
    let items = raw_inputs
        .iter()
        .map(|(id, data)| Ok((id.clone(), transform_bytes(id, data, params.transform)?)))
        .collect::<Result<BTreeMap<_, _>, ProcessingError>>()?;

    Ok(ProcessedArtifact::new(items))
}

/// Apply one transform to one payload
pub fn transform_bytes(id: &str, data: &[u8], transform: Transform) -> Result<Vec<u8>, ProcessingError> {
    match transform {
        Transform::Noop => Ok(data.to_vec()),
        Transform::Upper => Ok(decode_utf8(id, data)?.to_uppercase().into_bytes()),
        Transform::Lower => Ok(decode_utf8(id, data)?.to_lowercase().into_bytes()),
    }
}

fn decode_utf8<'a>(id: &str, data: &'a [u8]) -> Result<&'a str, ProcessingError> {
    std::str::from_utf8(data).map_err(|e| ProcessingError::InvalidUtf8 {
        id: id.to_string(),
        reason: e.to_string(),
    })
}
