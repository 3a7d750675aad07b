//! Pipeline configuration loading and validation.
//!
//! The configuration is a JSON object with two required keys:
//!
//! ```json
//! { "transform": "upper", "seed": 42 }
//! ```
//!
//! Parsing is strict: missing keys, unknown transforms and wrong types are
//! errors. Nothing is defaulted and nothing is coerced. Extra keys are kept
//! verbatim and travel with the parameter set.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::canonical::integer_text;
use crate::error::PipelineError;

/// Required configuration keys, in the order they are reported
pub const REQUIRED_KEYS: [&str; 2] = ["transform", "seed"];

/// Supported byte transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Uppercase UTF-8 text
    Upper,

    /// Lowercase UTF-8 text
    Lower,

    /// Pass bytes through unchanged
    Noop,
}

impl Transform {
    pub const ALL: [Transform; 3] = [Transform::Upper, Transform::Lower, Transform::Noop];

    pub fn as_str(&self) -> &'static str {
        match self {
            Transform::Upper => "upper",
            Transform::Lower => "lower",
            Transform::Noop => "noop",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Transform::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unsupported transform: {s:?}"))
    }
}

/// A validated pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    transform: Transform,
    /// Any JSON integer, kept exactly as written
    seed: Number,
    /// The full config object, including pass-through keys
    parameters: Map<String, Value>,
}

impl PipelineConfig {
    /// Load and validate a config file
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::config(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(PipelineError::config(format!(
                "Config path is not a file: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json_str(&content)
    }

    /// Parse and validate config JSON text
    pub fn from_json_str(content: &str) -> Result<Self, PipelineError> {
        let value: Value = serde_json::from_str(content).map_err(|e| {
            PipelineError::config(format!("Failed to parse config as JSON: {}", e))
        })?;

        Self::from_value(value)
    }

    /// Validate an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self, PipelineError> {
        let Value::Object(parameters) = value else {
            return Err(PipelineError::config("Config must be a JSON object."));
        };

        let missing: Vec<&str> = REQUIRED_KEYS
            .into_iter()
            .filter(|k| !parameters.contains_key(*k))
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::config(format!(
                "Missing required config keys: {:?}",
                missing
            )));
        }

        let transform = parameters
            .get("transform")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<Transform>().ok())
            .ok_or_else(|| {
                PipelineError::config(r#"config.transform must be "upper", "lower", or "noop""#)
            })?;

        let seed = match parameters.get("seed") {
            Some(Value::Number(n)) if integer_text(n).is_some() => n.clone(),
            _ => return Err(PipelineError::config("config.seed must be an integer")),
        };

        Ok(Self {
            transform,
            seed,
            parameters,
        })
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn seed(&self) -> &Number {
        &self.seed
    }

    /// The full parameter set handed to the transformer and recorded in provenance
    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn config_err(result: Result<PipelineConfig, PipelineError>) -> String {
        match result {
            Err(PipelineError::Config(msg)) => msg,
            other => panic!("Expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_config() {
        let config =
            PipelineConfig::from_json_str(r#"{"transform": "lower", "seed": 7, "note": "x"}"#)
                .unwrap();

        assert_eq!(config.transform(), Transform::Lower);
        assert_eq!(config.seed().as_i64(), Some(7));
        assert_eq!(config.parameters().get("note"), Some(&json!("x")));
        assert_eq!(config.parameters().len(), 3);
    }

    #[test]
    fn test_negative_seed_accepted() {
        let config = PipelineConfig::from_value(json!({"transform": "noop", "seed": -3})).unwrap();
        assert_eq!(config.seed().as_i64(), Some(-3));
    }

    #[test]
    fn test_missing_keys_reported_together() {
        let msg = config_err(PipelineConfig::from_value(json!({})));
        assert_eq!(msg, r#"Missing required config keys: ["transform", "seed"]"#);

        let msg = config_err(PipelineConfig::from_value(json!({"transform": "upper"})));
        assert!(msg.contains("seed"));
    }

    #[test]
    fn test_unknown_transform_rejected() {
        let msg = config_err(PipelineConfig::from_value(
            json!({"transform": "mixed", "seed": 1}),
        ));
        assert!(msg.contains("config.transform"));

        // Case matters
        assert!(PipelineConfig::from_value(json!({"transform": "UPPER", "seed": 1})).is_err());
        assert!(PipelineConfig::from_value(json!({"transform": 1, "seed": 1})).is_err());
    }

    #[test]
    fn test_seed_type_is_strict() {
        for seed in [json!("3"), json!(3.0), json!(true), json!(null), json!([3])] {
            let msg = config_err(PipelineConfig::from_value(
                json!({"transform": "upper", "seed": seed}),
            ));
            assert_eq!(msg, "config.seed must be an integer");
        }

    }

    #[test]
    fn test_seed_beyond_64_bits_accepted() {
        for seed in ["9223372036854775808", "123456789012345678901234567890", "-99999999999999999999"] {
            let text = format!(r#"{{"transform": "upper", "seed": {seed}}}"#);
            let config = PipelineConfig::from_json_str(&text).unwrap();
            assert_eq!(config.seed().to_string(), seed);
        }
    }

    #[test]
    fn test_non_object_rejected() {
        let msg = config_err(PipelineConfig::from_json_str("[1, 2]"));
        assert_eq!(msg, "Config must be a JSON object.");
        assert!(PipelineConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"transform": "upper", "seed": 42}}"#).unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.transform(), Transform::Upper);

        let msg = config_err(PipelineConfig::from_file(&temp.path().join("missing.json")));
        assert!(msg.starts_with("Config file does not exist"));

        let msg = config_err(PipelineConfig::from_file(temp.path()));
        assert!(msg.starts_with("Config path is not a file"));
    }

    #[test]
    fn test_transform_names_round_trip() {
        for t in Transform::ALL {
            assert_eq!(t.as_str().parse::<Transform>().unwrap(), t);
            assert_eq!(serde_json::to_value(t).unwrap(), json!(t.as_str()));
        }
    }
}
