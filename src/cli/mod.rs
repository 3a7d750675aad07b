//! Command-line interface for detpipe.
//!
//! A single command: resolve inputs, process them and write artifacts plus
//! `provenance.json` to the output directory.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::core::{Orchestrator, RunRequest};
use crate::error::{PipelineError, EXIT_UNEXPECTED_FAILURE};

/// detpipe - Deterministic data pipeline with provenance
// No `version` attribute: `--version` is the pipeline version, not clap's flag.
#[derive(Parser, Debug)]
#[command(name = "detpipe")]
#[command(about, long_about = None)]
pub struct Cli {
    /// Input files to process
    #[arg(long, num_args = 1.., required = true)]
    pub inputs: Vec<PathBuf>,

    /// Pipeline config (JSON object with "transform" and "seed")
    #[arg(long, env = "DETPIPE_CONFIG")]
    pub config: PathBuf,

    /// Pipeline version recorded in the run identity
    #[arg(long = "version", env = "DETPIPE_PIPELINE_VERSION")]
    pub pipeline_version: String,

    /// Output directory
    #[arg(long, env = "DETPIPE_OUT")]
    pub out: PathBuf,
}

impl Cli {
    /// Execute the run
    pub fn execute(self) -> Result<()> {
        let request = RunRequest {
            inputs: self.inputs,
            config: self.config,
            pipeline_version: self.pipeline_version,
            out_dir: self.out,
        };

        let report = Orchestrator::new().run(&request)?;

        println!("Run successful.");
        println!("Run ID: {}", report.run_id);
        println!("Provenance: {}", report.written.provenance.display());

        Ok(())
    }
}

/// Exit code for a failed run
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<PipelineError>()
        .map(PipelineError::exit_code)
        .unwrap_or(EXIT_UNEXPECTED_FAILURE)
}

/// Print a failed run to stderr and return its exit code
pub fn report_failure(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PipelineError>() {
        Some(e) if e.is_recognized() => eprintln!("PIPELINE ERROR: {}", e),
        _ => eprintln!("UNEXPECTED ERROR: {:#}", err),
    }
    exit_code(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProcessingError;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "detpipe", "--inputs", "a.txt", "b.txt", "--config", "c.json", "--version", "1.2.3",
            "--out", "out",
        ])
        .unwrap();

        assert_eq!(cli.inputs, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        assert_eq!(cli.config, PathBuf::from("c.json"));
        assert_eq!(cli.pipeline_version, "1.2.3");
        assert_eq!(cli.out, PathBuf::from("out"));
    }

    #[test]
    fn test_inputs_required() {
        let result = Cli::try_parse_from([
            "detpipe", "--config", "c.json", "--version", "1", "--out", "out",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_exit_code_mapping() {
        let recognized: anyhow::Error = PipelineError::Config("bad".to_string()).into();
        assert_eq!(exit_code(&recognized), 2);

        let processing: anyhow::Error =
            PipelineError::from(ProcessingError::MissingParameter("seed")).into();
        assert_eq!(exit_code(&processing), 3);

        let other = anyhow::anyhow!("disk full");
        assert_eq!(exit_code(&other), 3);
    }
}
