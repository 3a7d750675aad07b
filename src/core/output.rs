//! Output writer: persists artifacts and the provenance record.
//!
//! Layout under the output directory:
//!
//! ```text
//! <out>/
//!   artifacts/<input file name>.processed
//!   provenance.json
//! ```
//!
//! `provenance.json` is written last, so its presence means every artifact
//! was written. Any failure aborts the run.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::domain::{ProcessedArtifact, Provenance};

/// Suffix appended to each artifact file name
pub const ARTIFACT_SUFFIX: &str = ".processed";

/// Name of the provenance file
pub const PROVENANCE_FILE: &str = "provenance.json";

/// Paths written by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutputs {
    /// Input identifier -> artifact path
    pub artifacts: BTreeMap<String, PathBuf>,

    pub provenance: PathBuf,
}

/// Writes run outputs under a single directory
pub struct OutputWriter {
    out_dir: PathBuf,
    artifacts_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        let out_dir = out_dir.into();
        let artifacts_dir = out_dir.join("artifacts");
        Self {
            out_dir,
            artifacts_dir,
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn provenance_path(&self) -> PathBuf {
        self.out_dir.join(PROVENANCE_FILE)
    }

    /// Where the artifact for an input identifier is written
    pub fn artifact_path(&self, id: &str) -> Result<PathBuf> {
        let name = Path::new(id)
            .file_name()
            .with_context(|| format!("Input has no file name: {}", id))?;

        let mut file_name = name.to_os_string();
        file_name.push(ARTIFACT_SUFFIX);
        Ok(self.artifacts_dir.join(file_name))
    }

    /// Write every artifact, then the provenance record
    pub fn write(
        &self,
        processed: &ProcessedArtifact,
        provenance: &Provenance,
    ) -> Result<WrittenOutputs> {
        // Plan every target before touching the filesystem
        let plan = self.plan(processed)?;

        fs::create_dir_all(&self.artifacts_dir).with_context(|| {
            format!(
                "Failed to create artifacts directory: {}",
                self.artifacts_dir.display()
            )
        })?;

        let mut artifacts = BTreeMap::new();
        for (id, content) in processed.iter() {
            let path = &plan[id];
            fs::write(path, content)
                .with_context(|| format!("Failed to write artifact: {}", path.display()))?;
            debug!(input = %id, path = %path.display(), bytes = content.len(), "Wrote artifact");
            artifacts.insert(id.to_string(), path.clone());
        }

        let provenance_path = self.provenance_path();
        let json = provenance
            .to_pretty_json()
            .context("Failed to serialize provenance")?;
        fs::write(&provenance_path, json).with_context(|| {
            format!(
                "Failed to write provenance: {}",
                provenance_path.display()
            )
        })?;

        Ok(WrittenOutputs {
            artifacts,
            provenance: provenance_path,
        })
    }

    /// Map each input to its artifact path, rejecting name collisions
    fn plan<'a>(&self, processed: &'a ProcessedArtifact) -> Result<HashMap<&'a str, PathBuf>> {
        let mut plan = HashMap::new();
        let mut claimed: HashMap<PathBuf, &str> = HashMap::new();

        for (id, _) in processed.iter() {
            let path = self.artifact_path(id)?;
            if let Some(previous) = claimed.insert(path.clone(), id) {
                anyhow::bail!(
                    "Inputs {} and {} would both be written to {}",
                    previous,
                    id,
                    path.display()
                );
            }
            plan.insert(id, path);
        }

        Ok(plan)
    }
}
