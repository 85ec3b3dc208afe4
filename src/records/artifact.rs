//! # Preprocessing artifact
//!
//! Binary snapshot of every [`Dataset`] produced by one preprocessing run.
//! The layout is a format-version number followed by the dataset list, both encoded with
//! `postcard`. Producer and consumer must agree on [`ARTIFACT_FORMAT_VERSION`]; no forward or
//! backward compatibility is attempted.
//!
//! One process is expected to own an artifact at a time: there is no file locking.
use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::{
    constants::ARTIFACT_FORMAT_VERSION, pedtraj_errors::PedTrajError, records::dataset::Dataset,
};

/// Content of one preprocessing artifact, indexed by dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreprocessedData {
    pub datasets: Vec<Dataset>,
}

impl PreprocessedData {
    pub fn new(datasets: Vec<Dataset>) -> Self {
        PreprocessedData { datasets }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PedTrajError> {
        Ok(postcard::to_allocvec(&(
            ARTIFACT_FORMAT_VERSION,
            &self.datasets,
        ))?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PedTrajError> {
        let (found, payload) = postcard::take_from_bytes::<u32>(bytes)?;
        if found != ARTIFACT_FORMAT_VERSION {
            return Err(PedTrajError::ArtifactVersionMismatch {
                expected: ARTIFACT_FORMAT_VERSION,
                found,
            });
        }
        let datasets: Vec<Dataset> = postcard::from_bytes(payload)?;
        Ok(PreprocessedData { datasets })
    }

    /// Write the artifact, replacing any previous file at `path`.
    pub fn save(&self, path: &Utf8Path) -> Result<(), PedTrajError> {
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn load(path: &Utf8Path) -> Result<Self, PedTrajError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}
