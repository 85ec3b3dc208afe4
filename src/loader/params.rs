//! # Data loader parameters
//!
//! [`LoaderParams`] gathers every tunable of the [`DataLoader`](crate::loader::DataLoader):
//! batch geometry, validation usage, preprocessing policy and the dataset directories to scan.
//!
//! Parameters are built either programmatically through [`LoaderParamsBuilder`] or read from
//! a JSON file with [`LoaderParams::from_json_file`]; both paths run the same validation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pedtraj::loader::params::LoaderParams;
//!
//! let params = LoaderParams::builder()
//!     .batch_size(8)
//!     .seq_length(12)
//!     .num_validation(2)
//!     .dataset_dirs(["biwi", "crowds"])
//!     .build()
//!     .unwrap();
//! ```
use std::fmt;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::pedtraj_errors::PedTrajError;

/// Which files the loader works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunMode {
    /// Training files, primary and held-out subsets.
    #[default]
    Train,
    /// Test files (or validation files when validation is requested), no held-out subset.
    Infer,
    /// Training files without held-out subset, for trajectory generation.
    Generate,
}

impl RunMode {
    pub fn is_infer(&self) -> bool {
        matches!(self, RunMode::Infer)
    }
}

/// Tunables of the sequence batcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderParams {
    /// Sequences per batch.
    pub batch_size: usize,
    /// Frames per sequence.
    pub seq_length: usize,
    /// Sequence length swapped in by
    /// [`switch_to_dataset_type`](crate::loader::DataLoader::switch_to_dataset_type).
    /// `None` keeps `seq_length` on both sides.
    pub alternate_seq_length: Option<usize>,
    /// Number of validation files to use; `0` disables validation files.
    pub num_validation: usize,
    /// Leading fraction of each training file held out for validation.
    pub val_fraction: f64,
    /// Rebuild the preprocessing artifacts even if they exist.
    pub force_preprocess: bool,
    /// Directory names scanned below `data/<split>/`.
    pub dataset_dirs: Vec<String>,
}

impl Default for LoaderParams {
    fn default() -> Self {
        LoaderParams {
            batch_size: 5,
            seq_length: 20,
            alternate_seq_length: None,
            num_validation: 0,
            val_fraction: 0.0,
            force_preprocess: false,
            dataset_dirs: vec!["herms".to_string()],
        }
    }
}

impl LoaderParams {
    pub fn builder() -> LoaderParamsBuilder {
        LoaderParamsBuilder::new()
    }

    /// Read parameters from a JSON file. Missing keys take their default value.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, PedTrajError> {
        let content = std::fs::read_to_string(path)?;
        let params: LoaderParams = serde_json::from_str(&content)?;
        LoaderParamsBuilder { params }.build()
    }

    /// Sequence length used after a dataset-type switch.
    pub fn stashed_seq_length(&self) -> usize {
        self.alternate_seq_length.unwrap_or(self.seq_length)
    }
}

/// Builder for [`LoaderParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct LoaderParamsBuilder {
    params: LoaderParams,
}

impl LoaderParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: LoaderParams::default(),
        }
    }

    pub fn batch_size(mut self, v: usize) -> Self {
        self.params.batch_size = v;
        self
    }
    pub fn seq_length(mut self, v: usize) -> Self {
        self.params.seq_length = v;
        self
    }
    pub fn alternate_seq_length(mut self, v: usize) -> Self {
        self.params.alternate_seq_length = Some(v);
        self
    }
    pub fn num_validation(mut self, v: usize) -> Self {
        self.params.num_validation = v;
        self
    }
    pub fn val_fraction(mut self, v: f64) -> Self {
        self.params.val_fraction = v;
        self
    }
    pub fn force_preprocess(mut self, v: bool) -> Self {
        self.params.force_preprocess = v;
        self
    }
    pub fn dataset_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.dataset_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Validate and return the parameters.
    ///
    /// Errors
    /// -----------------
    /// [`PedTrajError::InvalidLoaderParameter`] when a length is zero, `val_fraction` is outside
    /// `[0, 1)` or no dataset directory is given.
    pub fn build(self) -> Result<LoaderParams, PedTrajError> {
        let p = &self.params;

        if p.batch_size == 0 {
            return Err(PedTrajError::InvalidLoaderParameter(
                "batch_size must be >= 1".into(),
            ));
        }
        if p.seq_length == 0 || p.alternate_seq_length == Some(0) {
            return Err(PedTrajError::InvalidLoaderParameter(
                "sequence lengths must be >= 1".into(),
            ));
        }
        if !(p.val_fraction.is_finite() && (0.0..1.0).contains(&p.val_fraction)) {
            return Err(PedTrajError::InvalidLoaderParameter(
                "val_fraction must lie in [0, 1)".into(),
            ));
        }
        if p.dataset_dirs.is_empty() {
            return Err(PedTrajError::InvalidLoaderParameter(
                "dataset_dirs must not be empty".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for LoaderParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Loader parameters")?;
        writeln!(f, "-----------------")?;
        writeln!(f, "  batch_size       = {}", self.batch_size)?;
        writeln!(f, "  seq_length       = {}", self.seq_length)?;
        writeln!(f, "  stashed length   = {}", self.stashed_seq_length())?;
        writeln!(f, "  num_validation   = {}", self.num_validation)?;
        writeln!(f, "  val_fraction     = {}", self.val_fraction)?;
        writeln!(f, "  force_preprocess = {}", self.force_preprocess)?;
        write!(f, "  dataset_dirs     = {}", self.dataset_dirs.join(", "))
    }
}

#[cfg(test)]
mod params_test {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = LoaderParams::builder().build().unwrap();
        assert_eq!(p.batch_size, 5);
        assert_eq!(p.seq_length, 20);
        assert_eq!(p.stashed_seq_length(), 20);
        assert_eq!(p.dataset_dirs, vec!["herms".to_string()]);
    }

    #[test]
    fn test_run_mode() {
        assert_eq!(RunMode::default(), RunMode::Train);
        assert!(RunMode::Infer.is_infer());
        assert!(!RunMode::Train.is_infer());
        assert!(!RunMode::Generate.is_infer());
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            LoaderParams::builder().batch_size(0).build(),
            Err(PedTrajError::InvalidLoaderParameter(_))
        ));
        assert!(LoaderParams::builder().alternate_seq_length(0).build().is_err());
        assert!(LoaderParams::builder().val_fraction(1.0).build().is_err());
        assert!(LoaderParams::builder().val_fraction(-0.1).build().is_err());
        assert!(LoaderParams::builder()
            .dataset_dirs(Vec::<String>::new())
            .build()
            .is_err());
        assert!(LoaderParams::builder().val_fraction(0.2).build().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let p: LoaderParams =
            serde_json::from_str(r#"{"batch_size": 2, "dataset_dirs": ["biwi"]}"#).unwrap();
        assert_eq!(p.batch_size, 2);
        assert_eq!(p.seq_length, 20);
        assert_eq!(p.dataset_dirs, vec!["biwi".to_string()]);
        assert!(p.to_string().contains("batch_size       = 2"));
    }
}
