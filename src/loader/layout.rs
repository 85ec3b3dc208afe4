//! # On-disk dataset layout
//!
//! ```text
//! <prefix>/data/train/<dir>/<file>        data/train/trajectories_train.bin
//! <prefix>/data/test/<dir>/<file>         data/test/trajectories_test.bin
//! <prefix>/data/validation/<dir>/<file>   data/validation/trajectories_val.bin
//! ```
//!
//! Raw files live one directory level below the split directory; the preprocessing artifact of
//! a split sits directly in the split directory.
use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;

use crate::{
    constants::{
        TEST_ARTIFACT, TEST_DIR, TRAIN_ARTIFACT, TRAIN_DIR, VALIDATION_ARTIFACT, VALIDATION_DIR,
    },
    pedtraj_errors::PedTrajError,
};

pub use crate::constants::dataset_dimension;

/// One of the three data partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Test,
    Validation,
}

impl Split {
    pub fn base_dir(&self) -> &'static str {
        match self {
            Split::Train => TRAIN_DIR,
            Split::Test => TEST_DIR,
            Split::Validation => VALIDATION_DIR,
        }
    }

    pub fn artifact_name(&self) -> &'static str {
        match self {
            Split::Train => TRAIN_ARTIFACT,
            Split::Test => TEST_ARTIFACT,
            Split::Validation => VALIDATION_ARTIFACT,
        }
    }
}

/// Root of a data tree and the dataset directories to consider in it.
#[derive(Debug, Clone, PartialEq)]
pub struct DataLayout {
    prefix: Utf8PathBuf,
    dataset_dirs: Vec<String>,
}

impl DataLayout {
    /// Repeated directory names are kept once, in first-seen order.
    pub fn new<S: AsRef<str>>(prefix: impl Into<Utf8PathBuf>, dataset_dirs: &[S]) -> Self {
        DataLayout {
            prefix: prefix.into(),
            dataset_dirs: dataset_dirs
                .iter()
                .map(|d| d.as_ref().to_string())
                .unique()
                .collect(),
        }
    }

    pub fn prefix(&self) -> &Utf8Path {
        &self.prefix
    }

    pub fn dataset_dirs(&self) -> &[String] {
        &self.dataset_dirs
    }

    /// `<prefix>/data/<split>`
    pub fn base_dir(&self, split: Split) -> Utf8PathBuf {
        self.prefix.join(split.base_dir())
    }

    /// Preprocessing artifact of `split`.
    pub fn artifact_path(&self, split: Split) -> Utf8PathBuf {
        self.base_dir(split).join(split.artifact_name())
    }

    /// Every regular file of `<prefix>/data/<split>/<dir>` for each configured directory.
    ///
    /// Directories come in configuration order, files sorted by name inside each directory.
    /// A directory that does not exist contributes nothing.
    pub fn dataset_paths(&self, split: Split) -> Result<Vec<Utf8PathBuf>, PedTrajError> {
        let base = self.base_dir(split);
        let mut paths = Vec::new();

        for dir in &self.dataset_dirs {
            let dir_path = base.join(dir);
            if !dir_path.is_dir() {
                continue;
            }
            let mut files = Vec::new();
            for entry in dir_path.read_dir_utf8()? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    files.push(entry.path().to_path_buf());
                }
            }
            files.sort();
            paths.extend(files);
        }
        Ok(paths)
    }
}

/// Name of the directory holding `path` (`biwi` for `.../data/train/biwi/a.txt`).
pub fn directory_of(path: &Utf8Path) -> Option<&str> {
    path.parent().and_then(Utf8Path::file_name)
}
