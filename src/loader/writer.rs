//! # Write-back of predicted trajectories
//!
//! Two outputs per loaded dataset:
//!
//! * a plain-text trajectory file, one `agent_id frame x y` row per line
//!   (`%d %1.1f %.3f %.3f`), under `<output_root>/<model>/<directory>/<file name>`;
//! * a `postcard` plot file `<file stem>.bin` for external visualization tools.
//!
//! Both reset the train pointer first so dataset offsets are counted from dataset `0`.
use std::{
    fmt,
    fs::File,
    io::{BufWriter, Write},
};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    constants::{AgentId, FrameNumber, PLOT_EXTENSION},
    loader::{pointer::PointerKind, DataLoader},
    pedtraj_errors::PedTrajError,
};

/// One line of a written trajectory file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRow {
    pub agent_id: AgentId,
    pub frame_number: FrameNumber,
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for TrajectoryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.1} {:.3} {:.3}",
            self.agent_id, self.frame_number as f64, self.x, self.y
        )
    }
}

impl DataLoader {
    fn check_dataset_count(&self, given: usize) -> Result<(), PedTrajError> {
        if given != self.num_datasets() {
            return Err(PedTrajError::ShapeMismatch(format!(
                "{given} output entries for {} loaded datasets",
                self.num_datasets()
            )));
        }
        Ok(())
    }

    /// Write one trajectory file per dataset.
    ///
    /// Arguments
    /// -----------------
    /// * `rows_per_dataset` – Rows to write, one entry per loaded dataset.
    /// * `output_root` – Root of the result tree.
    /// * `model_name` – Sub-directory named after the model (see
    ///   [`ModelKind::name`](crate::predictor::ModelKind::name)).
    ///
    /// Return
    /// ----------
    /// * The paths written, in dataset order.
    pub fn write_to_file(
        &mut self,
        rows_per_dataset: &[Vec<TrajectoryRow>],
        output_root: &Utf8Path,
        model_name: &str,
    ) -> Result<Vec<Utf8PathBuf>, PedTrajError> {
        self.reset_batch_pointer(false);
        self.check_dataset_count(rows_per_dataset.len())?;

        let mut written = Vec::with_capacity(rows_per_dataset.len());
        for (offset, rows) in rows_per_dataset.iter().enumerate() {
            let missing = || PedTrajError::ShapeMismatch(format!("no source file for dataset {offset}"));
            let directory = self.directory_name(offset).ok_or_else(missing)?;
            let file_name = self.file_name(offset, PointerKind::Train).ok_or_else(missing)?;

            let dir = output_root.join(model_name).join(directory);
            std::fs::create_dir_all(&dir)?;
            let path = dir.join(file_name);
            info!("Writing to file path: {dir}, file_name: {file_name}");

            let mut out = BufWriter::new(File::create(&path)?);
            for row in rows {
                writeln!(out, "{row}")?;
            }
            out.flush()?;
            written.push(path);
        }
        Ok(written)
    }

    /// Serialize `data_per_dataset[i]` into `<dir>/<stem of dataset i>.bin`.
    pub fn write_to_plot_file<T: Serialize>(
        &mut self,
        data_per_dataset: &[T],
        dir: &Utf8Path,
    ) -> Result<Vec<Utf8PathBuf>, PedTrajError> {
        self.reset_batch_pointer(false);
        self.check_dataset_count(data_per_dataset.len())?;
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(data_per_dataset.len());
        for (offset, data) in data_per_dataset.iter().enumerate() {
            let name = self.file_name(offset, PointerKind::Train).ok_or_else(|| {
                PedTrajError::ShapeMismatch(format!("no dataset at offset {offset}"))
            })?;
            let stem = name.split('.').next().unwrap_or(name);
            let file_name = format!("{stem}.{PLOT_EXTENSION}");
            info!("Writing to plot file path: {dir}, file_name: {file_name}");

            let path = dir.join(file_name);
            std::fs::write(&path, postcard::to_allocvec(data)?)?;
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod writer_test {
    use super::*;

    #[test]
    fn test_row_format() {
        let row = TrajectoryRow {
            agent_id: 12,
            frame_number: 340,
            x: 1.23456,
            y: -0.5,
        };
        assert_eq!(row.to_string(), "12 340.0 1.235 -0.500");
    }
}
