//! # Sequence batcher
//!
//! [`DataLoader`] owns the preprocessed datasets of one run and hands out fixed-length windows
//! of consecutive frames, cycling over the datasets.
//!
//! ## Construction
//! -----------------
//! 1. List the raw files of the train, test and validation splits ([`layout::DataLayout`]).
//! 2. When validation files are requested, draw up to `num_validation` of them at random.
//!    If none exist, validation is disabled with a warning.
//! 3. Pick the active files from the [`RunMode`]: training files for `Train` and `Generate`,
//!    validation files (when requested) or test files for `Infer`.
//! 4. Build each needed artifact that is missing, or all of them with `force_preprocess`.
//! 5. Load the active artifact and reset both pointers.
//!
//! ## Iteration
//! -----------------
//! Two independent [`BatchPointer`]s walk the primary and the held-out frames. A window starting
//! at frame `p` is emitted when `p + seq_length <= n_frames`; otherwise the pointer moves to the
//! next dataset and the slot is retried. A call fails with
//! [`PedTrajError::InsufficientFrames`] when no dataset can ever fill a window.
//!
//! Calls mutate the pointers in place: one loader must not be advanced from several threads.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pedtraj::loader::{layout::DataLayout, params::{LoaderParams, RunMode}, DataLoader};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let params = LoaderParams::builder().batch_size(1).seq_length(20).build().unwrap();
//! let layout = DataLayout::new("/data/pedestrians", &params.dataset_dirs);
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut loader = DataLoader::new(layout, params, RunMode::Train, &mut rng).unwrap();
//!
//! for _ in 0..loader.num_batches() {
//!     let batch = loader.next_batch().unwrap();
//!     for seq in &batch {
//!         let (tensor, lookup) = seq.materialize().unwrap();
//!         // feed the predictor...
//!         # let _ = (tensor, lookup);
//!     }
//! }
//! ```
pub mod batch;
pub mod cleaning;
pub mod layout;
pub mod params;
pub mod pointer;
pub mod writer;

use camino::{Utf8Path, Utf8PathBuf};
use rand::{seq::index, Rng};
use tracing::{debug, info, warn};

use crate::{
    constants::{AgentId, FrameNumber},
    loader::{
        batch::{Sequence, SequenceBatch},
        layout::{directory_of, DataLayout, Split},
        params::{LoaderParams, RunMode},
        pointer::{BatchPointer, PointerKind},
    },
    pedtraj_errors::PedTrajError,
    records::{
        artifact::PreprocessedData,
        dataset::Dataset,
        preprocess::{frame_preprocess, HoldOut},
        raw_record::ParseMode,
    },
};

/// Stateful batcher over the datasets of one split.
#[derive(Debug, Clone)]
pub struct DataLoader {
    layout: DataLayout,
    params: LoaderParams,
    mode: RunMode,

    seq_length: usize,
    stashed_seq_length: usize,

    train_files: Vec<Utf8PathBuf>,
    test_files: Vec<Utf8PathBuf>,
    validation_files: Vec<Utf8PathBuf>,
    additional_validation: bool,
    active_files: Vec<Utf8PathBuf>,

    data: PreprocessedData,
    num_batches: usize,
    valid_num_batches: usize,

    train_pointer: BatchPointer,
    valid_pointer: BatchPointer,
}

impl DataLoader {
    /// Resolve the files, preprocess what is needed and load the active artifact.
    ///
    /// Arguments
    /// -----------------
    /// * `layout` – Data tree to read from and write artifacts to.
    /// * `params` – Validated loader parameters.
    /// * `mode` – Selects the active split and the held-out policy.
    /// * `rng` – Used only to draw the validation files.
    ///
    /// Return
    /// ----------
    /// * A loader with both pointers at `(0, 0)`, or [`PedTrajError::EmptyDatasetList`] when the
    ///   active split has no file.
    pub fn new<R: Rng + ?Sized>(
        layout: DataLayout,
        params: LoaderParams,
        mode: RunMode,
        rng: &mut R,
    ) -> Result<Self, PedTrajError> {
        let train_files = layout.dataset_paths(Split::Train)?;
        let test_files = layout.dataset_paths(Split::Test)?;
        let mut validation_files = layout.dataset_paths(Split::Validation)?;

        let mut additional_validation = params.num_validation > 0;
        if additional_validation {
            if validation_files.is_empty() {
                warn!("There is no validation dataset, validation disabled");
                additional_validation = false;
            } else {
                let amount = params.num_validation.min(validation_files.len());
                let mut picked = index::sample(rng, validation_files.len(), amount).into_vec();
                picked.sort_unstable();
                validation_files = picked
                    .into_iter()
                    .map(|i| validation_files[i].clone())
                    .collect();
            }
        }

        let active_files = match mode {
            RunMode::Train | RunMode::Generate => train_files.clone(),
            RunMode::Infer if additional_validation => validation_files.clone(),
            RunMode::Infer => test_files.clone(),
        };
        if active_files.is_empty() {
            return Err(PedTrajError::EmptyDatasetList);
        }

        let seq_length = params.seq_length;
        let stashed_seq_length = params.stashed_seq_length();
        let mut loader = DataLoader {
            layout,
            params,
            mode,
            seq_length,
            stashed_seq_length,
            train_files,
            test_files,
            validation_files,
            additional_validation,
            active_files,
            data: PreprocessedData::default(),
            num_batches: 0,
            valid_num_batches: 0,
            train_pointer: BatchPointer::new(),
            valid_pointer: BatchPointer::new(),
        };

        loader.prepare_artifacts()?;
        let split = match (mode.is_infer(), loader.additional_validation) {
            (true, true) => Split::Validation,
            (true, false) => Split::Test,
            (false, _) => Split::Train,
        };
        loader.load_split(split)?;

        loader.reset_batch_pointer(false);
        loader.reset_batch_pointer(true);
        Ok(loader)
    }

    fn needs_preprocess(&self, artifact: &Utf8Path) -> bool {
        self.params.force_preprocess || !artifact.is_file()
    }

    fn prepare_artifacts(&self) -> Result<(), PedTrajError> {
        if self.additional_validation {
            let artifact = self.layout.artifact_path(Split::Validation);
            if self.needs_preprocess(&artifact) {
                info!("Creating pre-processed validation data from raw data");
                frame_preprocess(
                    &self.validation_files,
                    &artifact,
                    ParseMode::Labelled,
                    HoldOut::Disabled,
                )?;
            }
        }

        match self.mode {
            RunMode::Infer if self.additional_validation => {
                info!("Validation visualization file will be created");
            }
            RunMode::Infer => {
                let artifact = self.layout.artifact_path(Split::Test);
                if self.needs_preprocess(&artifact) {
                    info!("Creating pre-processed test data from raw data");
                    frame_preprocess(
                        &self.active_files,
                        &artifact,
                        ParseMode::Test,
                        HoldOut::Disabled,
                    )?;
                }
            }
            RunMode::Train | RunMode::Generate => {
                let artifact = self.layout.artifact_path(Split::Train);
                if self.needs_preprocess(&artifact) {
                    info!("Creating pre-processed training data from raw data");
                    let hold_out = match self.mode {
                        RunMode::Train => HoldOut::Fraction(self.params.val_fraction),
                        _ => HoldOut::Disabled,
                    };
                    frame_preprocess(&self.active_files, &artifact, ParseMode::Labelled, hold_out)?;
                }
            }
        }
        Ok(())
    }

    /// Load the artifact of `split` and recompute the batch counts.
    fn load_split(&mut self, split: Split) -> Result<(), PedTrajError> {
        let artifact = self.layout.artifact_path(split);
        let validation_set = split == Split::Validation;
        if validation_set {
            info!("Loading validation datasets: {artifact}");
        } else {
            info!("Loading train or test dataset: {artifact}");
        }

        self.data = PreprocessedData::load(&artifact)?;
        debug!(
            "Sequence size (frames): {}, one batch (frames): {}",
            self.seq_length,
            self.params.batch_size * self.seq_length
        );

        let mut counter = 0;
        let mut valid_counter = 0;
        for dataset in &self.data.datasets {
            let num_seq = dataset.num_sequences(self.seq_length);
            let num_valid_seq = dataset.num_valid_sequences(self.seq_length);
            if validation_set {
                info!(
                    "Validation data from validation dataset {}: {} frames, {} sequences",
                    dataset.name,
                    dataset.frames.len(),
                    num_seq
                );
            } else {
                info!(
                    "Primary data of {}: {} frames, {} sequences",
                    dataset.name,
                    dataset.frames.len(),
                    num_seq
                );
                info!(
                    "Held-out data of {}: {} frames, {} sequences",
                    dataset.name,
                    dataset.valid_frames.len(),
                    num_valid_seq
                );
            }
            counter += num_seq;
            valid_counter += num_valid_seq;
        }

        self.num_batches = counter / self.params.batch_size;
        self.valid_num_batches = valid_counter / self.params.batch_size;
        if validation_set {
            info!("Total number of validation batches: {}", self.num_batches);
        } else {
            info!("Total number of training batches: {}", self.num_batches);
            info!(
                "Total number of held-out validation batches: {}",
                self.valid_num_batches
            );
        }
        Ok(())
    }

    /// Next `batch_size` windows of the primary frames.
    ///
    /// Source frames are `[p, p + seq_length)` and target frames `[p + 1, p + seq_length + 1)`
    /// (truncated at the dataset end). The target agent is the dataset's target id at position
    /// `p / seq_length`. Exhausted datasets are skipped cyclically without consuming a slot.
    pub fn next_batch(&mut self) -> Result<SequenceBatch, PedTrajError> {
        self.collect_batch(PointerKind::Train)
    }

    /// Same as [`next_batch`](Self::next_batch) over the held-out frames, with its own pointer.
    pub fn next_valid_batch(&mut self) -> Result<SequenceBatch, PedTrajError> {
        self.collect_batch(PointerKind::Valid)
    }

    fn collect_batch(&mut self, kind: PointerKind) -> Result<SequenceBatch, PedTrajError> {
        let seq_length = self.seq_length;
        let frames_of = |d: &Dataset| match kind {
            PointerKind::Train => d.frames.len(),
            PointerKind::Valid => d.valid_frames.len(),
        };

        if kind == PointerKind::Valid && self.data.datasets.iter().all(|d| frames_of(d) == 0) {
            return Err(PedTrajError::NoValidationData);
        }
        if !self.data.datasets.iter().any(|d| frames_of(d) >= seq_length) {
            return Err(PedTrajError::InsufficientFrames { seq_length });
        }

        let mut batch = SequenceBatch::default();
        while batch.len() < self.params.batch_size {
            let pointer = *self.pointer(kind);
            let dataset = &self.data.datasets[pointer.dataset_index];
            let (frames, agent_counts, agent_lists) = match kind {
                PointerKind::Train => (&dataset.frames, &dataset.agent_counts, &dataset.agent_lists),
                PointerKind::Valid => (
                    &dataset.valid_frames,
                    &dataset.valid_agent_counts,
                    &dataset.valid_agent_lists,
                ),
            };

            let p = pointer.frame_index;
            if p + seq_length <= frames.len() {
                let window = p..p + seq_length;
                let target_end = (p + seq_length + 1).min(frames.len());
                batch.sequences.push(Sequence {
                    source: frames[window.clone()].to_vec(),
                    target: frames[p + 1..target_end].to_vec(),
                    agent_counts: agent_counts[window.clone()].to_vec(),
                    agent_lists: agent_lists[window].to_vec(),
                    target_id: dataset.target_ids.get(p / seq_length).copied(),
                    dataset_index: pointer.dataset_index,
                });
                self.pointer_mut(kind).advance(seq_length);
            } else {
                self.tick_batch_pointer(kind == PointerKind::Valid);
            }
        }
        Ok(batch)
    }

    fn pointer(&self, kind: PointerKind) -> &BatchPointer {
        match kind {
            PointerKind::Train => &self.train_pointer,
            PointerKind::Valid => &self.valid_pointer,
        }
    }

    fn pointer_mut(&mut self, kind: PointerKind) -> &mut BatchPointer {
        match kind {
            PointerKind::Train => &mut self.train_pointer,
            PointerKind::Valid => &mut self.valid_pointer,
        }
    }

    /// Move the train (or validation) pointer to the first frame of the next dataset.
    pub fn tick_batch_pointer(&mut self, valid: bool) {
        let kind = if valid {
            PointerKind::Valid
        } else {
            PointerKind::Train
        };
        let num_datasets = self.num_datasets();
        self.pointer_mut(kind).tick(num_datasets);
        info!(
            "now processing: {}",
            self.file_name(0, kind).unwrap_or("<none>")
        );
    }

    /// Move the train (or validation) pointer back to `(0, 0)`.
    pub fn reset_batch_pointer(&mut self, valid: bool) {
        if valid {
            self.valid_pointer.reset();
        } else {
            self.train_pointer.reset();
        }
    }

    /// Switch between the training files and the validation files.
    ///
    /// Both directions swap the current sequence length with the stashed one. Switching to
    /// validation without validation files only logs a warning. With `load_data` the matching
    /// artifact is loaded and the train pointer (plus the validation pointer when going back to
    /// training) is reset.
    pub fn switch_to_dataset_type(&mut self, train: bool, load_data: bool) -> Result<(), PedTrajError> {
        if !train {
            if !self.additional_validation {
                warn!("There is no validation dataset, switch aborted");
                return Ok(());
            }
            info!("Dataset type switching: training ----> validation");
            std::mem::swap(&mut self.seq_length, &mut self.stashed_seq_length);
            self.active_files = self.validation_files.clone();
            if load_data {
                self.load_split(Split::Validation)?;
                self.reset_batch_pointer(false);
            }
        } else {
            info!("Dataset type switching: validation ----> training");
            std::mem::swap(&mut self.seq_length, &mut self.stashed_seq_length);
            self.active_files = self.train_files.clone();
            if load_data {
                self.load_split(Split::Train)?;
                self.reset_batch_pointer(false);
                self.reset_batch_pointer(true);
            }
        }
        Ok(())
    }

    /// Frame numbers of the primary frames `[frame_pointer - len, frame_pointer)` of the current
    /// training dataset, that is the tail of the windows emitted so far. Clamped to the frames
    /// available.
    pub fn frame_sequence(&self, len: usize) -> Vec<FrameNumber> {
        self.frame_window(len)
            .and_then(|(dataset, range)| dataset.frame_numbers.get(range))
            .map(<[FrameNumber]>::to_vec)
            .unwrap_or_default()
    }

    /// Agent ids of the same frames as [`frame_sequence`](Self::frame_sequence), flattened frame
    /// by frame in row order.
    pub fn id_sequence(&self, len: usize) -> Vec<AgentId> {
        self.frame_window(len)
            .and_then(|(dataset, range)| dataset.agent_lists.get(range))
            .map(|lists| lists.concat())
            .unwrap_or_default()
    }

    fn frame_window(&self, len: usize) -> Option<(&Dataset, std::ops::Range<usize>)> {
        let dataset = self.data.datasets.get(self.train_pointer.dataset_index)?;
        let end = self.train_pointer.frame_index.min(dataset.frames.len());
        let begin = self.train_pointer.frame_index.saturating_sub(len).min(end);
        Some((dataset, begin..end))
    }

    /// Name of the dataset `offset` positions after the given pointer.
    pub fn file_name(&self, offset: usize, kind: PointerKind) -> Option<&str> {
        let index = self.pointer(kind).dataset_index + offset;
        self.data.datasets.get(index).map(|d| d.name.as_str())
    }

    /// Directory of the source file `offset` positions after the train pointer.
    pub fn directory_name(&self, offset: usize) -> Option<&str> {
        self.active_files
            .get(self.train_pointer.dataset_index + offset)
            .and_then(|p| directory_of(p))
    }

    pub fn num_datasets(&self) -> usize {
        self.data.datasets.len()
    }

    pub fn dataset(&self, index: usize) -> Option<&Dataset> {
        self.data.datasets.get(index)
    }

    pub fn data(&self) -> &PreprocessedData {
        &self.data
    }

    pub fn num_batches(&self) -> usize {
        self.num_batches
    }

    pub fn valid_num_batches(&self) -> usize {
        self.valid_num_batches
    }

    pub fn seq_length(&self) -> usize {
        self.seq_length
    }

    pub fn batch_size(&self) -> usize {
        self.params.batch_size
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn params(&self) -> &LoaderParams {
        &self.params
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Whether validation files are in use.
    pub fn has_validation(&self) -> bool {
        self.additional_validation
    }

    pub fn train_pointer(&self) -> BatchPointer {
        self.train_pointer
    }

    pub fn valid_pointer(&self) -> BatchPointer {
        self.valid_pointer
    }

    /// Source files of the datasets currently loaded.
    pub fn active_files(&self) -> &[Utf8PathBuf] {
        &self.active_files
    }

    pub fn train_files(&self) -> &[Utf8PathBuf] {
        &self.train_files
    }

    pub fn test_files(&self) -> &[Utf8PathBuf] {
        &self.test_files
    }

    pub fn validation_files(&self) -> &[Utf8PathBuf] {
        &self.validation_files
    }
}
