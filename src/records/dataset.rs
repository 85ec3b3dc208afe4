//! # Per-file datasets
//!
//! A [`Dataset`] is the frame-grouped view of one source file. Frames are split positionally
//! between a **primary** sequence (used for batching) and a **held-out** validation sequence,
//! which never overlap.
//!
//! Invariants
//! -----------------
//! * `frames.len() == frame_numbers.len() == agent_lists.len() == agent_counts.len()`
//! * the same holds for the `valid_*` vectors
//! * held-out frames always precede primary frames in source order
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{AgentId, FastHashMap, FrameNumber},
    records::{
        frame::{AgentPosition, Frame},
        raw_record::{ParseMode, RawRecord},
    },
};

/// Frame-grouped content of one source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// File name of the source (last path component).
    pub name: String,
    pub frames: Vec<Frame>,
    pub frame_numbers: Vec<FrameNumber>,
    pub agent_lists: Vec<Vec<AgentId>>,
    pub agent_counts: Vec<usize>,
    pub valid_frames: Vec<Frame>,
    pub valid_frame_numbers: Vec<FrameNumber>,
    pub valid_agent_lists: Vec<Vec<AgentId>>,
    pub valid_agent_counts: Vec<usize>,
    /// Agents designated as prediction targets, in order of first appearance.
    pub target_ids: Vec<AgentId>,
    /// Untouched copy of the parsed table, in file order.
    pub raw_records: Vec<RawRecord>,
}

/// Group records by frame number, in order of first appearance of each frame.
///
/// Within a frame the first record of an agent wins; later duplicates are dropped.
pub fn group_frames(records: &[RawRecord]) -> Vec<(FrameNumber, Frame)> {
    let mut slot_of: FastHashMap<FrameNumber, usize> = FastHashMap::default();
    let mut grouped: Vec<(FrameNumber, Frame)> = Vec::new();

    for record in records {
        let slot = *slot_of.entry(record.frame_number).or_insert_with(|| {
            grouped.push((record.frame_number, Frame::new()));
            grouped.len() - 1
        });
        grouped[slot]
            .1
            .push(AgentPosition::new(record.agent_id, record.x, record.y));
    }
    grouped
}

/// Prediction targets of a file.
///
/// * [`ParseMode::Labelled`]: every distinct agent id.
/// * [`ParseMode::Test`]: only agents with at least one missing position.
pub fn target_ids(records: &[RawRecord], mode: ParseMode) -> Vec<AgentId> {
    records
        .iter()
        .filter(|r| match mode {
            ParseMode::Labelled => true,
            ParseMode::Test => r.y.is_nan(),
        })
        .map(|r| r.agent_id)
        .unique()
        .collect()
}

impl Dataset {
    /// Build a dataset from the parsed records of one file.
    ///
    /// Arguments
    /// -----------------
    /// * `name` – Display name of the source file.
    /// * `records` – Parsed records in file order.
    /// * `mode` – Parse mode used, selects the target-id rule.
    /// * `held_out_fraction` – `Some(f)` sends frames with index `< n_frames * f` to the
    ///   held-out subset; `None` keeps every frame in the primary subset.
    pub fn from_records(
        name: impl Into<String>,
        records: Vec<RawRecord>,
        mode: ParseMode,
        held_out_fraction: Option<f64>,
    ) -> Self {
        let grouped = group_frames(&records);
        let threshold = held_out_fraction.map(|f| grouped.len() as f64 * f);

        let mut dataset = Dataset {
            name: name.into(),
            target_ids: target_ids(&records, mode),
            ..Dataset::default()
        };

        for (index, (frame_number, frame)) in grouped.into_iter().enumerate() {
            let ids = frame.agent_ids();
            let primary = match threshold {
                Some(t) => index as f64 >= t,
                None => true,
            };
            if primary {
                dataset.agent_counts.push(ids.len());
                dataset.agent_lists.push(ids);
                dataset.frame_numbers.push(frame_number);
                dataset.frames.push(frame);
            } else {
                dataset.valid_agent_counts.push(ids.len());
                dataset.valid_agent_lists.push(ids);
                dataset.valid_frame_numbers.push(frame_number);
                dataset.valid_frames.push(frame);
            }
        }

        dataset.raw_records = records;
        dataset
    }

    /// Number of non-overlapping windows of `seq_length` frames in the primary subset.
    pub fn num_sequences(&self, seq_length: usize) -> usize {
        self.frames.len() / seq_length.max(1)
    }

    /// Number of non-overlapping windows of `seq_length` frames in the held-out subset.
    pub fn num_valid_sequences(&self, seq_length: usize) -> usize {
        self.valid_frames.len() / seq_length.max(1)
    }
}
