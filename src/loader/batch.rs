//! # Sequences and batches
//!
//! A [`Sequence`] is one window of `seq_length` consecutive frames of a single dataset, plus
//! the same window shifted by one frame. A [`SequenceBatch`] groups `batch_size` of them; its
//! sequences may come from different datasets, but a single sequence never crosses a dataset
//! boundary.
use crate::{
    constants::AgentId,
    loader::cleaning::{clean_agent_lists, clean_test_data},
    lookup::LookupTable,
    materialize::{materialize, SequenceTensor},
    pedtraj_errors::PedTrajError,
    records::frame::Frame,
};

/// One training or validation example.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    /// Frames `[p, p + seq_length)`.
    pub source: Vec<Frame>,
    /// Frames `[p + 1, p + seq_length + 1)`, truncated at the end of the dataset.
    pub target: Vec<Frame>,
    /// Agent count of each source frame.
    pub agent_counts: Vec<usize>,
    /// Agent ids of each source frame.
    pub agent_lists: Vec<Vec<AgentId>>,
    /// Designated target agent, if the dataset lists one for this window.
    pub target_id: Option<AgentId>,
    /// Dataset the window was taken from.
    pub dataset_index: usize,
}

impl Sequence {
    pub fn seq_length(&self) -> usize {
        self.source.len()
    }

    /// Dense `(seq_length, agents, 2)` tensor of the source frames and its lookup table.
    pub fn materialize(&self) -> Result<(SequenceTensor, LookupTable), PedTrajError> {
        materialize(&self.source, &self.agent_lists, self.seq_length())
    }

    /// Prepare a test window: drop unknown positions from the observed part and keep only the
    /// target agent in the predicted part, then refresh the agent lists.
    ///
    /// Without a target agent the sequence is left as is.
    pub fn clean_for_test(&mut self, obs_length: usize, pred_length: usize) {
        let Some(target_id) = self.target_id else {
            return;
        };
        clean_test_data(&mut self.source, target_id, obs_length, pred_length);
        clean_agent_lists(&self.source, &mut self.agent_lists, obs_length, pred_length);
        for (count, ids) in self.agent_counts.iter_mut().zip(&self.agent_lists) {
            *count = ids.len();
        }
    }
}

/// Sequences emitted by one call of the batcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceBatch {
    pub sequences: Vec<Sequence>,
}

impl SequenceBatch {
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sequence> {
        self.sequences.iter()
    }

    /// Source dataset of every sequence, in batch order.
    pub fn dataset_indices(&self) -> Vec<usize> {
        self.sequences.iter().map(|s| s.dataset_index).collect()
    }

    pub fn target_ids(&self) -> Vec<Option<AgentId>> {
        self.sequences.iter().map(|s| s.target_id).collect()
    }
}

impl<'a> IntoIterator for &'a SequenceBatch {
    type Item = &'a Sequence;
    type IntoIter = std::slice::Iter<'a, Sequence>;

    fn into_iter(self) -> Self::IntoIter {
        self.sequences.iter()
    }
}
