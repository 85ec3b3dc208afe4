//! # Sequence lookup tables
//!
//! Agent ids are sparse and arbitrary. Dense tensors need contiguous slots, so each sequence
//! gets its own [`LookupTable`] mapping the ids seen in that sequence onto `0..N`.
//!
//! A table is only meaningful for the sequence it was built from: the same id may land on a
//! different slot in another sequence.
use crate::{
    constants::{AgentId, FastHashMap},
    pedtraj_errors::PedTrajError,
};

/// Bijection between the agent ids of one sequence and `0..len()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupTable {
    index_of: FastHashMap<AgentId, usize>,
    ids: Vec<AgentId>,
}

impl LookupTable {
    /// Build a table from per-frame id lists, assigning slots in first-seen order across the
    /// concatenated lists.
    pub fn from_agent_lists<L>(agent_lists: &[L]) -> Self
    where
        L: AsRef<[AgentId]>,
    {
        Self::from_ids(agent_lists.iter().flat_map(|l| l.as_ref().iter().copied()))
    }

    /// Build a table from a stream of ids; repeated ids keep their first slot.
    pub fn from_ids(ids: impl IntoIterator<Item = AgentId>) -> Self {
        let mut table = LookupTable::default();
        for id in ids {
            if !table.index_of.contains_key(&id) {
                table.index_of.insert(id, table.ids.len());
                table.ids.push(id);
            }
        }
        table
    }

    /// Slot of `agent_id`, or [`PedTrajError::UnknownAgent`].
    pub fn index(&self, agent_id: AgentId) -> Result<usize, PedTrajError> {
        self.get(agent_id)
            .ok_or(PedTrajError::UnknownAgent(agent_id))
    }

    pub fn get(&self, agent_id: AgentId) -> Option<usize> {
        self.index_of.get(&agent_id).copied()
    }

    pub fn contains(&self, agent_id: AgentId) -> bool {
        self.index_of.contains_key(&agent_id)
    }

    /// Agent id stored in `slot`.
    pub fn agent_at(&self, slot: usize) -> Option<AgentId> {
        self.ids.get(slot).copied()
    }

    /// Ids in slot order.
    pub fn ids(&self) -> &[AgentId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Slots of the given ids, failing on the first unknown one.
    pub fn indices(&self, agent_ids: &[AgentId]) -> Result<Vec<usize>, PedTrajError> {
        agent_ids.iter().map(|&id| self.index(id)).collect()
    }
}
