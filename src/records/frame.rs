use serde::{Deserialize, Serialize};

use crate::constants::AgentId;

/// Position of one agent inside a [`Frame`], stored in `(id, x, y)` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentPosition {
    pub agent_id: AgentId,
    pub x: f64,
    pub y: f64,
}

impl AgentPosition {
    pub fn new(agent_id: AgentId, x: f64, y: f64) -> Self {
        AgentPosition { agent_id, x, y }
    }

    pub fn is_missing(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }
}

/// Snapshot of every agent present at one timestep of one dataset.
///
/// The order of `agents` is fixed at construction and is load-bearing for reproducible
/// batching. An agent id appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    agents: Vec<AgentPosition>,
}

impl Frame {
    pub fn new() -> Self {
        Frame::default()
    }

    /// Build a frame from positions, keeping the first occurrence of each agent id.
    pub fn from_positions(positions: impl IntoIterator<Item = AgentPosition>) -> Self {
        let mut frame = Frame::new();
        for position in positions {
            frame.push(position);
        }
        frame
    }

    /// Append a position. Returns `false` (and ignores it) if the agent is already present.
    pub fn push(&mut self, position: AgentPosition) -> bool {
        if self.contains(position.agent_id) {
            return false;
        }
        self.agents.push(position);
        true
    }

    pub fn contains(&self, agent_id: AgentId) -> bool {
        self.agents.iter().any(|a| a.agent_id == agent_id)
    }

    pub fn position_of(&self, agent_id: AgentId) -> Option<&AgentPosition> {
        self.agents.iter().find(|a| a.agent_id == agent_id)
    }

    pub fn agents(&self) -> &[AgentPosition] {
        &self.agents
    }

    /// Agent ids in frame order.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(|a| a.agent_id).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&AgentPosition) -> bool) {
        self.agents.retain(keep);
    }
}
