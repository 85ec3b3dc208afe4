//! # Dense sequence tensors
//!
//! Converts a window of [`Frame`]s (variable agent count, sparse ids) into a dense
//! `(seq_length, num_agents, 2)` tensor plus the [`LookupTable`] that explains its second axis.
//!
//! Slots of agents absent from a frame keep their `(0, 0)` placeholder. Whether a slot is
//! meaningful at a given frame must be read from the per-frame agent-id lists.
use ndarray::Array3;

use crate::{
    constants::AgentId, lookup::LookupTable, pedtraj_errors::PedTrajError, records::frame::Frame,
};

/// Positions of one sequence: `[frame, slot, (x, y)]`.
pub type SequenceTensor = Array3<f64>;

/// Build the dense tensor and lookup table of one sequence.
///
/// Arguments
/// -----------------
/// * `frames` – The frames of the sequence; frames beyond `seq_length` are ignored.
/// * `agent_lists` – Per-frame agent ids of the same sequence; slot order follows the first
///   appearance of each id across the concatenated lists.
/// * `seq_length` – Length of the first tensor axis. Shorter windows leave trailing frames at zero.
///
/// Return
/// ----------
/// * `(tensor, lookup)`, or [`PedTrajError::UnknownAgent`] if a frame holds an agent that none
///   of the id lists mention.
pub fn materialize<L>(
    frames: &[Frame],
    agent_lists: &[L],
    seq_length: usize,
) -> Result<(SequenceTensor, LookupTable), PedTrajError>
where
    L: AsRef<[AgentId]>,
{
    let lookup = LookupTable::from_agent_lists(agent_lists);
    let mut tensor = Array3::<f64>::zeros((seq_length, lookup.len(), 2));

    for (t, frame) in frames.iter().take(seq_length).enumerate() {
        for agent in frame.agents() {
            let slot = lookup.index(agent.agent_id)?;
            tensor[[t, slot, 0]] = agent.x;
            tensor[[t, slot, 1]] = agent.y;
        }
    }

    Ok((tensor, lookup))
}

#[cfg(test)]
mod materialize_test {
    use super::*;
    use crate::records::frame::AgentPosition;

    #[test]
    fn test_dense_layout_with_placeholders() {
        let frames = vec![
            Frame::from_positions([AgentPosition::new(9, 1.0, 2.0)]),
            Frame::from_positions([
                AgentPosition::new(4, 3.0, 4.0),
                AgentPosition::new(9, 5.0, 6.0),
            ]),
        ];
        let lists: Vec<Vec<AgentId>> = frames.iter().map(|f| f.agent_ids()).collect();
        let (tensor, lookup) = materialize(&frames, &lists, 3).unwrap();

        assert_eq!(tensor.dim(), (3, 2, 2));
        assert_eq!(lookup.ids(), &[9, 4]);
        assert_eq!(tensor[[0, 0, 0]], 1.0);
        assert_eq!(tensor[[0, 1, 0]], 0.0); // agent 4 absent at frame 0
        assert_eq!(tensor[[1, 1, 1]], 4.0);
        assert_eq!(tensor[[1, 0, 1]], 6.0);
        assert!(tensor.slice(ndarray::s![2, .., ..]).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_agent_missing_from_lists() {
        let frames = vec![Frame::from_positions([AgentPosition::new(1, 0.0, 0.0)])];
        let lists: Vec<Vec<AgentId>> = vec![vec![]];
        assert_eq!(
            materialize(&frames, &lists, 1),
            Err(PedTrajError::UnknownAgent(1))
        );
    }
}
