//! Test-window cleaning: observed frames lose agents with unknown positions, predicted frames
//! keep only the target agent.
//!
//! Frame indices that fall outside the window are reported with `warn!` and skipped; the
//! remaining frames are still processed.
use tracing::warn;

use crate::{constants::AgentId, records::frame::Frame};

/// Clean `frames[..obs_length + pred_length]` in place.
///
/// * `[0, obs_length)`: agents whose position is `NaN` are removed.
/// * `[obs_length, obs_length + pred_length)`: every agent except `target_id` is removed.
pub fn clean_test_data(
    frames: &mut [Frame],
    target_id: AgentId,
    obs_length: usize,
    pred_length: usize,
) {
    for index in 0..obs_length + pred_length {
        let Some(frame) = frames.get_mut(index) else {
            warn!(
                "cannot clean frame {index}: window holds {} frames",
                frames.len()
            );
            continue;
        };
        if index < obs_length {
            frame.retain(|agent| !agent.is_missing());
        } else {
            frame.retain(|agent| agent.agent_id == target_id);
        }
    }
}

/// Rewrite `agent_lists[..obs_length + pred_length]` from the (cleaned) frames.
pub fn clean_agent_lists(
    frames: &[Frame],
    agent_lists: &mut [Vec<AgentId>],
    obs_length: usize,
    pred_length: usize,
) {
    for index in 0..obs_length + pred_length {
        match (frames.get(index), agent_lists.get_mut(index)) {
            (Some(frame), Some(ids)) => *ids = frame.agent_ids(),
            _ => warn!("cannot rebuild agent list {index}: out of window"),
        }
    }
}
