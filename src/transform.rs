//! # Coordinate transforms on sequence tensors
//!
//! Reversible, per-sequence frame-of-reference changes used for normalization and
//! augmentation:
//!
//! * [`vectorize`] / [`revert`] – positions relative to each agent's first observed position.
//! * [`translate`] – recentre every agent on one reference point.
//! * [`rotate_sequence`] – rotate every position about the origin.
//!
//! All transforms touch only the `(frame, agent)` slots listed as present in that frame and
//! return a new tensor; the input is never mutated.
use nalgebra::{Point2, Rotation2, Vector2};
use ndarray::Array3;

use crate::{
    constants::{AgentId, FastHashMap, DPI},
    lookup::LookupTable,
    materialize::SequenceTensor,
    pedtraj_errors::PedTrajError,
};

/// Write-once map from agent id to its first observed absolute position.
///
/// First-seen wins: [`FirstPositions::insert`] ignores any later position for an id that is
/// already stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirstPositions {
    positions: FastHashMap<AgentId, Vector2<f64>>,
}

impl FirstPositions {
    pub fn new() -> Self {
        FirstPositions::default()
    }

    /// Store `position` for `agent_id` unless one is already stored.
    /// Returns `true` when the value was inserted.
    pub fn insert(&mut self, agent_id: AgentId, position: Vector2<f64>) -> bool {
        if self.positions.contains_key(&agent_id) {
            return false;
        }
        self.positions.insert(agent_id, position);
        true
    }

    /// First position stored for `agent_id`; later inserts never replace it.
    pub fn get(&self, agent_id: AgentId) -> Option<&Vector2<f64>> {
        self.positions.get(&agent_id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[inline]
fn read_slot(seq: &Array3<f64>, t: usize, slot: usize) -> Vector2<f64> {
    Vector2::new(seq[[t, slot, 0]], seq[[t, slot, 1]])
}

#[inline]
fn write_slot(seq: &mut Array3<f64>, t: usize, slot: usize, value: Vector2<f64>) {
    seq[[t, slot, 0]] = value.x;
    seq[[t, slot, 1]] = value.y;
}

/// Apply `f` to every present `(frame, agent)` slot of a copy of `seq`.
fn map_present<L, F>(
    seq: &SequenceTensor,
    agent_lists: &[L],
    lookup: &LookupTable,
    mut f: F,
) -> Result<SequenceTensor, PedTrajError>
where
    L: AsRef<[AgentId]>,
    F: FnMut(AgentId, Vector2<f64>) -> Result<Vector2<f64>, PedTrajError>,
{
    let mut out = seq.clone();
    let n_frames = seq.dim().0;
    for (t, ids) in agent_lists.iter().enumerate().take(n_frames) {
        for &agent_id in ids.as_ref() {
            let slot = lookup.index(agent_id)?;
            let moved = f(agent_id, read_slot(seq, t, slot))?;
            write_slot(&mut out, t, slot, moved);
        }
    }
    Ok(out)
}

/// Express each agent's positions relative to its first observed position.
///
/// Return
/// ----------
/// * The transformed copy and the [`FirstPositions`] needed by [`revert`].
pub fn vectorize<L: AsRef<[AgentId]>>(
    seq: &SequenceTensor,
    agent_lists: &[L],
    lookup: &LookupTable,
) -> Result<(SequenceTensor, FirstPositions), PedTrajError> {
    let mut first = FirstPositions::new();
    let out = map_present(seq, agent_lists, lookup, |agent_id, pos| {
        first.insert(agent_id, pos);
        let origin = first.get(agent_id).copied().unwrap_or(pos);
        Ok(pos - origin)
    })?;
    Ok((out, first))
}

/// Inverse of [`vectorize`]: add each agent's first position back.
///
/// An agent present in `agent_lists` but missing from `first` yields
/// [`PedTrajError::UnknownAgent`].
pub fn revert<L: AsRef<[AgentId]>>(
    seq: &SequenceTensor,
    agent_lists: &[L],
    lookup: &LookupTable,
    first: &FirstPositions,
) -> Result<SequenceTensor, PedTrajError> {
    map_present(seq, agent_lists, lookup, |agent_id, pos| {
        first
            .get(agent_id)
            .map(|origin| pos + origin)
            .ok_or(PedTrajError::UnknownAgent(agent_id))
    })
}

/// Subtract one reference point (typically the target agent's position) from every present
/// position.
pub fn translate<L: AsRef<[AgentId]>>(
    seq: &SequenceTensor,
    agent_lists: &[L],
    lookup: &LookupTable,
    reference: Vector2<f64>,
) -> Result<SequenceTensor, PedTrajError> {
    map_present(seq, agent_lists, lookup, |_, pos| Ok(pos - reference))
}

/// Rotate `point` counter-clockwise by `angle` radians about `origin`.
pub fn rotate_point(origin: Point2<f64>, point: Point2<f64>, angle: f64) -> Point2<f64> {
    origin + Rotation2::new(angle) * (point - origin)
}

/// Rotate every present position about the origin by `angle` radians.
pub fn rotate_sequence<L: AsRef<[AgentId]>>(
    seq: &SequenceTensor,
    angle: f64,
    agent_lists: &[L],
    lookup: &LookupTable,
) -> Result<SequenceTensor, PedTrajError> {
    let rotation = Rotation2::new(angle);
    map_present(seq, agent_lists, lookup, |_, pos| Ok(rotation * pos))
}

/// Angle from `p2` to `p1` as seen from the origin, in `[0, 2π)`.
pub fn angle_between(p1: Vector2<f64>, p2: Vector2<f64>) -> f64 {
    let ang1 = p1.y.atan2(p1.x);
    let ang2 = p2.y.atan2(p2.x);
    (ang1 - ang2).rem_euclid(DPI)
}
