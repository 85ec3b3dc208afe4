//! # Masked bivariate-Gaussian negative log-likelihood
//!
//! The loss of a sequence is the mean of `-ln p(target | params)` over the `(frame, agent)`
//! pairs where the agent is listed as present in that frame. Slots of absent agents contribute
//! nothing. With no present pair at all the loss is exactly `0.0`.
//!
//! Two variants exist:
//! * [`gaussian_2d_likelihood`] – every frame (training loss).
//! * [`gaussian_2d_likelihood_inference`] – frames at or after `observed_length` only
//!   (loss over the prediction horizon).
use std::ops::Range;

use nalgebra::Vector2;
use ndarray::{Array2, Array3};

use crate::{
    constants::{AgentId, DENSITY_FLOOR},
    gaussian::params::extract_params,
    lookup::LookupTable,
    pedtraj_errors::PedTrajError,
};

/// Clamped negative log-density of every `(frame, slot)` of `targets` under `outputs`.
///
/// Arguments
/// -----------------
/// * `outputs` – Raw predictor output `(frames, agents, 5)`.
/// * `targets` – True positions `(frames, agents, 2)`.
pub fn neg_log_density_grid(
    outputs: &Array3<f64>,
    targets: &Array3<f64>,
) -> Result<Array2<f64>, PedTrajError> {
    let (frames, agents, _) = outputs.dim();
    let (t_frames, t_agents, t_coords) = targets.dim();
    if t_frames < frames || t_agents != agents || t_coords < 2 {
        return Err(PedTrajError::ShapeMismatch(format!(
            "targets {:?} do not cover outputs ({frames}, {agents}, _)",
            targets.dim()
        )));
    }

    let params = extract_params(outputs)?;
    Ok(Array2::from_shape_fn((frames, agents), |(t, slot)| {
        let target = Vector2::new(targets[[t, slot, 0]], targets[[t, slot, 1]]);
        params
            .gaussian(t, slot)
            .neg_log_density(target, DENSITY_FLOOR)
    }))
}

fn masked_mean<L: AsRef<[AgentId]>>(
    grid: &Array2<f64>,
    agent_lists: &[L],
    frames: Range<usize>,
    lookup: &LookupTable,
) -> Result<f64, PedTrajError> {
    if agent_lists.len() < frames.end {
        return Err(PedTrajError::ShapeMismatch(format!(
            "{} agent lists for {} frames",
            agent_lists.len(),
            frames.end
        )));
    }

    let mut loss = 0.0;
    let mut counter = 0usize;
    for t in frames {
        for &agent_id in agent_lists[t].as_ref() {
            loss += grid[[t, lookup.index(agent_id)?]];
            counter += 1;
        }
    }

    if counter != 0 {
        Ok(loss / counter as f64)
    } else {
        Ok(loss)
    }
}

/// Training loss: masked mean NLL over all frames of `outputs`.
///
/// Arguments
/// -----------------
/// * `outputs` – Raw predictor output `(frames, agents, 5)`.
/// * `targets` – True positions `(frames, agents, 2)`.
/// * `agent_lists` – Ids present at each frame (at least one list per frame).
/// * `lookup` – Slot table of the sequence.
pub fn gaussian_2d_likelihood<L: AsRef<[AgentId]>>(
    outputs: &Array3<f64>,
    targets: &Array3<f64>,
    agent_lists: &[L],
    lookup: &LookupTable,
) -> Result<f64, PedTrajError> {
    let grid = neg_log_density_grid(outputs, targets)?;
    masked_mean(&grid, agent_lists, 0..grid.dim().0, lookup)
}

/// Inference loss: masked mean NLL over frames `observed_length..frames` only.
///
/// An `observed_length` at or beyond the sequence end leaves no frame to score and
/// returns `0.0`.
pub fn gaussian_2d_likelihood_inference<L: AsRef<[AgentId]>>(
    outputs: &Array3<f64>,
    targets: &Array3<f64>,
    agent_lists: &[L],
    observed_length: usize,
    lookup: &LookupTable,
) -> Result<f64, PedTrajError> {
    let grid = neg_log_density_grid(outputs, targets)?;
    let frames = grid.dim().0;
    masked_mean(&grid, agent_lists, observed_length.min(frames)..frames, lookup)
}
