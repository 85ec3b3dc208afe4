//! # Displacement error metrics
//!
//! Euclidean errors between a predicted and a true trajectory tensor, both of shape
//! `(pred_length, agents, 2)` and indexed through the same [`LookupTable`].
//!
//! At each timestep only agents listed in **both** the assumed-present and the true-present
//! list are scored. Agents missing from the true list are skipped, not penalized.
//! A timestep with no scored agent keeps its raw accumulated sum (`0.0`) instead of being
//! divided by zero.
use ndarray::Array3;

use crate::{constants::AgentId, lookup::LookupTable, pedtraj_errors::PedTrajError};

fn check_shapes<L1, L2>(
    predicted: &Array3<f64>,
    truth: &Array3<f64>,
    assumed_present: &[L1],
    true_present: &[L2],
) -> Result<usize, PedTrajError> {
    let pred_length = predicted.dim().0;
    if predicted.dim() != truth.dim() {
        return Err(PedTrajError::ShapeMismatch(format!(
            "predicted {:?} vs true {:?}",
            predicted.dim(),
            truth.dim()
        )));
    }
    if assumed_present.len() < pred_length || true_present.len() < pred_length {
        return Err(PedTrajError::ShapeMismatch(format!(
            "{pred_length} timesteps but {} assumed / {} true presence lists",
            assumed_present.len(),
            true_present.len()
        )));
    }
    Ok(pred_length)
}

/// Mean distance over the agents scored at timestep `t`, or the raw sum when none is.
fn step_error(
    predicted: &Array3<f64>,
    truth: &Array3<f64>,
    t: usize,
    assumed: &[AgentId],
    present: &[AgentId],
    lookup: &LookupTable,
) -> Result<f64, PedTrajError> {
    let mut error = 0.0;
    let mut counter = 0usize;
    for &agent_id in assumed {
        if !present.contains(&agent_id) {
            continue;
        }
        let slot = lookup.index(agent_id)?;
        let dx = predicted[[t, slot, 0]] - truth[[t, slot, 0]];
        let dy = predicted[[t, slot, 1]] - truth[[t, slot, 1]];
        error += dx.hypot(dy);
        counter += 1;
    }

    if counter != 0 {
        error /= counter as f64;
    }
    Ok(error)
}

/// Average displacement error (ADE).
///
/// Arguments
/// -----------------
/// * `predicted` – Predicted positions `(pred_length, agents, 2)`.
/// * `truth` – True positions, same shape.
/// * `assumed_present` – Per timestep, the agents the prediction claims to cover.
/// * `true_present` – Per timestep, the agents actually observed.
/// * `lookup` – Slot table shared by both tensors.
///
/// Return
/// ----------
/// * Mean over all `pred_length` timesteps of the per-step mean distance. Timesteps without a
///   scored agent contribute `0.0` and still count in the denominator. An empty horizon
///   yields `0.0`.
///
/// See also
/// ------------
/// * [`final_displacement_error`] – Same masking, last timestep only.
pub fn mean_displacement_error<L1, L2>(
    predicted: &Array3<f64>,
    truth: &Array3<f64>,
    assumed_present: &[L1],
    true_present: &[L2],
    lookup: &LookupTable,
) -> Result<f64, PedTrajError>
where
    L1: AsRef<[AgentId]>,
    L2: AsRef<[AgentId]>,
{
    let pred_length = check_shapes(predicted, truth, assumed_present, true_present)?;
    if pred_length == 0 {
        return Ok(0.0);
    }

    let mut total = 0.0;
    for t in 0..pred_length {
        total += step_error(
            predicted,
            truth,
            t,
            assumed_present[t].as_ref(),
            true_present[t].as_ref(),
            lookup,
        )?;
    }
    Ok(total / pred_length as f64)
}

/// Final displacement error (FDE): the per-step rule of [`mean_displacement_error`] applied to
/// the last timestep only. An empty horizon yields `0.0`.
pub fn final_displacement_error<L1, L2>(
    predicted: &Array3<f64>,
    truth: &Array3<f64>,
    assumed_present: &[L1],
    true_present: &[L2],
    lookup: &LookupTable,
) -> Result<f64, PedTrajError>
where
    L1: AsRef<[AgentId]>,
    L2: AsRef<[AgentId]>,
{
    let pred_length = check_shapes(predicted, truth, assumed_present, true_present)?;
    let Some(last) = pred_length.checked_sub(1) else {
        return Ok(0.0);
    };
    step_error(
        predicted,
        truth,
        last,
        assumed_present[last].as_ref(),
        true_present[last].as_ref(),
        lookup,
    )
}

#[cfg(test)]
mod metrics_test {
    use super::*;
    use approx::assert_relative_eq;

    fn setup() -> (Array3<f64>, Array3<f64>, LookupTable) {
        let lookup = LookupTable::from_ids([3, 8]);
        let truth = Array3::<f64>::zeros((2, 2, 2));
        let mut predicted = Array3::<f64>::zeros((2, 2, 2));
        // agent 3: off by (3, 4) at t=0, by (0, 1) at t=1
        predicted[[0, 0, 0]] = 3.0;
        predicted[[0, 0, 1]] = 4.0;
        predicted[[1, 0, 1]] = 1.0;
        // agent 8: off by 2 at t=1
        predicted[[1, 1, 0]] = 2.0;
        (predicted, truth, lookup)
    }

    #[test]
    fn test_ade_fde() {
        let (predicted, truth, lookup) = setup();
        let lists = vec![vec![3, 8], vec![3, 8]];

        let ade = mean_displacement_error(&predicted, &truth, &lists, &lists, &lookup).unwrap();
        // t0: (5 + 0) / 2, t1: (1 + 2) / 2
        assert_relative_eq!(ade, (2.5 + 1.5) / 2.0, epsilon = 1e-12);

        let fde = final_displacement_error(&predicted, &truth, &lists, &lists, &lookup).unwrap();
        assert_relative_eq!(fde, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_agents_missing_from_truth_are_skipped() {
        let (predicted, truth, lookup) = setup();
        let assumed = vec![vec![3, 8], vec![3, 8]];
        let observed = vec![vec![3], vec![8]];

        let ade =
            mean_displacement_error(&predicted, &truth, &assumed, &observed, &lookup).unwrap();
        assert_relative_eq!(ade, (5.0 + 2.0) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_disjoint_presence_gives_zero() {
        let (predicted, truth, lookup) = setup();
        let assumed = vec![vec![3], vec![3]];
        let observed = vec![vec![8], vec![8]];
        assert_eq!(
            mean_displacement_error(&predicted, &truth, &assumed, &observed, &lookup),
            Ok(0.0)
        );
        assert_eq!(
            final_displacement_error(&predicted, &truth, &assumed, &observed, &lookup),
            Ok(0.0)
        );
    }

    #[test]
    fn test_empty_timestep_still_counts_in_mean() {
        let (predicted, truth, lookup) = setup();
        let assumed = vec![vec![3], vec![]];
        let ade = mean_displacement_error(&predicted, &truth, &assumed, &assumed, &lookup).unwrap();
        assert_relative_eq!(ade, 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let (predicted, _, lookup) = setup();
        let truth = Array3::<f64>::zeros((3, 2, 2));
        let lists = vec![vec![3], vec![3], vec![3]];
        assert!(matches!(
            mean_displacement_error(&predicted, &truth, &lists, &lists, &lookup),
            Err(PedTrajError::ShapeMismatch(_))
        ));
    }
}
