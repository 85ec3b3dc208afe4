//! # Stochastic sampling from per-agent bivariate Gaussians
//!
//! Each call draws fresh standard-normal variates from the caller's RNG; nothing is
//! derandomized internally. Seed the RNG (e.g. `StdRng::seed_from_u64`) for reproducible
//! rollouts.
use nalgebra::Vector2;
use ndarray::Array2;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::{
    constants::AgentId,
    gaussian::params::{BivariateGaussian, DistributionParams},
    lookup::LookupTable,
    pedtraj_errors::PedTrajError,
};

impl BivariateGaussian {
    /// One draw `mean + L·z` with `z ~ N(0, I₂)` and `L` the Cholesky factor of the covariance.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector2<f64> {
        let z: Vector2<f64> = Vector2::new(rng.sample(StandardNormal), rng.sample(StandardNormal));
        self.mean + self.cholesky_factor() * z
    }
}

/// Draw the next position of every present agent at frame `t` of `params`.
///
/// Arguments
/// -----------------
/// * `params` – Distribution parameters; only row `t` is used.
/// * `t` – Frame row to sample from.
/// * `present` – Ids of the agents to sample.
/// * `lookup` – Slot table of the sequence.
/// * `rng` – Randomness source.
///
/// Return
/// ----------
/// * An `(agents, 2)` array of sampled `(x, y)`; slots of agents not in `present` stay `(0, 0)`.
pub fn sample_gaussian_2d<R: Rng + ?Sized>(
    params: &DistributionParams,
    t: usize,
    present: &[AgentId],
    lookup: &LookupTable,
    rng: &mut R,
) -> Result<Array2<f64>, PedTrajError> {
    let (frames, agents) = params.dim();
    if t >= frames {
        return Err(PedTrajError::ShapeMismatch(format!(
            "frame {t} requested from parameters with {frames} frames"
        )));
    }

    let mut next = Array2::<f64>::zeros((agents, 2));
    let slots = lookup.indices(present)?;
    for slot in 0..agents {
        if !slots.contains(&slot) {
            continue;
        }
        let draw = params.gaussian(t, slot).sample(rng);
        next[[slot, 0]] = draw.x;
        next[[slot, 1]] = draw.y;
    }
    Ok(next)
}

#[cfg(test)]
mod sampler_test {
    use super::*;
    use crate::gaussian::params::extract_params;
    use approx::assert_abs_diff_eq;
    use ndarray::Array3;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_absent_agent_stays_zero() {
        let mut raw = Array3::<f64>::zeros((1, 3, 5));
        raw[[0, 1, 0]] = 5.0;
        let params = extract_params(&raw).unwrap();
        let lookup = LookupTable::from_ids([7, 8, 9]);
        let mut rng = StdRng::seed_from_u64(42);

        let next = sample_gaussian_2d(&params, 0, &[7, 9], &lookup, &mut rng).unwrap();
        assert_eq!(next.dim(), (3, 2));
        assert_eq!(next[[1, 0]], 0.0);
        assert_eq!(next[[1, 1]], 0.0);
        assert!(next[[0, 0]] != 0.0 || next[[0, 1]] != 0.0);
    }

    #[test]
    fn test_same_seed_same_draws() {
        let raw = Array3::<f64>::zeros((1, 2, 5));
        let params = extract_params(&raw).unwrap();
        let lookup = LookupTable::from_ids([1, 2]);

        let a = sample_gaussian_2d(&params, 0, &[1, 2], &lookup, &mut StdRng::seed_from_u64(3))
            .unwrap();
        let b = sample_gaussian_2d(&params, 0, &[1, 2], &lookup, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empirical_moments() {
        let g = BivariateGaussian {
            mean: Vector2::new(2.0, -1.0),
            sx: 0.5,
            sy: 2.0,
            corr: 0.6,
        };
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 40_000;
        let draws: Vec<_> = (0..n).map(|_| g.sample(&mut rng)).collect();

        let mean = draws.iter().fold(Vector2::zeros(), |acc, d| acc + d) / n as f64;
        let cov_xy = draws
            .iter()
            .map(|d| (d.x - mean.x) * (d.y - mean.y))
            .sum::<f64>()
            / n as f64;

        assert_abs_diff_eq!(mean.x, 2.0, epsilon = 0.02);
        assert_abs_diff_eq!(mean.y, -1.0, epsilon = 0.05);
        assert_abs_diff_eq!(cov_xy, 0.6 * 0.5 * 2.0, epsilon = 0.05);
    }

    #[test]
    fn test_frame_out_of_range() {
        let params = extract_params(&Array3::<f64>::zeros((1, 1, 5))).unwrap();
        let lookup = LookupTable::from_ids([1]);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            sample_gaussian_2d(&params, 1, &[1], &lookup, &mut rng),
            Err(PedTrajError::ShapeMismatch(_))
        ));
    }
}
