//! # Bivariate Gaussian parameters
//!
//! The predictor emits, per frame and per agent, five unconstrained numbers. They are mapped to
//! a valid bivariate Gaussian as follows:
//!
//! | channel | meaning | transform | range |
//! |---------|---------|-----------|-------|
//! | 0 | `mux`  | identity | ℝ |
//! | 1 | `muy`  | identity | ℝ |
//! | 2 | `sx`   | `exp`    | (0, ∞) |
//! | 3 | `sy`   | `exp`    | (0, ∞) |
//! | 4 | `corr` | `tanh`   | (-1, 1) |
//!
//! The covariance is `[[sx², ρ·sx·sy], [ρ·sx·sy, sy²]]`.
use nalgebra::{Matrix2, Vector2};
use ndarray::{s, Array2, Array3};

use crate::{constants::OUTPUT_CHANNELS, pedtraj_errors::PedTrajError};

/// Per-frame, per-slot distribution parameters, each of shape `(frames, agents)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionParams {
    pub mux: Array2<f64>,
    pub muy: Array2<f64>,
    pub sx: Array2<f64>,
    pub sy: Array2<f64>,
    pub corr: Array2<f64>,
}

/// Slice raw predictor output `(frames, agents, 5)` into constrained parameters.
pub fn extract_params(raw_output: &Array3<f64>) -> Result<DistributionParams, PedTrajError> {
    let (_, _, channels) = raw_output.dim();
    if channels != OUTPUT_CHANNELS {
        return Err(PedTrajError::ShapeMismatch(format!(
            "raw output has {channels} channels, expected {OUTPUT_CHANNELS}"
        )));
    }

    let channel = |c: usize| raw_output.slice(s![.., .., c]).to_owned();
    Ok(DistributionParams {
        mux: channel(0),
        muy: channel(1),
        sx: channel(2).mapv(f64::exp),
        sy: channel(3).mapv(f64::exp),
        corr: channel(4).mapv(f64::tanh),
    })
}

impl DistributionParams {
    /// `(frames, agents)`
    pub fn dim(&self) -> (usize, usize) {
        self.mux.dim()
    }

    /// Gaussian of slot `slot` at frame `t`.
    pub fn gaussian(&self, t: usize, slot: usize) -> BivariateGaussian {
        BivariateGaussian {
            mean: Vector2::new(self.mux[[t, slot]], self.muy[[t, slot]]),
            sx: self.sx[[t, slot]],
            sy: self.sy[[t, slot]],
            corr: self.corr[[t, slot]],
        }
    }
}

/// One agent's predictive distribution at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BivariateGaussian {
    pub mean: Vector2<f64>,
    pub sx: f64,
    pub sy: f64,
    pub corr: f64,
}

impl BivariateGaussian {
    pub fn covariance(&self) -> Matrix2<f64> {
        let off = self.corr * self.sx * self.sy;
        Matrix2::new(self.sx * self.sx, off, off, self.sy * self.sy)
    }

    /// Lower-triangular `L` with `L·Lᵀ = covariance`, in closed form.
    ///
    /// `1 - corr²` is floored at zero so a saturated `tanh` still yields a usable factor.
    pub fn cholesky_factor(&self) -> Matrix2<f64> {
        let tail = (1.0 - self.corr * self.corr).max(0.0).sqrt();
        Matrix2::new(self.sx, 0.0, self.corr * self.sy, self.sy * tail)
    }

    /// Density at `point`.
    pub fn density(&self, point: Vector2<f64>) -> f64 {
        let norm = point - self.mean;
        let sxsy = self.sx * self.sy;
        let z = (norm.x / self.sx).powi(2) + (norm.y / self.sy).powi(2)
            - 2.0 * (self.corr * norm.x * norm.y / sxsy);
        let neg_rho = 1.0 - self.corr * self.corr;

        let numerator = (-z / (2.0 * neg_rho)).exp();
        let denominator = 2.0 * std::f64::consts::PI * (sxsy * neg_rho.sqrt());
        numerator / denominator
    }

    /// `-ln(max(density, floor))`
    pub fn neg_log_density(&self, point: Vector2<f64>, floor: f64) -> f64 {
        -self.density(point).max(floor).ln()
    }
}
