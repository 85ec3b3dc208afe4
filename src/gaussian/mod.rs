//! # Gaussian likelihood and sampling engine
//!
//! Modules
//! -----------------
//! * [`params`] – Raw output → `(mux, muy, sx, sy, corr)`, per-agent [`BivariateGaussian`](params::BivariateGaussian).
//! * [`likelihood`] – Presence-masked negative log-likelihood (training and horizon-only variants).
//! * [`sampler`] – Draws from the per-agent Gaussians with a caller-supplied RNG.
pub mod likelihood;
pub mod params;
pub mod sampler;
