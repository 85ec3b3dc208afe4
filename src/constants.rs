//! # Constants and type definitions for pedtraj
//!
//! This module centralizes the **numerical tunables**, **file-layout names**, and **common type
//! definitions** used throughout the crate.
//!
//! ## Overview
//!
//! - Identifier aliases for agents and frames
//! - Numerical floors used by the likelihood engine
//! - Input-format markers and artifact naming
//! - Known scene dimensions of the supported source datasets

use std::collections::HashMap;

use ahash::RandomState;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Identifier of a tracked pedestrian, unique within one dataset file.
pub type AgentId = i64;

/// Frame number as written in the source file (not necessarily contiguous).
pub type FrameNumber = i64;

/// Hash map with the fast `ahash` hasher, used for id → index lookups.
pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

// -------------------------------------------------------------------------------------------------
// Numerics
// -------------------------------------------------------------------------------------------------

/// Lower clamp applied to the bivariate density before taking `-ln`.
pub const DENSITY_FLOOR: f64 = 1e-20;

/// 2π
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of channels of one raw predictor output: `(mux, muy, sx, sy, corr)`.
pub const OUTPUT_CHANNELS: usize = 5;

// -------------------------------------------------------------------------------------------------
// Input format and artifacts
// -------------------------------------------------------------------------------------------------

/// Literal token used by test files for a position the model has to predict.
pub const MISSING_MARKER: &str = "?";

/// Field separator of the raw input files.
pub const INPUT_DELIMITER: u8 = b'\t';

/// Version written in front of every preprocessing artifact.
pub const ARTIFACT_FORMAT_VERSION: u32 = 2;

pub const TRAIN_ARTIFACT: &str = "trajectories_train.bin";
pub const TEST_ARTIFACT: &str = "trajectories_test.bin";
pub const VALIDATION_ARTIFACT: &str = "trajectories_val.bin";

/// Base directories below the data prefix.
pub const TRAIN_DIR: &str = "data/train";
pub const TEST_DIR: &str = "data/test";
pub const VALIDATION_DIR: &str = "data/validation";

/// Extension of the plot files written by the write-back path.
pub const PLOT_EXTENSION: &str = "bin";

// -------------------------------------------------------------------------------------------------
// Scene dimensions
// -------------------------------------------------------------------------------------------------

/// Width and height (pixels or centimetres, depending on the source) of a known scene.
pub fn dataset_dimension(name: &str) -> Option<[u32; 2]> {
    match name {
        "biwi" | "crowds" => Some([720, 576]),
        "stanford" => Some([595, 326]),
        "mot" => Some([768, 576]),
        "herms" => Some([1000, 1000]),
        _ => None,
    }
}
