//! # Sequence predictor contract and validation rollout
//!
//! The recurrent network that turns positions into distribution parameters lives outside this
//! crate. It is consumed through the [`TrajectoryPredictor`] trait: one call advances the model
//! by a single frame.
//!
//! The supported model families form a closed set ([`ModelKind`]) and are dispatched statically
//! through [`AnyPredictor`].
//!
//! ## Rollout
//! -----------------
//! [`sample_validation_data`] feeds a sequence frame by frame to a predictor, samples the next
//! position of every present agent from the predicted Gaussians, and accumulates the per-frame
//! negative log-likelihood.
use std::fmt;

use ndarray::{s, Array2, Array3};
use rand::Rng;
use tracing::debug;

use crate::{
    constants::AgentId,
    gaussian::{
        likelihood::gaussian_2d_likelihood, params::extract_params, sampler::sample_gaussian_2d,
    },
    lookup::LookupTable,
    materialize::SequenceTensor,
    pedtraj_errors::PedTrajError,
};

/// Everything a predictor needs to advance by one frame.
#[derive(Debug)]
pub struct PredictorInput<'a> {
    /// Positions at the current frame, shape `(1, N, 2)`.
    pub positions: Array3<f64>,
    /// Occupancy grid of the frame, for models that use neighbourhood pooling.
    pub grid: Option<&'a Array3<f64>>,
    /// Recurrent hidden state, shape `(N, rnn_size)`.
    pub hidden_state: Array2<f64>,
    /// Cell state for LSTM-style cells; `None` for GRU-style cells.
    pub cell_state: Option<Array2<f64>>,
    /// Agents present at the current frame.
    pub agent_ids: &'a [AgentId],
    pub agent_count: usize,
    /// Index of the dataset the sequence comes from.
    pub dataset_index: usize,
    pub lookup: &'a LookupTable,
}

/// Result of one predictor step.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorOutput {
    /// Unconstrained distribution parameters, shape `(1, N, 5)`.
    pub raw_output: Array3<f64>,
    pub hidden_state: Array2<f64>,
    pub cell_state: Option<Array2<f64>>,
}

/// One-frame contract of an external sequence model.
pub trait TrajectoryPredictor {
    fn step(&mut self, input: PredictorInput<'_>) -> Result<PredictorOutput, PedTrajError>;
}

/// Supported model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    /// Social pooling over neighbour hidden states.
    #[default]
    SocialLstm,
    /// Pooling over static occupancy.
    ObstacleLstm,
    /// No pooling.
    VanillaLstm,
}

impl ModelKind {
    /// Model selected by its numeric index: `1` social, `2` obstacle, `3` vanilla.
    /// Any other index falls back to [`ModelKind::SocialLstm`].
    pub fn from_index(index: u32) -> Self {
        match index {
            2 => ModelKind::ObstacleLstm,
            3 => ModelKind::VanillaLstm,
            _ => ModelKind::SocialLstm,
        }
    }

    /// Upper-case name used for output directories.
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::SocialLstm => "SOCIALLSTM",
            ModelKind::ObstacleLstm => "OBSTACLELSTM",
            ModelKind::VanillaLstm => "VANILLALSTM",
        }
    }

    /// Whether the model consumes a per-frame occupancy grid.
    pub fn uses_grid(&self) -> bool {
        !matches!(self, ModelKind::VanillaLstm)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Closed set of predictor implementations, one per [`ModelKind`].
#[derive(Debug, Clone)]
pub enum AnyPredictor<S, O, V> {
    Social(S),
    Obstacle(O),
    Vanilla(V),
}

impl<S, O, V> AnyPredictor<S, O, V> {
    pub fn kind(&self) -> ModelKind {
        match self {
            AnyPredictor::Social(_) => ModelKind::SocialLstm,
            AnyPredictor::Obstacle(_) => ModelKind::ObstacleLstm,
            AnyPredictor::Vanilla(_) => ModelKind::VanillaLstm,
        }
    }
}

impl<S, O, V> TrajectoryPredictor for AnyPredictor<S, O, V>
where
    S: TrajectoryPredictor,
    O: TrajectoryPredictor,
    V: TrajectoryPredictor,
{
    fn step(&mut self, input: PredictorInput<'_>) -> Result<PredictorOutput, PedTrajError> {
        match self {
            AnyPredictor::Social(model) => model.step(input),
            AnyPredictor::Obstacle(model) => model.step(input),
            AnyPredictor::Vanilla(model) => model.step(input),
        }
    }
}

/// Sample a full trajectory from a predictor, starting from the first observed frame.
///
/// Arguments
/// -----------------
/// * `x_seq` – Observed sequence `(seq_length, N, 2)`.
/// * `agent_lists` – Agents present at each frame.
/// * `agent_counts` – Number of agents present at each frame.
/// * `grids` – Per-frame occupancy grids; `None` for grid-free models.
/// * `predictor` – Model advanced one frame per step.
/// * `lookup` – Slot table of the sequence.
/// * `rnn_size` – Width of the recurrent states.
/// * `use_cell_state` – Allocate a cell state (LSTM) or not (GRU).
/// * `dataset_index` – Dataset the sequence comes from, forwarded to the model.
/// * `rng` – Randomness source for the Gaussian draws.
///
/// Return
/// ----------
/// * The rollout tensor: frame 0 copied from `x_seq`, frame `t + 1` sampled from the output at
///   frame `t` for the agents present at `t`.
/// * The summed single-frame losses divided by `seq_length`.
#[allow(clippy::too_many_arguments)]
pub fn sample_validation_data<L, P, R>(
    x_seq: &SequenceTensor,
    agent_lists: &[L],
    agent_counts: &[usize],
    grids: Option<&[Array3<f64>]>,
    predictor: &mut P,
    lookup: &LookupTable,
    rnn_size: usize,
    use_cell_state: bool,
    dataset_index: usize,
    rng: &mut R,
) -> Result<(SequenceTensor, f64), PedTrajError>
where
    L: AsRef<[AgentId]>,
    P: TrajectoryPredictor + ?Sized,
    R: Rng + ?Sized,
{
    let (seq_length, num_agents, _) = x_seq.dim();
    let steps = seq_length.saturating_sub(1);
    if agent_lists.len() < steps || agent_counts.len() < steps {
        return Err(PedTrajError::ShapeMismatch(format!(
            "{seq_length} frames but {} agent lists and {} agent counts",
            agent_lists.len(),
            agent_counts.len()
        )));
    }
    if let Some(g) = grids {
        if g.len() < steps {
            return Err(PedTrajError::ShapeMismatch(format!(
                "{seq_length} frames but {} grids",
                g.len()
            )));
        }
    }

    let mut hidden_state = Array2::<f64>::zeros((num_agents, rnn_size));
    let mut cell_state = use_cell_state.then(|| Array2::<f64>::zeros((num_agents, rnn_size)));

    let mut rollout = SequenceTensor::zeros((seq_length, num_agents, 2));
    if seq_length == 0 {
        return Ok((rollout, 0.0));
    }
    rollout
        .slice_mut(s![0, .., ..])
        .assign(&x_seq.slice(s![0, .., ..]));

    let mut total_loss = 0.0;
    for t in 0..steps {
        let frame = x_seq.slice(s![t..t + 1, .., ..]).to_owned();
        let present = agent_lists[t].as_ref();

        let output = predictor.step(PredictorInput {
            positions: frame.clone(),
            grid: grids.map(|g| &g[t]),
            hidden_state,
            cell_state,
            agent_ids: present,
            agent_count: agent_counts[t],
            dataset_index,
            lookup,
        })?;
        hidden_state = output.hidden_state;
        cell_state = output.cell_state;

        let params = extract_params(&output.raw_output)?;
        let next = sample_gaussian_2d(&params, 0, present, lookup, rng)?;
        rollout.slice_mut(s![t + 1, .., ..]).assign(&next);

        total_loss += gaussian_2d_likelihood(&output.raw_output, &frame, &[present], lookup)?;
    }

    let loss = total_loss / seq_length as f64;
    debug!("rollout of {seq_length} frames over {num_agents} agents, loss {loss:.4}");
    Ok((rollout, loss))
}
