pub mod constants;
pub mod gaussian;
pub mod loader;
pub mod lookup;
pub mod materialize;
pub mod metrics;
pub mod pedtraj_errors;
pub mod predictor;
pub mod records;
pub mod transform;

pub use loader::{
    batch::{Sequence, SequenceBatch},
    layout::DataLayout,
    params::{LoaderParams, RunMode},
    DataLoader,
};
pub use lookup::LookupTable;
pub use pedtraj_errors::PedTrajError;
