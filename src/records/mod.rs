//! # Records: parsing, frame grouping and preprocessing artifacts
//!
//! Modules
//! -----------------
//! * [`raw_record`] – Typed parsing of the `frame_num  ped_id  y  x` files, `?` marker handling.
//! * [`frame`] – [`Frame`](frame::Frame): the agents present at one timestep.
//! * [`dataset`] – Frame grouping, target-id selection and primary / held-out split.
//! * [`artifact`] – Versioned `postcard` snapshot of all datasets of one run.
//! * [`preprocess`] – End-to-end file list → artifact routine.
pub mod artifact;
pub mod dataset;
pub mod frame;
pub mod preprocess;
pub mod raw_record;
