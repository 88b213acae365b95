#![warn(missing_docs)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

/// Domain models for spectrum auction formulations.
///
/// These are mostly plain data structures. The little logic that lives here
/// (capacity functions, valuations, piecewise-linear evaluation) is the ground
/// truth every formulation must reproduce.
pub mod models;

/// Interface traits for external collaborators.
///
/// The solver is not part of this workspace's core: anything implementing
/// [`ports::MipSolver`] can be plugged into the allocation pipeline.
pub mod ports;
