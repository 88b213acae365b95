#![warn(missing_docs)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod assembler;
mod config;
mod decoder;
mod encoder;
mod error;
mod export;
mod formulation;
mod pipeline;
mod space;

pub use assembler::{AssembledModel, ModelAssembler, scaling_factor};
pub use config::{AggregationLimit, FormulationConfig, Linearization};
pub use decoder::AllocationDecoder;
pub use encoder::PiecewiseLinearEncoder;
pub use error::{AllocationError, DecodeError, FormulationError};
pub use export::export_lp;
pub use formulation::{
    AggregationLimitFormulation, BidderFormulation, ComplementarityFormulation,
    CoverageFormulation, PartialMip, WeightedRegionsFormulation,
};
pub use pipeline::allocate;
pub use space::AllocationVariableSpace;

/**
 * Concrete solver adapters.
 */
mod impls;
pub use impls::*;

/// JSON instance format for the command line and tests
#[cfg(feature = "io")]
pub mod io;

// Tolerance used when comparing numeric bounds against function domains
pub(crate) const BOUND_TOLERANCE: f64 = 1e-9;
