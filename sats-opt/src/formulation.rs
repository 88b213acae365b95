use crate::{AllocationVariableSpace, FormulationConfig, FormulationError};
use sats_core::models::{Archetype, Bidder, BidderId, Mip, World};

mod aggregation;
mod coverage;
mod items;
mod regional;

pub use aggregation::AggregationLimitFormulation;
pub use coverage::CoverageFormulation;
pub use items::ComplementarityFormulation;
pub use regional::WeightedRegionsFormulation;

/// A piece of the model that registers its own variables and constraints.
///
/// Components are appended in two phases, variables first, so that the
/// resulting model is deterministic in its ordering.
pub trait PartialMip {
    /// Register the component's variables
    fn append_variables(&mut self, mip: &mut Mip) -> Result<(), FormulationError>;

    /// Register the component's constraints. Requires the variables.
    fn append_constraints(&self, mip: &mut Mip) -> Result<(), FormulationError>;

    /// Both phases, in order
    fn append_to(&mut self, mip: &mut Mip) -> Result<(), FormulationError> {
        self.append_variables(mip)?;
        self.append_constraints(mip)
    }
}

/// The formulation of one bidder's valuation, chosen by its archetype.
///
/// Binds the bidder's value variable `v_i` to a linearization of its
/// valuation over the shared allocation variables.
#[derive(Debug)]
pub enum BidderFormulation<'a> {
    /// Regions of interest at full weight
    Local(WeightedRegionsFormulation<'a>),
    /// Regions weighted by distance from home
    Regional(WeightedRegionsFormulation<'a>),
    /// Coverage-discounted regional values
    Global(CoverageFormulation<'a>),
    /// Coverage-discounted regional values, subject to aggregation limits
    National(CoverageFormulation<'a>),
    /// Items with complementarity markups
    Items(ComplementarityFormulation<'a>),
}

impl<'a> BidderFormulation<'a> {
    /// Select and validate the formulation for `bidder`.
    ///
    /// The allocation space must already have its variables appended.
    pub fn new(
        bidder: &'a Bidder,
        world: &'a World,
        space: &'a AllocationVariableSpace,
        config: &FormulationConfig,
        scaling_factor: f64,
    ) -> Result<Self, FormulationError> {
        let mismatch = || FormulationError::ArchetypeMismatch {
            bidder: bidder.id,
            archetype: bidder.archetype.name(),
            world: world.kind(),
        };

        match (&bidder.archetype, world) {
            (
                Archetype::Local {
                    value,
                    regions_of_interest,
                },
                World::MultiRegion(world),
            ) => Ok(Self::Local(WeightedRegionsFormulation::local(
                bidder.id,
                value,
                regions_of_interest,
                world,
                space,
                config,
                scaling_factor,
            )?)),
            (
                Archetype::Regional {
                    value,
                    home,
                    distance_discounts,
                },
                World::MultiRegion(world),
            ) => Ok(Self::Regional(WeightedRegionsFormulation::regional(
                bidder.id,
                value,
                *home,
                distance_discounts,
                world,
                space,
                config,
                scaling_factor,
            )?)),
            (Archetype::Global { value, coverage }, World::MultiRegion(world)) => {
                Ok(Self::Global(CoverageFormulation::new(
                    bidder.id,
                    value,
                    coverage,
                    world,
                    space,
                    config,
                    scaling_factor,
                )?))
            }
            (Archetype::National { value, coverage }, World::MultiRegion(world)) => {
                Ok(Self::National(CoverageFormulation::new(
                    bidder.id,
                    value,
                    coverage,
                    world,
                    space,
                    config,
                    scaling_factor,
                )?))
            }
            (
                Archetype::Items {
                    base_values,
                    markup,
                },
                World::Items(world),
            ) => Ok(Self::Items(ComplementarityFormulation::new(
                bidder.id,
                base_values,
                *markup,
                world,
                space,
                config,
                scaling_factor,
            )?)),
            _ => Err(mismatch()),
        }
    }

    /// The bidder being formulated
    pub fn bidder(&self) -> BidderId {
        match self {
            Self::Local(f) | Self::Regional(f) => f.bidder(),
            Self::Global(f) | Self::National(f) => f.bidder(),
            Self::Items(f) => f.bidder(),
        }
    }

    fn as_partial_mip(&mut self) -> &mut dyn PartialMip {
        match self {
            Self::Local(f) | Self::Regional(f) => f,
            Self::Global(f) | Self::National(f) => f,
            Self::Items(f) => f,
        }
    }
}

impl PartialMip for BidderFormulation<'_> {
    fn append_variables(&mut self, mip: &mut Mip) -> Result<(), FormulationError> {
        let before = mip.num_variables();
        self.as_partial_mip().append_variables(mip)?;
        tracing::debug!(
            bidder = %self.bidder(),
            variables = mip.num_variables() - before,
            "registered bidder variables"
        );
        Ok(())
    }

    fn append_constraints(&self, mip: &mut Mip) -> Result<(), FormulationError> {
        let before = mip.num_constraints();
        match self {
            Self::Local(f) | Self::Regional(f) => f.append_constraints(mip)?,
            Self::Global(f) | Self::National(f) => f.append_constraints(mip)?,
            Self::Items(f) => f.append_constraints(mip)?,
        }
        tracing::debug!(
            bidder = %self.bidder(),
            constraints = mip.num_constraints() - before,
            "registered bidder constraints"
        );
        Ok(())
    }
}
