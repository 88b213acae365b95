use crate::formulation::BidderFormulation;
use crate::{
    AggregationLimitFormulation, AllocationVariableSpace, FormulationConfig, FormulationError,
    PartialMip,
};
use sats_core::models::{Bidder, Mip, Set, ValuationError, World};
use tracing::{Level, event};

// Relative slack on the value bounds, absorbing rounding in the valuations
const VALUE_BOUND_SLACK: f64 = 1e-6;

/// The factor all value-derived coefficients are divided by.
///
/// Values up to `safe_ceiling` are left untouched; above it, everything is
/// scaled so that the highest value lands exactly on the ceiling.
pub fn scaling_factor(highest_value: f64, safe_ceiling: f64) -> f64 {
    if highest_value > safe_ceiling {
        highest_value / safe_ceiling
    } else {
        1.0
    }
}

/// A solver-ready model with what is needed to decode its solution
#[derive(Debug)]
pub struct AssembledModel {
    /// The model handed to the solver
    pub mip: Mip,
    /// The shared allocation and value variables
    pub space: AllocationVariableSpace,
    /// The factor value coefficients were divided by
    pub scaling_factor: f64,
}

/// Builds a single model out of the allocation space, one formulation per
/// bidder and the optional cross-bidder aggregation limits.
#[derive(Debug, Clone, Copy)]
pub struct ModelAssembler<'a> {
    world: &'a World,
    bidders: &'a [Bidder],
    config: &'a FormulationConfig,
}

impl<'a> ModelAssembler<'a> {
    /// An assembler for the given instance
    pub fn new(world: &'a World, bidders: &'a [Bidder], config: &'a FormulationConfig) -> Self {
        Self {
            world,
            bidders,
            config,
        }
    }

    /// One unscaled valuation per bidder, in population order
    fn valuations(
        &self,
        valuation: impl Fn(&Bidder) -> Result<f64, ValuationError>,
    ) -> Result<Vec<f64>, FormulationError> {
        self.bidders
            .iter()
            .map(|bidder| {
                valuation(bidder).map_err(|err| match err {
                    ValuationError::WorldMismatch { archetype, world } => {
                        FormulationError::ArchetypeMismatch {
                            bidder: bidder.id,
                            archetype,
                            world,
                        }
                    }
                    other => other.into(),
                })
            })
            .collect()
    }

    fn check_categories(&self) -> Result<(), FormulationError> {
        let mut seen = Set::default();
        for category in self.world.categories() {
            if !seen.insert(category.id.clone()) {
                return Err(FormulationError::DuplicateCategory(category.id));
            }
        }
        Ok(())
    }

    fn resolve_scaling(&self, highest_value: f64) -> Result<f64, FormulationError> {
        match self.config.scaling_override {
            Some(factor) if factor.is_finite() && factor > 0.0 => Ok(factor),
            Some(factor) => Err(FormulationError::InvalidScaling(factor)),
            None => Ok(scaling_factor(highest_value, self.config.safe_ceiling)),
        }
    }

    /// Assemble the model.
    ///
    /// Components are appended in a fixed order: allocation variables, each
    /// bidder in population order, aggregation limits, and finally the supply
    /// constraints and the objective.
    pub fn assemble(&self) -> Result<AssembledModel, FormulationError> {
        if self.bidders.is_empty() {
            return Err(FormulationError::EmptyPopulation);
        }

        self.check_categories()?;

        // the full bundle drives scaling; the bounds must hold for every bundle
        let full = self.world.full_bundle();
        let values = self.valuations(|bidder| bidder.value(self.world, &full))?;
        let bounds = self.valuations(|bidder| {
            let bound = bidder.value_bound(self.world)?;
            Ok(bound.max(bidder.value(self.world, &full)?))
        })?;
        let highest_value = values.iter().copied().fold(0.0, f64::max);
        let scaling_factor = self.resolve_scaling(highest_value)?;
        event!(
            Level::INFO,
            highest_value,
            scaling_factor,
            bidders = self.bidders.len(),
            "formulating allocation problem"
        );

        let mut mip = Mip::new();
        let mut space = AllocationVariableSpace::new(
            self.bidders
                .iter()
                .zip(bounds)
                .map(|(bidder, bound)| {
                    (bidder.id, bound / scaling_factor * (1.0 + VALUE_BOUND_SLACK))
                }),
            self.world.categories(),
        )?;
        space.append_variables(&mut mip)?;

        let mut formulations = self
            .bidders
            .iter()
            .map(|bidder| {
                BidderFormulation::new(bidder, self.world, &space, self.config, scaling_factor)
            })
            .collect::<Result<Vec<_>, _>>()?;
        for formulation in formulations.iter_mut() {
            formulation.append_to(&mut mip)?;
        }

        if let Some(limit) = self.config.aggregation_limit.as_ref() {
            AggregationLimitFormulation::new(limit, self.world, self.bidders, &space)?
                .append_to(&mut mip)?;
        }

        space.append_constraints(&mut mip)?;
        space.append_objective(&mut mip)?;

        event!(
            Level::INFO,
            variables = mip.num_variables(),
            integral = mip.num_integral(),
            constraints = mip.num_constraints(),
            "assembled model"
        );
        Ok(AssembledModel {
            mip,
            space,
            scaling_factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_kicks_in_above_the_ceiling() {
        assert_eq!(scaling_factor(1_000.0, 1e6), 1.0);
        assert_eq!(scaling_factor(1e6, 1e6), 1.0);
        assert_eq!(scaling_factor(4e6, 1e6), 4.0);
    }

    #[test]
    fn empty_population() {
        let world = World::Items(sats_core::models::ItemWorld { items: vec![] });
        let config = FormulationConfig::default();
        assert_eq!(
            ModelAssembler::new(&world, &[], &config).assemble().unwrap_err(),
            FormulationError::EmptyPopulation
        );
    }
}
