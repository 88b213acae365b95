use crate::{AggregationLimit, AllocationVariableSpace, FormulationError, PartialMip};
use sats_core::models::{
    Band, Bidder, BidderId, CategoryId, Constraint, LinearExpr, Mip, RegionId, RegionalWorld,
    VarId, Variable, World,
};

/// Indicator pair of one national bidder in one region
#[derive(Debug, Clone, Copy)]
struct Indicators {
    bidder: BidderId,
    region: RegionId,
    low: VarId,
    high: VarId,
}

/// Cross-bidder limits on a pair of bands.
///
/// Every bidder may hold at most `pair_limit` licenses of the two bands
/// combined in any region. National bidders may additionally hold licenses
/// of only one of the two bands per region, and at most `high_limit` of the
/// high band.
#[derive(Debug)]
pub struct AggregationLimitFormulation<'a> {
    limit: &'a AggregationLimit,
    world: &'a RegionalWorld,
    low: &'a Band,
    high: &'a Band,
    bidders: &'a [Bidder],
    space: &'a AllocationVariableSpace,
    indicators: Option<Vec<Indicators>>,
}

impl<'a> AggregationLimitFormulation<'a> {
    /// Resolves the limited bands in the world
    pub fn new(
        limit: &'a AggregationLimit,
        world: &'a World,
        bidders: &'a [Bidder],
        space: &'a AllocationVariableSpace,
    ) -> Result<Self, FormulationError> {
        let world = world.as_regional().ok_or_else(|| {
            FormulationError::InvalidWorld(
                "aggregation limits require a multi-region world".to_owned(),
            )
        })?;
        let low = world
            .band(&limit.low)
            .ok_or_else(|| FormulationError::UnknownBand(limit.low.clone()))?;
        let high = world
            .band(&limit.high)
            .ok_or_else(|| FormulationError::UnknownBand(limit.high.clone()))?;

        Ok(Self {
            limit,
            world,
            low,
            high,
            bidders,
            space,
            indicators: None,
        })
    }

    fn quantity(
        &self,
        bidder: BidderId,
        region: RegionId,
        band: &Band,
    ) -> Result<VarId, FormulationError> {
        self.space.allocation_variable(
            bidder,
            &CategoryId::License {
                region,
                band: band.id.clone(),
            },
        )
    }
}

impl PartialMip for AggregationLimitFormulation<'_> {
    fn append_variables(&mut self, mip: &mut Mip) -> Result<(), FormulationError> {
        let mut indicators = Vec::new();
        for bidder in self.bidders.iter().filter(|b| b.archetype.is_national()) {
            for region in self.world.regions.iter() {
                let key = format!("{}_{}", bidder.id, region.id);
                indicators.push(Indicators {
                    bidder: bidder.id,
                    region: region.id,
                    low: mip.add_variable(Variable::boolean(format!("agg_{key}_low")))?,
                    high: mip.add_variable(Variable::boolean(format!("agg_{key}_high")))?,
                });
            }
        }
        self.indicators = Some(indicators);
        Ok(())
    }

    fn append_constraints(&self, mip: &mut Mip) -> Result<(), FormulationError> {
        let indicators = self
            .indicators
            .as_ref()
            .ok_or_else(|| FormulationError::NotAppended("aggregation limits".to_owned()))?;

        for bidder in self.bidders.iter() {
            for region in self.world.regions.iter() {
                let pair = LinearExpr::new()
                    .with_term(1.0, self.quantity(bidder.id, region.id, self.low)?)
                    .with_term(1.0, self.quantity(bidder.id, region.id, self.high)?);
                mip.add_constraint(Constraint::leq(pair, self.limit.pair_limit as f64))?;
            }
        }

        for ind in indicators.iter() {
            for (indicator, band) in [(ind.low, self.low), (ind.high, self.high)] {
                let x = self.quantity(ind.bidder, ind.region, band)?;

                // h ≤ x
                let at_most = LinearExpr::new().with_term(1.0, indicator).with_term(-1.0, x);
                mip.add_constraint(Constraint::leq(at_most, 0.0))?;

                // h ≥ x / lots
                let at_least = LinearExpr::new()
                    .with_term(1.0, indicator)
                    .with_term(-1.0 / band.lots.max(1) as f64, x);
                mip.add_constraint(Constraint::geq(at_least, 0.0))?;
            }

            let exclusive = LinearExpr::new()
                .with_term(1.0, ind.low)
                .with_term(1.0, ind.high);
            mip.add_constraint(Constraint::leq(exclusive, 1.0))?;

            let high = LinearExpr::new().with_term(1.0, self.quantity(ind.bidder, ind.region, self.high)?);
            mip.add_constraint(Constraint::leq(high, self.limit.high_limit as f64))?;
        }

        tracing::debug!(
            national = indicators.len() / self.world.regions.len().max(1),
            "registered aggregation limits"
        );
        Ok(())
    }
}
