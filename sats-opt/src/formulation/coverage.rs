use super::regional::RegionalCapacity;
use crate::{AllocationVariableSpace, BOUND_TOLERANCE, FormulationConfig, FormulationError, PartialMip};
use sats_core::models::{
    BidderId, CategoryId, Constraint, LinearExpr, Mip, PiecewiseLinearFunction, RegionalValue,
    RegionalWorld, ValuationError, VarId, Variable,
};

/// Global and national bidders: `v_i = γ(k) · Σ_r ω_r`, where `k` is the
/// number of regions in which the bidder holds nothing, capped at `k_max`.
///
/// Coverage indicators `w_r` flag regions with any license, a one-hot tier
/// vector `ŵ_k` selects the uncovered count, and `ψ_k` carries `Σ_r ω_r`
/// only into the selected tier, so that `v_i = Σ_k γ(k)·ψ_k`.
#[derive(Debug)]
pub struct CoverageFormulation<'a> {
    core: RegionalCapacity<'a>,
    discounts: Vec<f64>,
    total_lots: f64,
    big_m: f64,
    covered: Vec<VarId>,
    tiers: Vec<VarId>,
    carried: Vec<VarId>,
}

impl<'a> CoverageFormulation<'a> {
    /// Validates the coverage function and prepares the formulation
    pub fn new(
        bidder: BidderId,
        value: &'a RegionalValue,
        coverage: &'a PiecewiseLinearFunction,
        world: &'a RegionalWorld,
        space: &'a AllocationVariableSpace,
        config: &FormulationConfig,
        scaling_factor: f64,
    ) -> Result<Self, FormulationError> {
        let invalid = |reason: String| FormulationError::InvalidParameter {
            bidder,
            parameter: "coverage",
            reason,
        };
        let (start, end) = coverage.domain();
        if start.abs() > BOUND_TOLERANCE {
            return Err(invalid(format!(
                "domain must start at 0 uncovered regions, starts at {start}"
            )));
        }
        if coverage.range().0 < 0.0 {
            return Err(invalid("discounts must be non-negative".to_owned()));
        }

        let k_max = (end.floor() as usize).min(world.regions.len());
        let discounts = (0..=k_max)
            .map(|k| {
                coverage
                    .evaluate(k as f64)
                    .ok_or(ValuationError::CoverageDomain(k as u32))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total_lots: u32 = world.bands.iter().map(|band| band.lots).sum();
        if total_lots == 0 {
            return Err(FormulationError::InvalidWorld(
                "no band offers any lots".to_owned(),
            ));
        }

        let core = RegionalCapacity::new(bidder, value, world, space, config, scaling_factor)?;
        let big_m = core.omega_bound();
        Ok(Self {
            core,
            discounts,
            total_lots: total_lots as f64,
            big_m,
            covered: Vec::new(),
            tiers: Vec::new(),
            carried: Vec::new(),
        })
    }

    /// The bidder being formulated
    pub fn bidder(&self) -> BidderId {
        self.core.bidder()
    }

    /// The largest distinguished uncovered-region count
    pub fn k_max(&self) -> usize {
        self.discounts.len() - 1
    }
}

impl PartialMip for CoverageFormulation<'_> {
    fn append_variables(&mut self, mip: &mut Mip) -> Result<(), FormulationError> {
        self.core.append_variables(mip)?;
        let bidder = self.bidder();

        self.covered = self
            .core
            .world()
            .regions
            .iter()
            .map(|region| mip.add_variable(Variable::boolean(format!("cover_{bidder}_{}", region.id))))
            .collect::<Result<_, _>>()?;
        self.tiers = (0..self.discounts.len())
            .map(|k| mip.add_variable(Variable::boolean(format!("uncovered_{bidder}_k{k}"))))
            .collect::<Result<_, _>>()?;
        self.carried = (0..self.discounts.len())
            .map(|k| {
                mip.add_variable(Variable::continuous(
                    format!("psi_{bidder}_k{k}"),
                    0.0,
                    self.big_m,
                ))
            })
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn append_constraints(&self, mip: &mut Mip) -> Result<(), FormulationError> {
        if self.tiers.is_empty() {
            return Err(FormulationError::NotAppended(format!(
                "coverage of {}",
                self.bidder()
            )));
        }
        self.core.append_constraints(mip)?;

        let bidder = self.bidder();
        let world = self.core.world();
        let space = self.core.space();
        let regions = world.regions.len() as f64;
        let k_max = self.k_max();

        // w_r = 1 iff any license is held in r
        for (&covered, region) in self.covered.iter().zip(world.regions.iter()) {
            let quantities = world
                .bands
                .iter()
                .map(|band| {
                    space.allocation_variable(
                        bidder,
                        &CategoryId::License {
                            region: region.id,
                            band: band.id.clone(),
                        },
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;

            let upper = quantities
                .iter()
                .map(|&x| (-1.0, x))
                .collect::<LinearExpr>()
                .with_term(1.0, covered);
            mip.add_constraint(Constraint::leq(upper, 0.0))?;

            let lower = quantities
                .iter()
                .map(|&x| (-1.0 / self.total_lots, x))
                .collect::<LinearExpr>()
                .with_term(1.0, covered);
            mip.add_constraint(Constraint::geq(lower, 0.0))?;
        }

        // exactly one tier
        let one_hot = self.tiers.iter().map(|&t| (1.0, t)).collect();
        mip.add_constraint(Constraint::eq(one_hot, 1.0))?;

        // Σ_k k·ŵ_k ≤ R − Σ_r w_r
        let below = self
            .tiers
            .iter()
            .enumerate()
            .map(|(k, &t)| (k as f64, t))
            .chain(self.covered.iter().map(|&w| (1.0, w)))
            .collect();
        mip.add_constraint(Constraint::leq(below, regions))?;

        // R − Σ_r w_r ≤ Σ_{k<k_max} k·ŵ_k + R·ŵ_{k_max}
        let above = self
            .tiers
            .iter()
            .enumerate()
            .map(|(k, &t)| (if k == k_max { regions } else { k as f64 }, t))
            .chain(self.covered.iter().map(|&w| (1.0, w)))
            .collect();
        mip.add_constraint(Constraint::geq(above, regions))?;

        // ψ_k ≤ Σ_r ω_r and ψ_k ≤ M·ŵ_k
        for (&psi, &tier) in self.carried.iter().zip(self.tiers.iter()) {
            let carried = self
                .core
                .regions()
                .iter()
                .map(|vars| (-1.0, vars.omega))
                .collect::<LinearExpr>()
                .with_term(1.0, psi);
            mip.add_constraint(Constraint::leq(carried, 0.0))?;

            let gated = LinearExpr::new()
                .with_term(1.0, psi)
                .with_term(-self.big_m, tier);
            mip.add_constraint(Constraint::leq(gated, 0.0))?;
        }

        // v_i = Σ_k γ(k)·ψ_k
        let value = space.value_variable(bidder)?;
        let expr = self
            .carried
            .iter()
            .zip(self.discounts.iter())
            .map(|(&psi, &discount)| (-discount, psi))
            .collect::<LinearExpr>()
            .with_term(1.0, value);
        mip.add_constraint(Constraint::eq(expr, 0.0))?;
        Ok(())
    }
}
