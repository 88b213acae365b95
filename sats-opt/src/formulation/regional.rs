use crate::{
    AllocationVariableSpace, FormulationConfig, FormulationError, Linearization, PartialMip,
    PiecewiseLinearEncoder,
};
use sats_core::models::{
    BidderId, CategoryId, Constraint, LinearExpr, Map, Mip, PiecewiseLinearFunction, RegionId,
    RegionalValue, RegionalWorld, VarId, Variable,
};

/// Variables describing one region for one bidder
#[derive(Debug, Clone)]
pub(crate) struct RegionVariables {
    pub region: RegionId,
    /// `ω_r`, the scaled regional value
    pub omega: VarId,
    /// `c_r`, the share of the maximum regional capacity
    share: VarId,
    /// `c_r − β`
    quality_input: VarId,
    quality: VarId,
    /// `cap_{r,b}` per band, in world order
    capacities: Vec<VarId>,
}

/// The regional-capacity core shared by the local, regional, global and
/// national archetypes: per region, band capacities as functions of the
/// allocated quantities, their share of the maximum regional capacity, the
/// quality of that share and finally `ω_r = (αβ·pop_r / scale) · quality_r`.
#[derive(Debug)]
pub(crate) struct RegionalCapacity<'a> {
    bidder: BidderId,
    value: &'a RegionalValue,
    world: &'a RegionalWorld,
    space: &'a AllocationVariableSpace,
    capacity_functions: Vec<PiecewiseLinearFunction>,
    max_capacity: f64,
    scaling_factor: f64,
    linearization: Linearization,
    regions: Vec<RegionVariables>,
    encoders: Vec<PiecewiseLinearEncoder>,
}

impl<'a> RegionalCapacity<'a> {
    pub fn new(
        bidder: BidderId,
        value: &'a RegionalValue,
        world: &'a RegionalWorld,
        space: &'a AllocationVariableSpace,
        config: &FormulationConfig,
        scaling_factor: f64,
    ) -> Result<Self, FormulationError> {
        let invalid = |parameter: &'static str, reason: String| {
            FormulationError::InvalidParameter {
                bidder,
                parameter,
                reason,
            }
        };
        if !value.alpha.is_finite() || value.alpha < 0.0 {
            return Err(invalid("alpha", format!("{} is not a non-negative number", value.alpha)));
        }
        if !(value.beta > 0.0 && value.beta <= 1.0) {
            return Err(invalid("beta", format!("{} is outside of (0, 1]", value.beta)));
        }
        let (lowest, highest) = value.quality.range();
        if lowest < 0.0 || highest > 1.0 {
            return Err(invalid(
                "quality",
                format!("scores range over [{lowest}, {highest}], outside of [0, 1]"),
            ));
        }

        let max_capacity = world.maximum_regional_capacity();
        if !(max_capacity > 0.0) {
            return Err(FormulationError::InvalidWorld(
                "the maximum regional capacity is zero".to_owned(),
            ));
        }
        let capacity_functions = world
            .bands
            .iter()
            .map(|band| band.capacity_function())
            .collect::<Result<_, _>>()?;

        Ok(Self {
            bidder,
            value,
            world,
            space,
            capacity_functions,
            max_capacity,
            scaling_factor,
            linearization: config.linearization,
            regions: Vec::new(),
            encoders: Vec::new(),
        })
    }

    pub fn bidder(&self) -> BidderId {
        self.bidder
    }

    pub fn world(&self) -> &'a RegionalWorld {
        self.world
    }

    pub fn space(&self) -> &'a AllocationVariableSpace {
        self.space
    }

    /// The region variables, once appended
    pub fn regions(&self) -> &[RegionVariables] {
        &self.regions
    }

    /// The scaled `αβ·pop_r` coefficient of a region
    fn coefficient(&self, population: f64) -> f64 {
        self.value.coefficient(population) / self.scaling_factor
    }

    /// An upper bound on `Σ_r ω_r`
    pub fn omega_bound(&self) -> f64 {
        let (_, highest) = self.value.quality.range();
        self.world
            .regions
            .iter()
            .map(|region| self.coefficient(region.population) * highest)
            .sum()
    }
}

impl PartialMip for RegionalCapacity<'_> {
    fn append_variables(&mut self, mip: &mut Mip) -> Result<(), FormulationError> {
        let beta = self.value.beta;
        let (quality_low, quality_high) = self.value.quality.range();
        let (share_low, share_high) = self
            .capacity_functions
            .iter()
            .map(|f| f.range())
            .fold((0.0, 0.0), |(lo, hi), (l, h)| (lo + l, hi + h));

        let mut regions = Vec::with_capacity(self.world.regions.len());
        let mut encoders = Vec::new();

        for region in self.world.regions.iter() {
            let key = format!("{}_{}", self.bidder, region.id);
            let coefficient = self.coefficient(region.population);

            let omega = mip.add_variable(Variable::continuous(
                format!("omega_{key}"),
                coefficient * quality_low,
                coefficient * quality_high,
            ))?;
            let share = mip.add_variable(Variable::continuous(
                format!("c_{key}"),
                share_low / self.max_capacity,
                share_high / self.max_capacity,
            ))?;
            let quality_input = mip.add_variable(Variable::continuous(
                format!("qin_{key}"),
                -beta,
                1.0 - beta,
            ))?;
            let quality = mip.add_variable(Variable::continuous(
                format!("quality_{key}"),
                quality_low,
                quality_high,
            ))?;

            let mut capacities = Vec::with_capacity(self.world.bands.len());
            for (band, function) in self.world.bands.iter().zip(self.capacity_functions.iter()) {
                let (low, high) = function.range();
                let capacity = mip.add_variable(Variable::continuous(
                    format!("cap_{key}_{}", band.id),
                    low,
                    high,
                ))?;
                let category = CategoryId::License {
                    region: region.id,
                    band: band.id.clone(),
                };
                let quantity = self.space.allocation_variable(self.bidder, &category)?;
                encoders.push(PiecewiseLinearEncoder::new(
                    function.clone(),
                    quantity,
                    capacity,
                    format!("pwcap_{key}_{}_", band.id),
                    self.linearization,
                    mip,
                )?);
                capacities.push(capacity);
            }

            encoders.push(PiecewiseLinearEncoder::new(
                self.value.quality.clone(),
                quality_input,
                quality,
                format!("pwq_{key}_"),
                self.linearization,
                mip,
            )?);

            regions.push(RegionVariables {
                region: region.id,
                omega,
                share,
                quality_input,
                quality,
                capacities,
            });
        }

        for encoder in encoders.iter_mut() {
            encoder.append_variables(mip)?;
        }
        self.regions = regions;
        self.encoders = encoders;
        Ok(())
    }

    fn append_constraints(&self, mip: &mut Mip) -> Result<(), FormulationError> {
        if self.regions.len() != self.world.regions.len() {
            return Err(FormulationError::NotAppended(format!(
                "regional capacity of {}",
                self.bidder
            )));
        }

        for (vars, region) in self.regions.iter().zip(self.world.regions.iter()) {
            // maxCap · c_r = Σ_b cap_{r,b}
            let share = vars
                .capacities
                .iter()
                .map(|&cap| (-1.0, cap))
                .collect::<LinearExpr>()
                .with_term(self.max_capacity, vars.share);
            mip.add_constraint(Constraint::eq(share, 0.0))?;

            // quality input = c_r − β
            let input = LinearExpr::new()
                .with_term(1.0, vars.quality_input)
                .with_term(-1.0, vars.share);
            mip.add_constraint(Constraint::eq(input, -self.value.beta))?;

            // ω_r = (αβ·pop_r / scale) · quality_r
            let omega = LinearExpr::new()
                .with_term(1.0, vars.omega)
                .with_term(-self.coefficient(region.population), vars.quality);
            mip.add_constraint(Constraint::eq(omega, 0.0))?;
        }

        for encoder in self.encoders.iter() {
            encoder.append_constraints(mip)?;
        }
        Ok(())
    }
}

/// Local and regional bidders: `v_i = Σ_r γ_r · ω_r` with fixed weights.
///
/// Local bidders weigh their regions of interest with 1 and everything else
/// with 0; regional bidders weigh each region by the discount of its hop
/// distance from home (0 beyond the discount table or when unreachable).
#[derive(Debug)]
pub struct WeightedRegionsFormulation<'a> {
    core: RegionalCapacity<'a>,
    weights: Map<RegionId, f64>,
}

impl<'a> WeightedRegionsFormulation<'a> {
    /// The formulation of a local bidder
    pub fn local(
        bidder: BidderId,
        value: &'a RegionalValue,
        regions_of_interest: &[RegionId],
        world: &'a RegionalWorld,
        space: &'a AllocationVariableSpace,
        config: &FormulationConfig,
        scaling_factor: f64,
    ) -> Result<Self, FormulationError> {
        let mut weights = Map::default();
        for &region in regions_of_interest {
            world
                .region(region)
                .ok_or(FormulationError::UnknownRegion(region))?;
            weights.insert(region, 1.0);
        }
        Ok(Self {
            core: RegionalCapacity::new(bidder, value, world, space, config, scaling_factor)?,
            weights,
        })
    }

    /// The formulation of a regional bidder
    #[allow(clippy::too_many_arguments)]
    pub fn regional(
        bidder: BidderId,
        value: &'a RegionalValue,
        home: RegionId,
        distance_discounts: &[f64],
        world: &'a RegionalWorld,
        space: &'a AllocationVariableSpace,
        config: &FormulationConfig,
        scaling_factor: f64,
    ) -> Result<Self, FormulationError> {
        world
            .region(home)
            .ok_or(FormulationError::UnknownRegion(home))?;
        if let Some(bad) = distance_discounts
            .iter()
            .find(|d| !d.is_finite() || **d < 0.0)
        {
            return Err(FormulationError::InvalidParameter {
                bidder,
                parameter: "distance_discounts",
                reason: format!("{bad} is not a non-negative number"),
            });
        }

        let weights = world
            .distances_from(home)
            .into_iter()
            .filter_map(|(region, distance)| {
                distance_discounts
                    .get(distance as usize)
                    .map(|&discount| (region, discount))
            })
            .collect();
        Ok(Self {
            core: RegionalCapacity::new(bidder, value, world, space, config, scaling_factor)?,
            weights,
        })
    }

    /// The bidder being formulated
    pub fn bidder(&self) -> BidderId {
        self.core.bidder()
    }

    /// `γ_r`, zero for regions not listed
    pub fn weight(&self, region: RegionId) -> f64 {
        self.weights.get(&region).copied().unwrap_or(0.0)
    }
}

impl PartialMip for WeightedRegionsFormulation<'_> {
    fn append_variables(&mut self, mip: &mut Mip) -> Result<(), FormulationError> {
        self.core.append_variables(mip)
    }

    fn append_constraints(&self, mip: &mut Mip) -> Result<(), FormulationError> {
        self.core.append_constraints(mip)?;

        let value = self.core.space().value_variable(self.bidder())?;
        let mut expr = LinearExpr::new().with_term(1.0, value);
        for vars in self.core.regions() {
            let weight = self.weight(vars.region);
            if weight != 0.0 {
                expr.add_term(-weight, vars.omega);
            }
        }
        mip.add_constraint(Constraint::eq(expr, 0.0))?;
        Ok(())
    }
}
