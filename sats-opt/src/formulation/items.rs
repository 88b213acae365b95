use crate::{AllocationVariableSpace, FormulationConfig, FormulationError, PartialMip};
use sats_core::models::{
    BidderId, CategoryId, Constraint, ItemId, ItemWorld, LinearExpr, Map, Markup, MarkupRule,
    Mip, VarId, Variable, rank_items,
};

/// Items bidders: single-unit items with a complementarity markup.
///
/// Each assignable item `j` gets one boolean `g_{j,τ}` per tier `τ = 1..T`,
/// where `T` is the number of assignable items. An item is held iff one of
/// its tiers is active, and the active tier is pinned to the item's rank in
/// the bundle (ranked rule) or to the bundle size (uniform rule), so that
/// `v_i = Σ m(τ)·base_j·g_{j,τ}` is exactly the bundle's value.
#[derive(Debug)]
pub struct ComplementarityFormulation<'a> {
    bidder: BidderId,
    world: &'a ItemWorld,
    space: &'a AllocationVariableSpace,
    markup: Markup,
    scaling_factor: f64,
    ranked: Vec<(ItemId, f64)>,
    tiers: Option<Vec<Vec<VarId>>>,
}

impl<'a> ComplementarityFormulation<'a> {
    /// Validates the base values and ranks the assignable items
    pub fn new(
        bidder: BidderId,
        base_values: &'a Map<ItemId, f64>,
        markup: Markup,
        world: &'a ItemWorld,
        space: &'a AllocationVariableSpace,
        config: &FormulationConfig,
        scaling_factor: f64,
    ) -> Result<Self, FormulationError> {
        for (&item, &base) in base_values.iter() {
            if !world.items.contains(&item) {
                return Err(FormulationError::UnknownItem(item));
            }
            if !base.is_finite() || base < 0.0 {
                return Err(FormulationError::InvalidParameter {
                    bidder,
                    parameter: "base_values",
                    reason: format!("{base} for item {item} is not a non-negative number"),
                });
            }
        }
        if !markup.step.is_finite() || markup.step < 0.0 {
            return Err(FormulationError::InvalidParameter {
                bidder,
                parameter: "markup",
                reason: format!("step {} is not a non-negative number", markup.step),
            });
        }

        let mut ranked: Vec<(ItemId, f64)> = world
            .items
            .iter()
            .map(|&item| (item, base_values.get(&item).copied().unwrap_or(0.0)))
            .filter(|&(_, base)| config.allow_zero_value_items || base > 0.0)
            .collect();
        rank_items(&mut ranked);

        Ok(Self {
            bidder,
            world,
            space,
            markup,
            scaling_factor,
            ranked,
            tiers: None,
        })
    }

    /// The bidder being formulated
    pub fn bidder(&self) -> BidderId {
        self.bidder
    }

    /// The number of tiers, i.e. the number of assignable items
    pub fn tier_count(&self) -> usize {
        self.ranked.len()
    }

    fn allocation(&self, item: ItemId) -> Result<VarId, FormulationError> {
        self.space
            .allocation_variable(self.bidder, &CategoryId::Item(item))
    }
}

impl PartialMip for ComplementarityFormulation<'_> {
    fn append_variables(&mut self, mip: &mut Mip) -> Result<(), FormulationError> {
        let bidder = self.bidder;
        let tier_count = self.ranked.len();
        let tiers = self
            .ranked
            .iter()
            .map(|(item, _)| {
                (1..=tier_count)
                    .map(|tau| mip.add_variable(Variable::boolean(format!("g_{bidder}_{item}_t{tau}"))))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.tiers = Some(tiers);
        Ok(())
    }

    fn append_constraints(&self, mip: &mut Mip) -> Result<(), FormulationError> {
        let tiers = self.tiers.as_ref().ok_or_else(|| {
            FormulationError::NotAppended(format!("complementarity of {}", self.bidder))
        })?;
        let tier_count = self.ranked.len() as f64;

        // items that may not be assigned to this bidder
        for &item in self.world.items.iter() {
            if !self.ranked.iter().any(|(assignable, _)| *assignable == item) {
                let expr = LinearExpr::new().with_term(1.0, self.allocation(item)?);
                mip.add_constraint(Constraint::eq(expr, 0.0))?;
            }
        }

        let held = self
            .ranked
            .iter()
            .map(|&(item, _)| self.allocation(item))
            .collect::<Result<Vec<_>, _>>()?;

        let mut value = LinearExpr::new().with_term(1.0, self.space.value_variable(self.bidder)?);

        for (position, ((&(_, base), g), &x)) in
            self.ranked.iter().zip(tiers.iter()).zip(held.iter()).enumerate()
        {
            // x_j = Σ_τ g_{j,τ}
            let link = g
                .iter()
                .map(|&var| (-1.0, var))
                .collect::<LinearExpr>()
                .with_term(1.0, x);
            mip.add_constraint(Constraint::eq(link, 0.0))?;

            // the tier of a held item equals the count it is pinned to
            let pinned = match self.markup.rule {
                MarkupRule::Ranked => &held[..=position],
                MarkupRule::Uniform => &held[..],
            };
            let tier = g
                .iter()
                .zip(1..)
                .map(|(&var, tau)| (tau as f64, var))
                .collect::<LinearExpr>();
            let count = pinned.iter().map(|&x| (-1.0, x));

            let mut upper = tier.clone();
            upper.extend(count.clone());
            mip.add_constraint(Constraint::leq(upper, 0.0))?;

            let mut lower = tier;
            lower.extend(count);
            lower.add_term(-tier_count, x);
            mip.add_constraint(Constraint::geq(lower, -tier_count))?;

            for (&var, tau) in g.iter().zip(1..) {
                let credit = self.markup.factor(tau) * base / self.scaling_factor;
                value.add_term(-credit, var);
            }
        }

        mip.add_constraint(Constraint::eq(value, 0.0))?;
        Ok(())
    }
}
