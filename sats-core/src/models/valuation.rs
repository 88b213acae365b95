use super::{
    Archetype, Bidder, CategoryId, ItemId, Map, MarkupRule, RegionId, RegionalValue,
    RegionalWorld, World,
};

/// Quantities held per category. Missing categories count as zero.
pub type Quantities = Map<CategoryId, u32>;

/// Errors raised while computing a bidder's value for a bundle
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ValuationError {
    /// The archetype cannot be valued in the given kind of world
    #[error("{archetype} bidders cannot be valued in a {world} world")]
    WorldMismatch {
        /// The bidder's archetype
        archetype: &'static str,
        /// The world kind
        world: &'static str,
    },
    /// The quality function does not cover the input
    #[error("quality function is undefined at {input} in region {region}")]
    QualityDomain {
        /// The region being valued
        region: RegionId,
        /// `c_r − β`
        input: f64,
    },
    /// The coverage function does not cover the uncovered-region count
    #[error("coverage function is undefined at {0} uncovered regions")]
    CoverageDomain(u32),
    /// No band contributes any capacity, so shares are undefined
    #[error("the maximum regional capacity of the world is zero")]
    ZeroCapacity,
}

impl Bidder {
    /// The bidder's (unscaled) value for holding `quantities`.
    ///
    /// This is the reference valuation the MIP formulations reproduce.
    pub fn value(&self, world: &World, quantities: &Quantities) -> Result<f64, ValuationError> {
        let mismatch = || ValuationError::WorldMismatch {
            archetype: self.archetype.name(),
            world: world.kind(),
        };

        match (&self.archetype, world) {
            (
                Archetype::Local {
                    value,
                    regions_of_interest,
                },
                World::MultiRegion(world),
            ) => {
                let omegas = regional_values(value, world, quantities)?;
                Ok(regions_of_interest
                    .iter()
                    .filter_map(|region| omegas.get(region))
                    .sum())
            }
            (
                Archetype::Regional {
                    value,
                    home,
                    distance_discounts,
                },
                World::MultiRegion(world),
            ) => {
                let omegas = regional_values(value, world, quantities)?;
                let distances = world.distances_from(*home);
                Ok(omegas
                    .iter()
                    .map(|(region, omega)| {
                        let discount = distances
                            .get(region)
                            .and_then(|&d| distance_discounts.get(d as usize))
                            .copied()
                            .unwrap_or(0.0);
                        discount * omega
                    })
                    .sum())
            }
            (
                Archetype::Global { value, coverage } | Archetype::National { value, coverage },
                World::MultiRegion(world),
            ) => {
                let omegas = regional_values(value, world, quantities)?;
                let uncovered = world
                    .regions
                    .iter()
                    .filter(|region| {
                        world.bands.iter().all(|band| {
                            held(
                                quantities,
                                &CategoryId::License {
                                    region: region.id,
                                    band: band.id.clone(),
                                },
                            ) == 0
                        })
                    })
                    .count() as u32;
                let k_max = coverage.domain().1.floor().max(0.0) as u32;
                let k = uncovered.min(k_max);
                let discount = coverage
                    .evaluate(k as f64)
                    .ok_or(ValuationError::CoverageDomain(k))?;
                Ok(discount * omegas.values().sum::<f64>())
            }
            (
                Archetype::Items {
                    base_values,
                    markup,
                },
                World::Items(_),
            ) => {
                let mut bundle: Vec<(ItemId, f64)> = quantities
                    .iter()
                    .filter_map(|(category, &quantity)| match category {
                        CategoryId::Item(item) if quantity > 0 => {
                            Some((*item, base_values.get(item).copied().unwrap_or(0.0)))
                        }
                        _ => None,
                    })
                    .collect();
                rank_items(&mut bundle);

                let size = bundle.len() as u32;
                Ok(bundle
                    .iter()
                    .zip(1..)
                    .map(|(&(_, base), rank)| match markup.rule {
                        MarkupRule::Ranked => base * markup.factor(rank),
                        MarkupRule::Uniform => base * markup.factor(size),
                    })
                    .sum())
            }
            _ => Err(mismatch()),
        }
    }
}

impl Bidder {
    /// An upper bound on the bidder's (unscaled) value for any bundle.
    ///
    /// The full bundle is not necessarily the most valuable one: quality,
    /// synergy and coverage curves need not be monotone. Each region is
    /// bounded by its best quality score and the coverage discount by its
    /// largest value instead.
    pub fn value_bound(&self, world: &World) -> Result<f64, ValuationError> {
        match (&self.archetype, world) {
            (
                Archetype::Local {
                    value,
                    regions_of_interest,
                },
                World::MultiRegion(world),
            ) => {
                let best = best_regional_values(value, world);
                Ok(regions_of_interest
                    .iter()
                    .filter_map(|region| best.get(region))
                    .sum())
            }
            (
                Archetype::Regional {
                    value,
                    home,
                    distance_discounts,
                },
                World::MultiRegion(world),
            ) => {
                let distances = world.distances_from(*home);
                Ok(best_regional_values(value, world)
                    .iter()
                    .map(|(region, omega)| {
                        distances
                            .get(region)
                            .and_then(|&d| distance_discounts.get(d as usize))
                            .copied()
                            .unwrap_or(0.0)
                            * omega
                    })
                    .sum())
            }
            (
                Archetype::Global { value, coverage } | Archetype::National { value, coverage },
                World::MultiRegion(world),
            ) => {
                let (_, highest) = coverage.range();
                Ok(highest * best_regional_values(value, world).values().sum::<f64>())
            }
            (
                Archetype::Items {
                    base_values,
                    markup,
                },
                World::Items(world),
            ) => {
                // m(1) = 1, so this covers negative steps as well
                let factor = markup.factor(world.items.len() as u32).max(1.0);
                Ok(base_values.values().map(|base| base * factor).sum())
            }
            _ => Err(ValuationError::WorldMismatch {
                archetype: self.archetype.name(),
                world: world.kind(),
            }),
        }
    }
}

/// Sort items by descending base value, breaking ties by ascending id
pub fn rank_items(items: &mut [(ItemId, f64)]) {
    items.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
}

fn held(quantities: &Quantities, category: &CategoryId) -> u32 {
    quantities.get(category).copied().unwrap_or(0)
}

/// The largest `ω_r` for every region, at the peak of the quality curve
fn best_regional_values(value: &RegionalValue, world: &RegionalWorld) -> Map<RegionId, f64> {
    let (_, highest) = value.quality.range();
    world
        .regions
        .iter()
        .map(|region| (region.id, value.coefficient(region.population) * highest))
        .collect()
}

/// `ω_r` for every region of the world
fn regional_values(
    value: &RegionalValue,
    world: &RegionalWorld,
    quantities: &Quantities,
) -> Result<Map<RegionId, f64>, ValuationError> {
    let max_capacity = world.maximum_regional_capacity();
    if max_capacity <= 0.0 {
        return Err(ValuationError::ZeroCapacity);
    }

    world
        .regions
        .iter()
        .map(|region| {
            let capacity: f64 = world
                .bands
                .iter()
                .map(|band| {
                    let category = CategoryId::License {
                        region: region.id,
                        band: band.id.clone(),
                    };
                    band.capacity(held(quantities, &category).min(band.lots))
                })
                .sum();
            let input = capacity / max_capacity - value.beta;
            let quality = value
                .quality
                .evaluate(input)
                .ok_or(ValuationError::QualityDomain {
                    region: region.id,
                    input,
                })?;
            Ok((region.id, value.coefficient(region.population) * quality))
        })
        .collect()
}
