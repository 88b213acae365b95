use super::{BidderId, ItemId, Map, PiecewiseLinearFunction, RegionId};

/// A participant in the auction together with its valuation parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bidder {
    /// The bidder identifier, unique within a population
    pub id: BidderId,
    /// Archetype-specific valuation parameters
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub archetype: Archetype,
}

/// Parameters shared by every archetype valuing regional capacity.
///
/// The value of a region `r` is `ω_r = α · β · population_r · quality(c_r − β)`,
/// where `c_r` is the share of the maximum regional capacity the bidder holds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionalValue {
    /// Value per unit of population and target share
    pub alpha: f64,
    /// Target share of the regional capacity, in (0, 1]
    pub beta: f64,
    /// Quality score as a function of `c_r − β`; must cover `[−β, 1 − β]`
    pub quality: PiecewiseLinearFunction,
}

impl RegionalValue {
    /// `α · β · population`, the factor in front of the quality score
    pub fn coefficient(&self, population: f64) -> f64 {
        self.alpha * self.beta * population
    }
}

/// How tiers are credited to items in a complementarity valuation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum MarkupRule {
    /// Held items are ranked by descending base value (ties by id) and the
    /// item at rank τ is credited with markup `m(τ)`.
    #[default]
    Ranked,
    /// Every held item is credited with `m(|bundle|)`.
    Uniform,
}

/// The complementarity markup `m(τ) = 1 + (τ − 1) · step`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Markup {
    /// The crediting rule
    pub rule: MarkupRule,
    /// Increment per tier
    pub step: f64,
}

impl Default for Markup {
    fn default() -> Self {
        Self {
            rule: MarkupRule::default(),
            step: 0.2,
        }
    }
}

impl Markup {
    /// The markup factor of tier `tier` (1-based)
    pub fn factor(&self, tier: u32) -> f64 {
        1.0 + (tier.max(1) - 1) as f64 * self.step
    }
}

/// The bidder archetypes. Each has its own valuation shape and formulation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "archetype", rename_all = "snake_case")
)]
pub enum Archetype {
    /// Values only a fixed set of regions, each at full weight
    Local {
        /// Regional value parameters
        value: RegionalValue,
        /// The regions this bidder cares about
        regions_of_interest: Vec<RegionId>,
    },
    /// Values every region, discounted by the hop distance from its home region
    Regional {
        /// Regional value parameters
        value: RegionalValue,
        /// The home region
        home: RegionId,
        /// Discount by distance; distances beyond the table are worth nothing
        distance_discounts: Vec<f64>,
    },
    /// Values every region, discounted by the number of regions left uncovered
    Global {
        /// Regional value parameters
        value: RegionalValue,
        /// Discount as a function of the uncovered-region count, domain `[0, k_max]`
        coverage: PiecewiseLinearFunction,
    },
    /// A global bidder additionally subject to paired-band aggregation limits
    National {
        /// Regional value parameters
        value: RegionalValue,
        /// Discount as a function of the uncovered-region count, domain `[0, k_max]`
        coverage: PiecewiseLinearFunction,
    },
    /// Values single-unit items with a complementarity markup
    Items {
        /// Base value per item; items not listed are worth nothing
        base_values: Map<ItemId, f64>,
        /// The markup applied on bundles
        #[cfg_attr(feature = "serde", serde(default))]
        markup: Markup,
    },
}

impl Archetype {
    /// A short name of the archetype, for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Local { .. } => "local",
            Archetype::Regional { .. } => "regional",
            Archetype::Global { .. } => "global",
            Archetype::National { .. } => "national",
            Archetype::Items { .. } => "items",
        }
    }

    /// The regional value parameters, for the archetypes that have them
    pub fn regional_value(&self) -> Option<&RegionalValue> {
        match self {
            Archetype::Local { value, .. }
            | Archetype::Regional { value, .. }
            | Archetype::Global { value, .. }
            | Archetype::National { value, .. } => Some(value),
            Archetype::Items { .. } => None,
        }
    }

    /// Whether the paired-band aggregation indicators apply
    pub fn is_national(&self) -> bool {
        matches!(self, Archetype::National { .. })
    }
}
