use crate::FormulationError;
use sats_core::models::{
    Archetype, Bidder, BidderId, ItemId, Map, Markup, PiecewiseLinearFunction, RegionId,
    RegionalValue, World,
};
use serde::{Deserialize, Serialize};

/// The archetype tag of a raw bidder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeTag {
    /// see [`Archetype::Local`]
    Local,
    /// see [`Archetype::Regional`]
    Regional,
    /// see [`Archetype::Global`]
    Global,
    /// see [`Archetype::National`]
    National,
    /// see [`Archetype::Items`]
    Items,
}

/// A bidder as it arrives from an untrusted source: every parameter is
/// optional, and [`RawBidder::prepare`] checks that the ones its archetype
/// needs are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBidder {
    /// the bidder id
    pub id: BidderId,
    /// the archetype
    pub archetype: ArchetypeTag,
    /// regional value scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    /// target capacity share
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    /// quality of `c_r − β`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<PiecewiseLinearFunction>,
    /// local bidders only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions_of_interest: Option<Vec<RegionId>>,
    /// regional bidders only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<RegionId>,
    /// regional bidders only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_discounts: Option<Vec<f64>>,
    /// global and national bidders only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<PiecewiseLinearFunction>,
    /// items bidders only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_values: Option<Map<ItemId, f64>>,
    /// items bidders only; defaults to the ranked rule with step 0.2
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<Markup>,
}

impl RawBidder {
    /// Check for the parameters the archetype requires
    pub fn prepare(self) -> Result<Bidder, FormulationError> {
        let id = self.id;
        let missing = |parameter: &'static str| FormulationError::MissingParameter {
            bidder: id,
            parameter,
        };

        let (alpha, beta, quality) = (self.alpha, self.beta, self.quality);
        let value = move || -> Result<RegionalValue, FormulationError> {
            Ok(RegionalValue {
                alpha: alpha.ok_or_else(|| missing("alpha"))?,
                beta: beta.ok_or_else(|| missing("beta"))?,
                quality: quality.ok_or_else(|| missing("quality"))?,
            })
        };

        let archetype = match self.archetype {
            ArchetypeTag::Local => Archetype::Local {
                value: value()?,
                regions_of_interest: self
                    .regions_of_interest
                    .ok_or_else(|| missing("regions_of_interest"))?,
            },
            ArchetypeTag::Regional => Archetype::Regional {
                value: value()?,
                home: self.home.ok_or_else(|| missing("home"))?,
                distance_discounts: self
                    .distance_discounts
                    .ok_or_else(|| missing("distance_discounts"))?,
            },
            ArchetypeTag::Global => Archetype::Global {
                value: value()?,
                coverage: self.coverage.ok_or_else(|| missing("coverage"))?,
            },
            ArchetypeTag::National => Archetype::National {
                value: value()?,
                coverage: self.coverage.ok_or_else(|| missing("coverage"))?,
            },
            ArchetypeTag::Items => Archetype::Items {
                base_values: self.base_values.ok_or_else(|| missing("base_values"))?,
                markup: self.markup.unwrap_or_default(),
            },
        };

        Ok(Bidder { id, archetype })
    }
}

/// a representation of an auction instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// the supply side
    pub world: World,
    /// the bidder population
    pub bidders: Vec<RawBidder>,
}

impl Instance {
    /// Validate the raw bidders, in population order
    pub fn prepare(self) -> Result<(World, Vec<Bidder>), FormulationError> {
        let bidders = self
            .bidders
            .into_iter()
            .map(RawBidder::prepare)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((self.world, bidders))
    }
}
