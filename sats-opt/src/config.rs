use sats_core::models::BandId;

/// Largest value the solver is trusted with, minus a safety margin
const DEFAULT_SAFE_CEILING: f64 = 536_870_910.0 - 1_000_000.0;

/// How piecewise-linear functions are encoded
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Linearization {
    /// Plain convex combination for affine functions, segment selectors otherwise
    #[default]
    Auto,
    /// Always the plain convex combination of breakpoints
    ConvexCombination,
    /// Always restrict the combination to two adjacent breakpoints
    Adjacent,
}

/// Paired-band aggregation limits, as imposed on multi-band spectrum auctions
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregationLimit {
    /// The low paired band
    pub low: BandId,
    /// The high paired band
    pub high: BandId,
    /// Combined limit on both bands, per bidder and region
    #[cfg_attr(feature = "serde", serde(default = "default_pair_limit"))]
    pub pair_limit: u32,
    /// Limit on the high band for national bidders
    #[cfg_attr(feature = "serde", serde(default = "default_high_limit"))]
    pub high_limit: u32,
}

fn default_pair_limit() -> u32 {
    2
}

fn default_high_limit() -> u32 {
    1
}

impl AggregationLimit {
    /// Limits over the given bands, with the default caps
    pub fn new(low: impl Into<BandId>, high: impl Into<BandId>) -> Self {
        Self {
            low: low.into(),
            high: high.into(),
            pair_limit: default_pair_limit(),
            high_limit: default_high_limit(),
        }
    }
}

/// Knobs of the model assembly. Every field has a sensible default.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FormulationConfig {
    /// Values above this magnitude trigger scaling
    pub safe_ceiling: f64,
    /// Use this scaling factor instead of deriving one
    pub scaling_override: Option<f64>,
    /// Encoding of piecewise-linear functions
    pub linearization: Linearization,
    /// Whether items with a zero base value may be assigned
    pub allow_zero_value_items: bool,
    /// Optional paired-band limits
    pub aggregation_limit: Option<AggregationLimit>,
    /// Log the raw solver assignment at debug level
    pub log_solver_output: bool,
}

impl Default for FormulationConfig {
    fn default() -> Self {
        Self {
            safe_ceiling: DEFAULT_SAFE_CEILING,
            scaling_override: None,
            linearization: Linearization::default(),
            allow_zero_value_items: true,
            aggregation_limit: None,
            log_solver_output: false,
        }
    }
}
