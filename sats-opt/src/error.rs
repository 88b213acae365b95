use sats_core::models::{
    BandId, BidderId, CategoryId, ItemId, MipError, PwlError, RegionId, ValuationError,
};

/// Errors raised while building the model. These are all detected before a
/// solver is ever invoked.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum FormulationError {
    /// The population has no bidders
    #[error("the bidder population is empty")]
    EmptyPopulation,
    /// Two bidders share an id
    #[error("bidder {0} appears more than once in the population")]
    DuplicateBidder(BidderId),
    /// A bidder archetype that does not belong to the world kind
    #[error("bidder {bidder} is a {archetype} bidder, which does not fit a {world} world")]
    ArchetypeMismatch {
        /// The bidder
        bidder: BidderId,
        /// Its archetype
        archetype: &'static str,
        /// The world kind
        world: &'static str,
    },
    /// A required bidder parameter is absent
    #[error("bidder {bidder} is missing the `{parameter}` parameter")]
    MissingParameter {
        /// The bidder
        bidder: BidderId,
        /// The parameter name
        parameter: &'static str,
    },
    /// A bidder parameter is outside of its admissible range
    #[error("bidder {bidder} has an invalid `{parameter}`: {reason}")]
    InvalidParameter {
        /// The bidder
        bidder: BidderId,
        /// The parameter name
        parameter: &'static str,
        /// What is wrong with it
        reason: String,
    },
    /// The world itself cannot be formulated
    #[error("invalid world: {0}")]
    InvalidWorld(String),
    /// The world lists the same category twice
    #[error("category {0} appears more than once in the world")]
    DuplicateCategory(CategoryId),
    /// A referenced region is not part of the world
    #[error("region {0} is not part of the world")]
    UnknownRegion(RegionId),
    /// A referenced band is not part of the world
    #[error("band {0} is not part of the world")]
    UnknownBand(BandId),
    /// A referenced item is not part of the world
    #[error("item {0} is not part of the world")]
    UnknownItem(ItemId),
    /// A bidder id that is not part of the population
    #[error("bidder {0} is not part of the population")]
    UnknownBidder(BidderId),
    /// No allocation variable exists for this (bidder, category) pair
    #[error("no allocation variable for bidder {bidder} and category {category}")]
    UnknownAllocation {
        /// The bidder
        bidder: BidderId,
        /// The category
        category: CategoryId,
    },
    /// An input variable's bounds are not covered by the function to encode
    #[error(
        "`{variable}` ranges over [{lower}, {upper}], outside of the function domain [{domain_lower}, {domain_upper}]"
    )]
    Domain {
        /// The input variable
        variable: String,
        /// Its lower bound
        lower: f64,
        /// Its upper bound
        upper: f64,
        /// Lower end of the function domain
        domain_lower: f64,
        /// Upper end of the function domain
        domain_upper: f64,
    },
    /// A component's constraints were requested before its variables
    #[error("constraints of `{0}` requested before its variables were appended")]
    NotAppended(String),
    /// A configured scaling factor that is not a positive finite number
    #[error("scaling factor must be positive and finite, got {0}")]
    InvalidScaling(f64),
    /// An invalid piecewise-linear function
    #[error(transparent)]
    Function(#[from] PwlError),
    /// A model-building failure, such as a duplicate variable name
    #[error(transparent)]
    Model(#[from] MipError),
    /// The reference valuation could not be computed
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}

/// Errors raised while reading a solver assignment back
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The solver did not report a value for a model variable
    #[error("the solver assignment has no value for variable `{0}`")]
    MissingVariable(String),
    /// A value that is not a finite number
    #[error("the solver assigned a non-finite value to `{0}`")]
    NonFinite(String),
    /// The allocation space does not belong to the decoded model
    #[error("the allocation space does not match the model: {0}")]
    Space(#[from] FormulationError),
}

/// The allocation pipeline's error, one variant per stage.
///
/// The solve stage carries the adapter's own error verbatim.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError<E: std::error::Error + 'static> {
    /// The model could not be assembled
    #[error("configuration error: {0}")]
    Configuration(#[from] FormulationError),
    /// The solver failed
    #[error("solver failure: {0}")]
    Solve(#[source] E),
    /// The assignment could not be decoded
    #[error("decoding error: {0}")]
    Decode(#[from] DecodeError),
}
