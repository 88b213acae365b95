mod allocation;
pub use allocation::{AllocationResult, BidderAllocation};

mod bidder;
pub use bidder::{Archetype, Bidder, Markup, MarkupRule, RegionalValue};

mod id;
pub use id::{BandId, BidderId, ItemId, RegionId};

mod mip;
pub use mip::{Comparison, Constraint, LinearExpr, Mip, MipError, VarId, VarType, Variable};

mod pwl;
pub use pwl::{PiecewiseLinearFunction, PiecewiseLinearFunctionDto, Point, PwlError};

mod valuation;
pub use valuation::{Quantities, ValuationError, rank_items};

mod world;
pub use world::{
    Band, Category, CategoryId, CategoryIdError, ItemWorld, Region, RegionalWorld, World,
};

// Deterministic iteration order matters: variable registration order, and therefore
// the model handed to the solver, follows the order of these collections.
/// An insertion-ordered map with a fast, non-cryptographic hasher.
pub type Map<K, V> = indexmap::IndexMap<K, V, rustc_hash::FxBuildHasher>;

/// An insertion-ordered set with a fast, non-cryptographic hasher.
pub type Set<T> = indexmap::IndexSet<T, rustc_hash::FxBuildHasher>;
