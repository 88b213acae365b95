use super::{BidderId, CategoryId, Map, Quantities};

/// What a single bidder receives, and what it is worth to them
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BidderAllocation {
    /// Quantity per category, including zeros
    pub quantities: Quantities,
    /// The bidder's value, unscaled
    pub value: f64,
}

impl BidderAllocation {
    /// The categories with a non-zero quantity
    pub fn bundle(&self) -> impl Iterator<Item = (&CategoryId, u32)> + '_ {
        self.quantities
            .iter()
            .filter(|(_, quantity)| **quantity > 0)
            .map(|(category, &quantity)| (category, quantity))
    }

    /// The quantity held of a category
    pub fn quantity(&self, category: &CategoryId) -> u32 {
        self.quantities.get(category).copied().unwrap_or(0)
    }

    /// Whether nothing was allocated
    pub fn is_empty(&self) -> bool {
        self.bundle().next().is_none()
    }
}

/// A decoded, unscaled allocation
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocationResult {
    /// Per-bidder allocations, in population order
    pub bidders: Map<BidderId, BidderAllocation>,
    /// Sum of the bidder values
    pub total_value: f64,
    /// The solver's objective, unscaled
    pub objective: f64,
    /// The scaling factor the model was built with
    pub scaling_factor: f64,
}

impl AllocationResult {
    /// The allocation of one bidder
    pub fn bidder(&self, id: BidderId) -> Option<&BidderAllocation> {
        self.bidders.get(&id)
    }

    /// Total quantity of a category handed out across all bidders
    pub fn allocated(&self, category: &CategoryId) -> u32 {
        self.bidders
            .values()
            .map(|allocation| allocation.quantity(category))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemId;

    #[test]
    fn bundle_skips_zeros() {
        let a = CategoryId::Item(ItemId(0));
        let b = CategoryId::Item(ItemId(1));
        let allocation = BidderAllocation {
            quantities: Quantities::from_iter([(a.clone(), 0), (b.clone(), 1)]),
            value: 5.0,
        };
        assert_eq!(allocation.bundle().collect::<Vec<_>>(), vec![(&b, 1)]);
        assert!(!allocation.is_empty());

        let result = AllocationResult {
            bidders: Map::from_iter([(BidderId(0), allocation)]),
            total_value: 5.0,
            objective: 5.0,
            scaling_factor: 1.0,
        };
        assert_eq!(result.allocated(&b), 1);
        assert_eq!(result.allocated(&a), 0);
        assert!(result.bidder(BidderId(1)).is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["bidders"]["0"]["quantities"]["i1"], 1);
    }
}
