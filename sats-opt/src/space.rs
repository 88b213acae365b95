use crate::{FormulationError, PartialMip};
use sats_core::models::{
    BidderId, Category, CategoryId, Constraint, LinearExpr, Map, Mip, VarId, Variable,
};

/// The shared decision variables: `x_{i,c}`, how much of category `c` bidder
/// `i` receives, and `v_i`, the (scaled) value bidder `i` derives from it.
///
/// Every bidder formulation refers to these variables; the space itself owns
/// the supply constraints and the objective `max Σ_i v_i`.
#[derive(Debug)]
pub struct AllocationVariableSpace {
    bidders: Vec<BidderId>,
    value_bounds: Vec<f64>,
    categories: Vec<Category>,
    bidder_index: Map<BidderId, usize>,
    category_index: Map<CategoryId, usize>,
    // bidder-major: allocation[i * categories.len() + c]
    allocation: Vec<VarId>,
    values: Vec<VarId>,
}

impl AllocationVariableSpace {
    /// Prepares the space for `bidders`, each paired with the upper bound of
    /// its (scaled) value variable.
    pub fn new(
        bidders: impl IntoIterator<Item = (BidderId, f64)>,
        categories: Vec<Category>,
    ) -> Result<Self, FormulationError> {
        let mut bidder_index = Map::default();
        let mut ids = Vec::new();
        let mut value_bounds = Vec::new();
        for (id, bound) in bidders {
            if bidder_index.insert(id, ids.len()).is_some() {
                return Err(FormulationError::DuplicateBidder(id));
            }
            ids.push(id);
            value_bounds.push(bound);
        }
        let category_index = categories
            .iter()
            .enumerate()
            .map(|(idx, category)| (category.id.clone(), idx))
            .collect();

        Ok(Self {
            bidders: ids,
            value_bounds,
            categories,
            bidder_index,
            category_index,
            allocation: Vec::new(),
            values: Vec::new(),
        })
    }

    /// The bidders, in population order
    pub fn bidders(&self) -> &[BidderId] {
        &self.bidders
    }

    /// The categories, in world order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    fn ensure_appended(&self) -> Result<(), FormulationError> {
        if self.values.len() == self.bidders.len() && !self.bidders.is_empty() {
            Ok(())
        } else {
            Err(FormulationError::NotAppended("allocation space".to_owned()))
        }
    }

    fn bidder_position(&self, bidder: BidderId) -> Result<usize, FormulationError> {
        self.bidder_index
            .get(&bidder)
            .copied()
            .ok_or(FormulationError::UnknownBidder(bidder))
    }

    /// The variable `x_{i,c}`
    pub fn allocation_variable(
        &self,
        bidder: BidderId,
        category: &CategoryId,
    ) -> Result<VarId, FormulationError> {
        self.ensure_appended()?;
        let i = self.bidder_position(bidder)?;
        let c = self.category_index.get(category).copied().ok_or_else(|| {
            FormulationError::UnknownAllocation {
                bidder,
                category: category.clone(),
            }
        })?;
        Ok(self.allocation[i * self.categories.len() + c])
    }

    /// The variable `v_i`
    pub fn value_variable(&self, bidder: BidderId) -> Result<VarId, FormulationError> {
        self.ensure_appended()?;
        Ok(self.values[self.bidder_position(bidder)?])
    }

    /// `Σ_i x_{i,c} ≤ capacity_c` for every category
    pub fn supply_constraints(&self) -> Result<Vec<Constraint>, FormulationError> {
        self.ensure_appended()?;
        let stride = self.categories.len();
        Ok(self
            .categories
            .iter()
            .enumerate()
            .map(|(c, category)| {
                let expr = (0..self.bidders.len())
                    .map(|i| (1.0, self.allocation[i * stride + c]))
                    .collect();
                Constraint::leq(expr, category.capacity as f64)
            })
            .collect())
    }

    /// `Σ_i v_i`
    pub fn objective(&self) -> Result<LinearExpr, FormulationError> {
        self.ensure_appended()?;
        Ok(self.values.iter().map(|&v| (1.0, v)).collect())
    }

    /// Sets the model objective to `Σ_i v_i`
    pub fn append_objective(&self, mip: &mut Mip) -> Result<(), FormulationError> {
        for (var, coefficient) in self.objective()?.terms() {
            mip.add_objective_term(coefficient, var)?;
        }
        Ok(())
    }
}

impl PartialMip for AllocationVariableSpace {
    fn append_variables(&mut self, mip: &mut Mip) -> Result<(), FormulationError> {
        let mut allocation = Vec::with_capacity(self.bidders.len() * self.categories.len());
        let mut values = Vec::with_capacity(self.bidders.len());

        for (bidder, &bound) in self.bidders.iter().zip(self.value_bounds.iter()) {
            for category in self.categories.iter() {
                let name = format!("x_{bidder}_{}", category.id.var_suffix());
                let variable = if category.capacity == 1 {
                    Variable::boolean(name)
                } else {
                    Variable::integer(name, 0.0, category.capacity as f64)
                };
                allocation.push(mip.add_variable(variable)?);
            }
            values.push(mip.add_variable(Variable::continuous(
                format!("v_{bidder}"),
                0.0,
                bound,
            ))?);
        }

        self.allocation = allocation;
        self.values = values;
        Ok(())
    }

    fn append_constraints(&self, mip: &mut Mip) -> Result<(), FormulationError> {
        for constraint in self.supply_constraints()? {
            mip.add_constraint(constraint)?;
        }
        Ok(())
    }
}
