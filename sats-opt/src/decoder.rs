use crate::{AllocationVariableSpace, DecodeError, FormulationError};
use sats_core::models::{AllocationResult, BidderAllocation, Map, Mip, Quantities, VarId};
use sats_core::ports::SolverOutput;

/// Reads a solver assignment back into an unscaled [`AllocationResult`].
#[derive(Debug, Clone, Copy)]
pub struct AllocationDecoder<'a> {
    mip: &'a Mip,
    space: &'a AllocationVariableSpace,
    scaling_factor: f64,
}

impl<'a> AllocationDecoder<'a> {
    /// A decoder for a model built over `space` with the given scaling
    pub fn new(mip: &'a Mip, space: &'a AllocationVariableSpace, scaling_factor: f64) -> Self {
        Self {
            mip,
            space,
            scaling_factor,
        }
    }

    /// Decode an assignment.
    ///
    /// Every model variable must have a finite value. Quantities are rounded
    /// to the nearest integer; values and the objective are multiplied by the
    /// scaling factor.
    pub fn decode(&self, output: &SolverOutput) -> Result<AllocationResult, DecodeError> {
        let mut assignment = Vec::with_capacity(self.mip.num_variables());
        for (_, variable) in self.mip.variables() {
            let value = output
                .value(&variable.name)
                .ok_or_else(|| DecodeError::MissingVariable(variable.name.clone()))?;
            if !value.is_finite() {
                return Err(DecodeError::NonFinite(variable.name.clone()));
            }
            assignment.push(value);
        }
        let value_of = |var: VarId| assignment[var.index()];

        let mut bidders = Map::default();
        let mut total_value = 0.0;
        for &bidder in self.space.bidders() {
            let quantities = self
                .space
                .categories()
                .iter()
                .map(|category| {
                    let var = self.space.allocation_variable(bidder, &category.id)?;
                    Ok((category.id.clone(), value_of(var).round().max(0.0) as u32))
                })
                .collect::<Result<Quantities, FormulationError>>()?;
            let var = self.space.value_variable(bidder)?;
            let value = value_of(var) * self.scaling_factor;

            total_value += value;
            bidders.insert(bidder, BidderAllocation { quantities, value });
        }

        tracing::debug!(total_value, "decoded allocation");
        Ok(AllocationResult {
            bidders,
            total_value,
            objective: output.objective * self.scaling_factor,
            scaling_factor: self.scaling_factor,
        })
    }
}
