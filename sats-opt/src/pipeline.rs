use crate::{AllocationDecoder, AllocationError, FormulationConfig, ModelAssembler};
use sats_core::models::{AllocationResult, Bidder, World};
use sats_core::ports::MipSolver;
use tracing::{Level, event};

/// Find the value-maximizing allocation of `world` among `bidders`.
///
/// Assembles the model, hands it to `solver` once and decodes the optimal
/// assignment. Failures of any stage are returned as-is, without retries.
pub fn allocate<S: MipSolver>(
    world: &World,
    bidders: &[Bidder],
    solver: &S,
    config: &FormulationConfig,
) -> Result<AllocationResult, AllocationError<S::Error>> {
    let model = ModelAssembler::new(world, bidders, config).assemble()?;

    event!(Level::DEBUG, "invoking solver");
    let output = solver.solve(&model.mip).map_err(AllocationError::Solve)?;
    if config.log_solver_output {
        event!(Level::DEBUG, objective = output.objective, values = ?output.values, "raw solver output");
    }

    let result =
        AllocationDecoder::new(&model.mip, &model.space, model.scaling_factor).decode(&output)?;
    event!(
        Level::INFO,
        total_value = result.total_value,
        objective = result.objective,
        "allocation found"
    );
    Ok(result)
}
