use clap::ValueEnum;
use sats_core::models::{AllocationResult, Bidder, World};
use sats_opt::{FormulationConfig, allocate, microlp::MicrolpSolver};

// The solvers available to the `solve` subcommand
#[derive(Clone, Copy, ValueEnum)]
pub enum SolverLib {
    Microlp,
}

impl SolverLib {
    pub fn solve(
        &self,
        world: &World,
        bidders: &[Bidder],
        config: &FormulationConfig,
    ) -> anyhow::Result<AllocationResult> {
        let result = match self {
            SolverLib::Microlp => allocate(world, bidders, &MicrolpSolver, config)?,
        };
        Ok(result)
    }
}
