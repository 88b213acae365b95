use super::IOArgs;
use clap::Subcommand;

pub(crate) mod export;
mod solve;
pub use solve::SolverLib;

#[derive(Subcommand)]
pub enum Commands {
    /// Find the value-maximizing allocation and report it as JSON
    Solve {
        #[command(flatten)]
        io: IOArgs,

        /// Request a specific MIP solver
        #[arg(short, long, default_value = "microlp")]
        lib: SolverLib,
    },

    /// Assemble the allocation problem and write it in CPLEX LP format
    Export {
        #[command(flatten)]
        io: IOArgs,
    },
}
