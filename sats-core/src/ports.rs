mod solver;

pub use solver::{MipSolver, SolverOutput};
