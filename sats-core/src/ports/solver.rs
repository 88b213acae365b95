use crate::models::{Map, Mip};

/// The raw result of a solve: one value per variable name, plus the objective.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverOutput {
    /// Variable assignment, keyed by the variable names registered in the [`Mip`].
    pub values: Map<String, f64>,

    /// The (scaled) objective value reported by the solver.
    pub objective: f64,
}

impl SolverOutput {
    /// Look up the value assigned to a variable by name.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

/// Interface for mixed-integer solvers.
///
/// A solver receives a fully assembled maximization problem and either returns
/// an optimal assignment for every variable, or fails with its own error type.
/// Implementations must not mutate the model; failures are reported verbatim
/// to the caller of the allocation pipeline.
pub trait MipSolver {
    /// Error type for solver failures (infeasible, unbounded, timeouts, ...)
    type Error: std::error::Error + Send + Sync + 'static;

    /// Solve the problem to optimality.
    fn solve(&self, mip: &Mip) -> Result<SolverOutput, Self::Error>;
}
