use good_lp::solvers::microlp::microlp;
use good_lp::{Expression, ProblemVariables, ResolutionError, Solution, SolverModel, variable};
use sats_core::models::{Comparison, LinearExpr, Map, Mip, VarType};
use sats_core::ports::{MipSolver, SolverOutput};
use tracing::{Level, event};

/// Solves models with the pure-Rust microlp branch-and-bound solver, through
/// the `good_lp` modelling layer.
///
/// Suitable for the small and medium instances used in tests and examples;
/// anything larger is better exported and handed to a commercial solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrolpSolver;

impl MicrolpSolver {
    /// A new solver handle
    pub fn new() -> Self {
        Self
    }
}

fn to_expression(expr: &LinearExpr, handles: &[good_lp::Variable]) -> Expression {
    let mut expression = Expression::default();
    for (var, coefficient) in expr.terms() {
        expression += coefficient * handles[var.index()];
    }
    expression
}

impl MipSolver for MicrolpSolver {
    type Error = ResolutionError;

    fn solve(&self, mip: &Mip) -> Result<SolverOutput, Self::Error> {
        let mut problem = ProblemVariables::new();
        let handles: Vec<good_lp::Variable> = mip
            .variables()
            .map(|(_, v)| {
                let definition = match v.var_type {
                    VarType::Boolean => variable().binary(),
                    VarType::Integer => variable().integer().min(v.lower).max(v.upper),
                    VarType::Continuous => variable().min(v.lower).max(v.upper),
                };
                problem.add(definition.name(v.name.clone()))
            })
            .collect();

        let objective = to_expression(mip.objective(), &handles);
        let mut model = problem.maximise(objective).using(microlp);
        for constraint in mip.constraints() {
            let lhs = to_expression(&constraint.expr, &handles);
            model.add_constraint(match constraint.comparison {
                Comparison::Le => lhs.leq(constraint.rhs),
                Comparison::Eq => lhs.eq(constraint.rhs),
                Comparison::Ge => lhs.geq(constraint.rhs),
            });
        }

        event!(
            Level::DEBUG,
            variables = handles.len(),
            constraints = mip.num_constraints(),
            "solving with microlp"
        );
        let solution = model.solve()?;

        let values: Map<String, f64> = mip
            .variables()
            .zip(handles.iter())
            .map(|((_, v), &handle)| (v.name.clone(), solution.value(handle)))
            .collect();
        let objective = mip
            .objective()
            .evaluate(|var| solution.value(handles[var.index()]));

        Ok(SolverOutput { values, objective })
    }
}
