use crate::{BOUND_TOLERANCE, FormulationError, Linearization, PartialMip};
use sats_core::models::{Constraint, LinearExpr, Mip, PiecewiseLinearFunction, VarId, Variable};

/// Encodes `output = f(input)` for a piecewise-linear `f` with auxiliary
/// variables and linear constraints (the lambda formulation).
///
/// One weight `λ_k ∈ [0, 1]` exists per breakpoint `(x_k, y_k)`, with
/// `Σλ = 1`, `input = Σ λ_k x_k` and `output = Σ λ_k y_k`. For non-affine
/// functions the weights are further restricted to two adjacent breakpoints
/// by binary segment selectors `z_s` with `Σz = 1`.
#[derive(Debug)]
pub struct PiecewiseLinearEncoder {
    function: PiecewiseLinearFunction,
    input: VarId,
    output: VarId,
    prefix: String,
    adjacent: bool,
    weights: Vec<VarId>,
    segments: Vec<VarId>,
}

impl PiecewiseLinearEncoder {
    /// Prepares an encoding of `output = function(input)`.
    ///
    /// Both variables must already be registered in `mip`. Fails if the
    /// bounds of `input` are not covered by the function's domain.
    pub fn new(
        function: PiecewiseLinearFunction,
        input: VarId,
        output: VarId,
        prefix: impl Into<String>,
        linearization: Linearization,
        mip: &Mip,
    ) -> Result<Self, FormulationError> {
        let variable = mip.variable(input)?;
        mip.variable(output)?;

        let (domain_lower, domain_upper) = function.domain();
        if variable.lower < domain_lower - BOUND_TOLERANCE
            || variable.upper > domain_upper + BOUND_TOLERANCE
        {
            return Err(FormulationError::Domain {
                variable: variable.name.clone(),
                lower: variable.lower,
                upper: variable.upper,
                domain_lower,
                domain_upper,
            });
        }

        // with two breakpoints any convex combination lies on the single segment
        let adjacent = function.len() > 2
            && match linearization {
                Linearization::Auto => !function.is_affine(BOUND_TOLERANCE),
                Linearization::ConvexCombination => false,
                Linearization::Adjacent => true,
            };

        Ok(Self {
            function,
            input,
            output,
            prefix: prefix.into(),
            adjacent,
            weights: Vec::new(),
            segments: Vec::new(),
        })
    }

    /// Whether segment selectors are used
    pub fn is_adjacent(&self) -> bool {
        self.adjacent
    }

    /// The breakpoint weights, once appended
    pub fn weights(&self) -> &[VarId] {
        &self.weights
    }

    /// The segment selectors, once appended (empty for the plain combination)
    pub fn segments(&self) -> &[VarId] {
        &self.segments
    }
}

impl PartialMip for PiecewiseLinearEncoder {
    fn append_variables(&mut self, mip: &mut Mip) -> Result<(), FormulationError> {
        let prefix = &self.prefix;
        self.weights = (0..self.function.len())
            .map(|k| mip.add_variable(Variable::continuous(format!("{prefix}l{k}"), 0.0, 1.0)))
            .collect::<Result<_, _>>()?;
        if self.adjacent {
            self.segments = (0..self.function.len() - 1)
                .map(|s| mip.add_variable(Variable::boolean(format!("{prefix}z{s}"))))
                .collect::<Result<_, _>>()?;
        }
        Ok(())
    }

    fn append_constraints(&self, mip: &mut Mip) -> Result<(), FormulationError> {
        if self.weights.is_empty() {
            return Err(FormulationError::NotAppended(self.prefix.clone()));
        }
        let points = self.function.points();

        let convexity = self.weights.iter().map(|&w| (1.0, w)).collect();
        mip.add_constraint(Constraint::eq(convexity, 1.0))?;

        let input = self
            .weights
            .iter()
            .zip(points)
            .map(|(&w, point)| (point.x, w))
            .collect::<LinearExpr>()
            .with_term(-1.0, self.input);
        mip.add_constraint(Constraint::eq(input, 0.0))?;

        let output = self
            .weights
            .iter()
            .zip(points)
            .map(|(&w, point)| (point.y, w))
            .collect::<LinearExpr>()
            .with_term(-1.0, self.output);
        mip.add_constraint(Constraint::eq(output, 0.0))?;

        if self.adjacent {
            let selection = self.segments.iter().map(|&z| (1.0, z)).collect();
            mip.add_constraint(Constraint::eq(selection, 1.0))?;

            // λ_k may only be positive if one of its adjacent segments is selected
            let last = self.weights.len() - 1;
            for (k, &weight) in self.weights.iter().enumerate() {
                let mut expr = LinearExpr::new().with_term(1.0, weight);
                if k > 0 {
                    expr.add_term(-1.0, self.segments[k - 1]);
                }
                if k < last {
                    expr.add_term(-1.0, self.segments[k]);
                }
                mip.add_constraint(Constraint::leq(expr, 0.0))?;
            }
        }

        tracing::trace!(
            prefix = %self.prefix,
            breakpoints = points.len(),
            adjacent = self.adjacent,
            "encoded piecewise-linear function"
        );
        Ok(())
    }
}
