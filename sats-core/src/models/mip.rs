use super::Map;
use std::fmt;

/// Handle to a variable registered in a [`Mip`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    /// Position of the variable in registration order
    pub fn index(self) -> usize {
        self.0
    }
}

/// The domain of a decision variable
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum VarType {
    /// Integral, within `[0, 1]`
    Boolean,
    /// Integral, within its bounds
    Integer,
    /// Real-valued, within its bounds
    Continuous,
}

/// A named decision variable with bounds
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    /// Unique name within the model
    pub name: String,
    /// Domain
    pub var_type: VarType,
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
}

impl Variable {
    /// A 0/1 variable
    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            var_type: VarType::Boolean,
            lower: 0.0,
            upper: 1.0,
        }
    }

    /// An integer variable in `[lower, upper]`
    pub fn integer(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            var_type: VarType::Integer,
            lower,
            upper,
        }
    }

    /// A continuous variable in `[lower, upper]`
    pub fn continuous(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            var_type: VarType::Continuous,
            lower,
            upper,
        }
    }

    /// Whether the variable must take integral values
    pub fn is_integral(&self) -> bool {
        !matches!(self.var_type, VarType::Continuous)
    }
}

/// A sparse linear combination of variables
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearExpr(Map<VarId, f64>);

impl LinearExpr {
    /// The empty expression
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`LinearExpr::add_term`]
    pub fn with_term(mut self, coefficient: f64, var: VarId) -> Self {
        self.add_term(coefficient, var);
        self
    }

    /// Adds `coefficient · var`, merging with an existing term for `var`
    pub fn add_term(&mut self, coefficient: f64, var: VarId) {
        *self.0.entry(var).or_insert(0.0) += coefficient;
    }

    /// Iterate the `(var, coefficient)` pairs in insertion order
    pub fn terms(&self) -> impl Iterator<Item = (VarId, f64)> + '_ {
        self.0.iter().map(|(&var, &coefficient)| (var, coefficient))
    }

    /// The coefficient of `var` (zero if absent)
    pub fn coefficient(&self, var: VarId) -> f64 {
        self.0.get(&var).copied().unwrap_or(0.0)
    }

    /// Number of terms
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no terms
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Evaluate the expression under an assignment
    pub fn evaluate(&self, value: impl Fn(VarId) -> f64) -> f64 {
        self.terms().map(|(var, coef)| coef * value(var)).sum()
    }
}

impl FromIterator<(f64, VarId)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (f64, VarId)>>(iter: I) -> Self {
        let mut expr = Self::new();
        expr.extend(iter);
        expr
    }
}

impl Extend<(f64, VarId)> for LinearExpr {
    fn extend<I: IntoIterator<Item = (f64, VarId)>>(&mut self, iter: I) {
        for (coefficient, var) in iter {
            self.add_term(coefficient, var);
        }
    }
}

/// The sense of a linear constraint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    /// `expr ≤ rhs`
    Le,
    /// `expr = rhs`
    Eq,
    /// `expr ≥ rhs`
    Ge,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparison::Le => "<=",
            Comparison::Eq => "=",
            Comparison::Ge => ">=",
        })
    }
}

/// A linear constraint `expr (≤|=|≥) rhs`
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    /// Left-hand side
    pub expr: LinearExpr,
    /// Sense
    pub comparison: Comparison,
    /// Right-hand side constant
    pub rhs: f64,
}

impl Constraint {
    /// `expr ≤ rhs`
    pub fn leq(expr: LinearExpr, rhs: f64) -> Self {
        Self {
            expr,
            comparison: Comparison::Le,
            rhs,
        }
    }

    /// `expr = rhs`
    pub fn eq(expr: LinearExpr, rhs: f64) -> Self {
        Self {
            expr,
            comparison: Comparison::Eq,
            rhs,
        }
    }

    /// `expr ≥ rhs`
    pub fn geq(expr: LinearExpr, rhs: f64) -> Self {
        Self {
            expr,
            comparison: Comparison::Ge,
            rhs,
        }
    }

    /// Whether the constraint holds under an assignment, up to `tolerance`
    pub fn is_satisfied(&self, value: impl Fn(VarId) -> f64, tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(value);
        match self.comparison {
            Comparison::Le => lhs <= self.rhs + tolerance,
            Comparison::Eq => (lhs - self.rhs).abs() <= tolerance,
            Comparison::Ge => lhs >= self.rhs - tolerance,
        }
    }
}

/// Errors raised while building a [`Mip`]
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum MipError {
    /// A variable with the same name is already registered
    #[error("variable `{0}` is already registered")]
    DuplicateVariable(String),
    /// An expression references a variable this model never handed out
    #[error("variable #{0} does not belong to this model")]
    ForeignVariable(usize),
}

/// A mixed-integer maximization problem, solver-agnostic.
///
/// Variables live in an arena and are referenced by [`VarId`]; their names
/// are unique and are how solver assignments are reported back.
#[derive(Clone, Debug, Default)]
pub struct Mip {
    variables: Vec<Variable>,
    index: Map<String, VarId>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
}

impl Mip {
    /// An empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a variable, failing if the name is already taken
    pub fn add_variable(&mut self, variable: Variable) -> Result<VarId, MipError> {
        if self.index.contains_key(&variable.name) {
            return Err(MipError::DuplicateVariable(variable.name));
        }
        let id = VarId(self.variables.len());
        self.index.insert(variable.name.clone(), id);
        self.variables.push(variable);
        Ok(id)
    }

    /// Adds a constraint over previously registered variables
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), MipError> {
        self.check(&constraint.expr)?;
        self.constraints.push(constraint);
        Ok(())
    }

    /// Adds `coefficient · var` to the maximization objective
    pub fn add_objective_term(&mut self, coefficient: f64, var: VarId) -> Result<(), MipError> {
        if var.0 >= self.variables.len() {
            return Err(MipError::ForeignVariable(var.0));
        }
        self.objective.add_term(coefficient, var);
        Ok(())
    }

    fn check(&self, expr: &LinearExpr) -> Result<(), MipError> {
        match expr.terms().find(|(var, _)| var.0 >= self.variables.len()) {
            Some((var, _)) => Err(MipError::ForeignVariable(var.0)),
            None => Ok(()),
        }
    }

    /// The variable behind a handle
    pub fn variable(&self, id: VarId) -> Result<&Variable, MipError> {
        self.variables
            .get(id.0)
            .ok_or(MipError::ForeignVariable(id.0))
    }

    /// Look up a handle by variable name
    pub fn variable_id(&self, name: &str) -> Option<VarId> {
        self.index.get(name).copied()
    }

    /// All variables in registration order
    pub fn variables(&self) -> impl ExactSizeIterator<Item = (VarId, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(idx, variable)| (VarId(idx), variable))
    }

    /// All constraints in insertion order
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The maximization objective
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Number of variables
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of integral (boolean or integer) variables
    pub fn num_integral(&self) -> usize {
        self.variables.iter().filter(|v| v.is_integral()).count()
    }

    /// Number of constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}
