/// A breakpoint of a piecewise-linear function
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// The input coordinate
    pub x: f64,
    /// The output coordinate
    pub y: f64,
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Slack allowed when testing whether an input lies within the domain.
const DOMAIN_TOLERANCE: f64 = 1e-9;

/// A piecewise-linear function of one variable.
///
/// The function is defined by at least two breakpoints with strictly
/// increasing, finite `x` coordinates, and interpolates linearly between
/// consecutive breakpoints. Outside of `[x_0, x_{n-1}]` it is undefined.
///
/// These functions describe capacity-by-quantity, quality-by-capacity-share
/// and discount-by-coverage curves.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "PiecewiseLinearFunctionDto", into = "PiecewiseLinearFunctionDto")
)]
pub struct PiecewiseLinearFunction(Vec<Point>);

impl PiecewiseLinearFunction {
    /// Creates a new function from its breakpoints, validating all constraints
    pub fn new(points: Vec<Point>) -> Result<Self, PwlError> {
        Self::try_from(PiecewiseLinearFunctionDto(points))
    }

    /// Convenience constructor from `(x, y)` pairs
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> Result<Self, PwlError> {
        Self::new(pairs.into_iter().map(Point::from).collect())
    }

    /// The breakpoints, in increasing order of `x`
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// The number of breakpoints (always at least two)
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `(x_0, x_{n-1})`
    pub fn domain(&self) -> (f64, f64) {
        (self.0[0].x, self.0[self.0.len() - 1].x)
    }

    /// Returns the smallest and largest breakpoint output.
    ///
    /// Since the function is linear between breakpoints, these are also the
    /// extreme values over the whole domain.
    pub fn range(&self) -> (f64, f64) {
        self.0
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            })
    }

    /// Evaluates the function, returning `None` outside of the domain
    pub fn evaluate(&self, x: f64) -> Option<f64> {
        let (lo, hi) = self.domain();
        if x.is_nan() || x < lo - DOMAIN_TOLERANCE || x > hi + DOMAIN_TOLERANCE {
            None
        } else {
            Some(self.interpolate(x.clamp(lo, hi)))
        }
    }

    /// Evaluates the function after clamping the input into the domain
    pub fn evaluate_clamped(&self, x: f64) -> f64 {
        let (lo, hi) = self.domain();
        self.interpolate(x.clamp(lo, hi))
    }

    fn interpolate(&self, x: f64) -> f64 {
        // index of the first breakpoint strictly right of x, so the segment is [idx-1, idx]
        let idx = self
            .0
            .partition_point(|p| p.x <= x)
            .clamp(1, self.0.len() - 1);
        let Point { x: x0, y: y0 } = self.0[idx - 1];
        let Point { x: x1, y: y1 } = self.0[idx];
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    /// Whether all segments share the same slope (up to a relative tolerance)
    pub fn is_affine(&self, tolerance: f64) -> bool {
        let mut slopes = self
            .0
            .windows(2)
            .map(|pair| (pair[1].y - pair[0].y) / (pair[1].x - pair[0].x));
        let Some(first) = slopes.next() else {
            return true;
        };
        slopes.all(|slope| (slope - first).abs() <= tolerance * first.abs().max(1.0))
    }
}

/// DTO to ensure that we always validate when we deserialize from an untrusted source
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[derive(Debug, Clone)]
pub struct PiecewiseLinearFunctionDto(pub Vec<Point>);

impl From<PiecewiseLinearFunction> for PiecewiseLinearFunctionDto {
    fn from(value: PiecewiseLinearFunction) -> Self {
        Self(value.0)
    }
}

impl TryFrom<PiecewiseLinearFunctionDto> for PiecewiseLinearFunction {
    type Error = PwlError;

    fn try_from(value: PiecewiseLinearFunctionDto) -> Result<Self, Self::Error> {
        let points = value.0;
        if points.len() < 2 {
            return Err(PwlError::TooFewPoints(points.len()));
        }

        for point in points.iter() {
            if point.x.is_nan() || point.y.is_nan() {
                return Err(PwlError::NaN);
            }
            if point.x.is_infinite() || point.y.is_infinite() {
                return Err(PwlError::Infinity);
            }
        }

        for pair in points.windows(2) {
            if pair[1].x == pair[0].x {
                return Err(PwlError::DuplicateBreakpoint(pair[0].x));
            }
            if pair[1].x < pair[0].x {
                return Err(PwlError::NonIncreasing);
            }
        }

        Ok(Self(points))
    }
}

/// Errors that can occur when creating or validating a piecewise-linear function
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PwlError {
    /// Error when any coordinate value is NaN
    #[error("NaN value encountered")]
    NaN,
    /// Error when a coordinate is infinite
    #[error("breakpoint coordinates cannot be infinite")]
    Infinity,
    /// Fewer than two breakpoints
    #[error("a piecewise-linear function needs at least two breakpoints, got {0}")]
    TooFewPoints(usize),
    /// Two breakpoints share the same `x`
    #[error("duplicate breakpoint at x = {0}")]
    DuplicateBreakpoint(f64),
    /// Breakpoints are out of order
    #[error("breakpoints are not ordered by ascending x")]
    NonIncreasing,
}
