use crate::{
    format,
    ops::{Context, EvaluationError},
    EvalError, Expression, ParseError,
};
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Where Newton's method starts looking.
pub const INITIAL_GUESS: f64 = 1.0;
pub const MAX_ITERATIONS: usize = 100;
/// Stop once a step moves `x` by less than this.
pub const TOLERANCE: f64 = 1e-7;
/// The step used when estimating the derivative with a forward difference.
pub const STEP: f64 = 1e-5;
/// Derivatives smaller than this are treated as a stationary point.
const FLAT: f64 = 1e-10;

/// Find a value of `x` which makes the expression zero. Equations
/// (`lhs = rhs`) are solved as `lhs - rhs = 0`.
///
/// Text without a variable has nothing to solve for, so it is simply
/// evaluated.
pub fn solve<C>(src: &str, ctx: &C) -> Result<Solution, SolveError>
where
    C: Context,
{
    let expr: Expression = src.parse()?;

    if expr.has_variable() {
        find_root(&expr, ctx).map(Solution::Root)
    } else {
        let value = expr.evaluate(|_| None, ctx)?;
        Ok(Solution::Value(value))
    }
}

/// Solve `f(x) = 0` using Newton-Raphson with a numerically estimated
/// derivative.
///
/// ```text
/// f'(x) ≈ (f(x + h) - f(x)) / h
/// x_next = x - f(x) / f'(x)
/// ```
///
/// When the derivative is (nearly) flat we can't take a Newton step, so `x`
/// is nudged along by one instead. The returned root is rounded to 9
/// decimal places.
pub fn find_root<C>(expr: &Expression, ctx: &C) -> Result<f64, SolveError>
where
    C: Context,
{
    let mut x = INITIAL_GUESS;

    for iteration in 0..MAX_ITERATIONS {
        let f_of_x = expr.evaluate_at(x, ctx)?;
        let f_of_x_plus_h = expr.evaluate_at(x + STEP, ctx)?;
        let derivative = (f_of_x_plus_h - f_of_x) / STEP;

        if derivative.abs() < FLAT {
            log::debug!(
                "Stationary point at x = {} on iteration {}, moving on",
                x,
                iteration
            );
            x += 1.0;
            continue;
        }

        let x_next = x - f_of_x / derivative;
        log::debug!(
            "Iteration {}: x = {}, f(x) = {}, f'(x) = {}, next = {}",
            iteration,
            x,
            f_of_x,
            derivative,
            x_next
        );

        if (x_next - x).abs() < TOLERANCE {
            log::debug!("Converged to {} after {} iterations", x_next, iteration + 1);
            return Ok(round_to_9_places(x_next));
        }

        x = x_next;
    }

    log::debug!("Gave up after {} iterations, last x = {}", MAX_ITERATIONS, x);
    Err(SolveError::NoSolutionFound)
}

fn round_to_9_places(x: f64) -> f64 {
    // adding zero turns -0 into 0
    (x * 1e9).round() / 1e9 + 0.0
}

/// The result of [`solve()`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Solution {
    /// A value of `x` which satisfies the equation.
    Root(f64),
    /// The input had no variable, this is its value.
    Value(f64),
}

impl Solution {
    pub fn value(&self) -> f64 {
        match *self {
            Solution::Root(value) | Solution::Value(value) => value,
        }
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Solution::Root(x) => write!(f, "x = {}", x),
            Solution::Value(value) => write!(f, "{}", format::number(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    Parse(ParseError),
    /// Evaluating the expression failed part way through solving.
    Eval(EvaluationError),
    /// Newton's method didn't converge within [`MAX_ITERATIONS`].
    NoSolutionFound,
}

impl From<ParseError> for SolveError {
    fn from(e: ParseError) -> Self { SolveError::Parse(e) }
}

impl From<EvaluationError> for SolveError {
    fn from(e: EvaluationError) -> Self { SolveError::Eval(e) }
}

impl From<EvalError> for SolveError {
    fn from(e: EvalError) -> Self {
        match e {
            EvalError::Parse(inner) => SolveError::Parse(inner),
            EvalError::Eval(inner) => SolveError::Eval(inner),
        }
    }
}

impl Display for SolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Parse(inner) => write!(f, "{}", inner),
            SolveError::Eval(inner) => write!(f, "Solver error: {}", inner),
            SolveError::NoSolutionFound => write!(f, "No solution found"),
        }
    }
}

impl Error for SolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SolveError::Parse(inner) => Some(inner),
            SolveError::Eval(inner) => Some(inner),
            SolveError::NoSolutionFound => None,
        }
    }
}
