//! The expression engine behind a scientific calculator.
//!
//! Text goes through a small pipeline:
//!
//! 1. [`tokenize()`] splits it into [`Token`]s
//! 2. [`to_postfix()`] rearranges those into postfix order using the
//!    shunting-yard algorithm
//! 3. [`ops::evaluate()`] reduces the postfix sequence on a value stack
//!
//! and [`solve()`] drives the evaluator repeatedly to find a root when the
//! expression contains the variable `x`.
//!
//! Trigonometric functions depend on the calculator's angle and inverse
//! modes. Rather than being global state, these live in [`Builtins`] and are
//! passed into every call.
//!
//! ```rust
//! use scicalc::{AngleMode, Builtins};
//!
//! let ctx = Builtins::default();
//! assert_eq!(scicalc::evaluate("2 + 3*4", &ctx).unwrap(), 14.0);
//! assert_eq!(scicalc::evaluate("nCr(5, 2)", &ctx).unwrap(), 10.0);
//!
//! let radians = ctx.with_angle_mode(AngleMode::Radians);
//! assert_eq!(scicalc::evaluate("cos(0)", &radians).unwrap(), 1.0);
//!
//! let solution = scicalc::solve("2*x = 10", &ctx).unwrap();
//! assert_eq!(solution.to_string(), "x = 5");
//! ```

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod builtins;
mod expr;
pub mod format;
pub mod ops;
mod parse;
pub mod sample;
mod solve;
mod tokens;

pub use builtins::{
    combinations, factorial, permutations, AngleMode, Builtins, NEAR_ZERO,
};
pub use expr::{EvalError, Expression};
pub use ops::{Context, EvaluationError};
pub use parse::{to_postfix, ParseError};
pub use solve::{
    find_root, solve, Solution, SolveError, INITIAL_GUESS, MAX_ITERATIONS,
    STEP, TOLERANCE,
};
pub use tokens::{tokenize, Function, Operator, Token, VARIABLE};

/// Calculate the value of an expression which doesn't use any variables.
pub fn evaluate<C>(src: &str, ctx: &C) -> Result<f64, EvalError>
where
    C: Context,
{
    evaluate_with(src, |_| None, ctx)
}

/// Calculate the value of an expression, using `lookup_variable` to resolve
/// any variables it mentions.
pub fn evaluate_with<F, C>(
    src: &str,
    lookup_variable: F,
    ctx: &C,
) -> Result<f64, EvalError>
where
    F: Fn(&str) -> Option<f64>,
    C: Context,
{
    let expr: Expression = src.parse()?;
    let value = expr.evaluate(lookup_variable, ctx)?;

    Ok(value)
}
