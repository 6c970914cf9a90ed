//! The builtin functions and the settings which change how they behave.

use crate::{
    ops::{Context, EvaluationError},
    tokens::Function,
};
use euclid::approxeq::ApproxEq;

/// Anything closer to zero than this is treated as zero when it would
/// otherwise be used as a divisor.
pub const NEAR_ZERO: f64 = 1e-10;

/// Past this point `n!` no longer fits in an `f64`.
const LARGEST_FINITE_FACTORIAL: f64 = 170.0;

/// How trigonometric functions interpret (and report) angles.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AngleMode {
    Degrees,
    Radians,
}

impl AngleMode {
    fn to_radians(self, angle: f64) -> f64 {
        match self {
            AngleMode::Degrees => angle.to_radians(),
            AngleMode::Radians => angle,
        }
    }

    fn from_radians(self, angle: f64) -> f64 {
        match self {
            AngleMode::Degrees => angle.to_degrees(),
            AngleMode::Radians => angle,
        }
    }
}

impl Default for AngleMode {
    fn default() -> Self { AngleMode::Degrees }
}

/// The set of builtin functions, configured with the calculator's angle
/// and inverse modes.
///
/// When `inverse` is set, `sin`, `cos`, `tan`, `sec`, `cosec` and `cot`
/// evaluate their arc-function instead.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Builtins {
    pub angle_mode: AngleMode,
    pub inverse: bool,
}

impl Builtins {
    pub fn new(angle_mode: AngleMode, inverse: bool) -> Self {
        Builtins {
            angle_mode,
            inverse,
        }
    }

    pub fn with_angle_mode(self, angle_mode: AngleMode) -> Self {
        Builtins { angle_mode, ..self }
    }

    pub fn inverted(self, inverse: bool) -> Self {
        Builtins { inverse, ..self }
    }

    fn trig(&self, function: Function, x: f64) -> Result<f64, EvaluationError> {
        let mode = self.angle_mode;
        let name = function.name();

        if self.inverse {
            let value = match function {
                Function::Sin => x.asin(),
                Function::Cos => x.acos(),
                Function::Tan => x.atan(),
                Function::Sec => reciprocal(x, name)?.acos(),
                Function::Cosec => reciprocal(x, name)?.asin(),
                Function::Cot => reciprocal(x, name)?.atan(),
                other => unreachable!("{} is not a trig function", other),
            };
            return Ok(mode.from_radians(value));
        }

        let angle = mode.to_radians(x);

        match function {
            Function::Sin => Ok(angle.sin()),
            Function::Cos => Ok(angle.cos()),
            Function::Tan => {
                let t = angle.tan();
                if t.is_finite() {
                    Ok(t)
                } else {
                    Err(EvaluationError::math(name))
                }
            },
            Function::Sec => reciprocal(angle.cos(), name),
            Function::Cosec => reciprocal(angle.sin(), name),
            Function::Cot => reciprocal(angle.tan(), name),
            other => unreachable!("{} is not a trig function", other),
        }
    }
}

impl Context for Builtins {
    fn evaluate_function(
        &self,
        function: Function,
        arguments: &[f64],
    ) -> Result<f64, EvaluationError> {
        let name = function.name();

        match (function, arguments) {
            (
                Function::Sin
                | Function::Cos
                | Function::Tan
                | Function::Sec
                | Function::Cosec
                | Function::Cot,
                &[x],
            ) => self.trig(function, x),
            (Function::Asin, &[x]) | (Function::Acos, &[x])
                if x < -1.0 || x > 1.0 =>
            {
                Err(EvaluationError::math(name))
            },
            (Function::Asin, &[x]) => Ok(self.angle_mode.from_radians(x.asin())),
            (Function::Acos, &[x]) => Ok(self.angle_mode.from_radians(x.acos())),
            (Function::Atan, &[x]) => Ok(self.angle_mode.from_radians(x.atan())),
            (Function::Log, &[x]) | (Function::Ln, &[x]) if x <= 0.0 => {
                Err(EvaluationError::math(name))
            },
            (Function::Log, &[x]) => Ok(x.log10()),
            (Function::Ln, &[x]) => Ok(x.ln()),
            (Function::Exp, &[x]) => Ok(x.exp()),
            (Function::Abs, &[x]) => Ok(x.abs()),
            (Function::Round, &[x]) => Ok(x.round()),
            (Function::Floor, &[x]) => Ok(x.floor()),
            (Function::Ceil, &[x]) => Ok(x.ceil()),
            (Function::NthRoot, &[n, _]) if n == 0.0 => {
                Err(EvaluationError::math(name))
            },
            (Function::NthRoot, &[n, x]) => Ok(x.powf(1.0 / n)),
            (Function::Mean, &[a, b]) => Ok((a + b) / 2.0),
            (Function::Stdev, &[a, b]) => Ok(two_value_deviation(a, b, 1.0)),
            (Function::StdevP, &[a, b]) => Ok(two_value_deviation(a, b, 2.0)),
            (Function::NPr, &[n, r]) => permutations(n, r),
            (Function::NCr, &[n, r]) => combinations(n, r),
            _ => Err(EvaluationError::MalformedExpression),
        }
    }

    fn factorial(&self, n: f64) -> Result<f64, EvaluationError> { factorial(n) }
}

/// `1/x`, unless `x` is close enough to zero that the answer would be
/// meaningless.
fn reciprocal(x: f64, operation: &'static str) -> Result<f64, EvaluationError> {
    if x.approx_eq_eps(&0.0, &NEAR_ZERO) {
        Err(EvaluationError::math(operation))
    } else {
        Ok(1.0 / x)
    }
}

/// The standard deviation of exactly two values, dividing the sum of squared
/// deviations by `denominator` (1 for a sample, 2 for a population).
fn two_value_deviation(a: f64, b: f64, denominator: f64) -> f64 {
    let mean = (a + b) / 2.0;
    let variance = ((a - mean).powi(2) + (b - mean).powi(2)) / denominator;
    variance.sqrt()
}

fn is_non_negative_integer(n: f64) -> bool { n >= 0.0 && n.fract() == 0.0 }

/// Calculate `n!` for a non-negative integer `n`.
pub fn factorial(n: f64) -> Result<f64, EvaluationError> {
    if !is_non_negative_integer(n) {
        return Err(EvaluationError::InvalidFactorial { value: n });
    }
    if n > LARGEST_FINITE_FACTORIAL {
        return Ok(std::f64::INFINITY);
    }

    Ok((2..=n as u32).map(f64::from).product())
}

fn check_combinatorics_domain(
    n: f64,
    r: f64,
    operation: &'static str,
) -> Result<(), EvaluationError> {
    if is_non_negative_integer(n) && is_non_negative_integer(r) && r <= n {
        Ok(())
    } else {
        Err(EvaluationError::math(operation))
    }
}

/// The number of ordered selections of `r` items from `n`, `n!/(n-r)!`.
pub fn permutations(n: f64, r: f64) -> Result<f64, EvaluationError> {
    check_combinatorics_domain(n, r, Function::NPr.name())?;

    // n * (n-1) * ... * (n-r+1), without computing either factorial. Every
    // factor after the first is at least 2, so an astronomically large `r`
    // overflows to infinity long before the counter gets anywhere near it.
    let first_factor = n - r + 1.0;
    let mut result: f64 = 1.0;
    let mut i: u64 = 0;
    while (i as f64) < r && result.is_finite() {
        result *= first_factor + i as f64;
        i += 1;
    }

    Ok(result)
}

/// The number of unordered selections of `r` items from `n`,
/// `n!/(r!(n-r)!)`.
pub fn combinations(n: f64, r: f64) -> Result<f64, EvaluationError> {
    check_combinatorics_domain(n, r, Function::NCr.name())?;

    // nCr == nC(n-r), so take the shorter product
    let r = r.min(n - r);
    let mut result: f64 = 1.0;
    let mut i: u64 = 1;
    // each step multiplies by (n-r+i)/i >= 2, so the loop hits infinity
    // within about a thousand steps no matter how big `r` is
    while i as f64 <= r && result.is_finite() {
        let i_f = i as f64;
        // every partial product is itself a binomial coefficient, so this
        // stays exact while the numbers fit in an f64
        result = result * (n - r + i_f) / i_f;
        i += 1;
    }

    Ok(result.round())
}
