//! Evaluating a postfix token sequence.

use crate::tokens::{Function, Operator, Token, VARIABLE};
use arrayvec::ArrayVec;
use smol_str::SmolStr;
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Contextual information used when evaluating an expression.
pub trait Context {
    /// Apply a builtin function. The `arguments` are in the order they were
    /// written, and there are always [`Function::arity()`] of them.
    fn evaluate_function(
        &self,
        function: Function,
        arguments: &[f64],
    ) -> Result<f64, EvaluationError>;

    /// Compute `n!`.
    fn factorial(&self, n: f64) -> Result<f64, EvaluationError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// The expression used a variable nobody gave us a value for.
    UndefinedVariable { name: SmolStr },
    /// An operation was applied outside its domain.
    MathError { operation: &'static str },
    /// Factorials are only defined for non-negative integers.
    InvalidFactorial { value: f64 },
    /// The postfix sequence didn't reduce to exactly one value.
    MalformedExpression,
}

impl EvaluationError {
    pub(crate) fn math(operation: &'static str) -> Self {
        EvaluationError::MathError { operation }
    }
}

impl Display for EvaluationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::UndefinedVariable { name } => {
                write!(f, "Variable '{}' is not defined", name)
            },
            EvaluationError::MathError { operation } => {
                write!(f, "Math error in '{}'", operation)
            },
            EvaluationError::InvalidFactorial { value } => {
                write!(f, "Invalid factorial: {}!", value)
            },
            EvaluationError::MalformedExpression => {
                write!(f, "Malformed expression")
            },
        }
    }
}

impl Error for EvaluationError {}

/// Reduce a postfix sequence to a single value.
///
/// The `lookup_variable` callback is used to resolve the free variable.
pub fn evaluate<F, C>(
    postfix: &[Token],
    lookup_variable: F,
    ctx: &C,
) -> Result<f64, EvaluationError>
where
    F: Fn(&str) -> Option<f64>,
    C: Context,
{
    let mut stack = Vec::with_capacity(postfix.len());

    for token in postfix {
        let value = match *token {
            Token::Number(value) => value,
            Token::Variable => lookup_variable(VARIABLE).ok_or_else(|| {
                EvaluationError::UndefinedVariable {
                    name: VARIABLE.into(),
                }
            })?,
            Token::Function(function) => {
                let arguments = pop_arguments(&mut stack, function.arity())?;
                let result = ctx.evaluate_function(function, &arguments)?;
                check_result(result, function.name(), &arguments)?
            },
            Token::Operator(op) if op.is_unary() => {
                let operand = pop(&mut stack)?;
                let result = apply_unary(op, operand, ctx)?;
                check_result(result, op.symbol(), &[operand])?
            },
            Token::Operator(op) => {
                let b = pop(&mut stack)?;
                let a = pop(&mut stack)?;
                let result = apply_binary(op, a, b)?;
                check_result(result, op.symbol(), &[a, b])?
            },
        };

        stack.push(value);
    }

    match stack.as_slice() {
        [value] => Ok(*value),
        _ => Err(EvaluationError::MalformedExpression),
    }
}

fn pop(stack: &mut Vec<f64>) -> Result<f64, EvaluationError> {
    stack.pop().ok_or(EvaluationError::MalformedExpression)
}

fn pop_arguments(
    stack: &mut Vec<f64>,
    arity: usize,
) -> Result<ArrayVec<[f64; 2]>, EvaluationError> {
    if stack.len() < arity {
        return Err(EvaluationError::MalformedExpression);
    }

    let first_argument = stack.len() - arity;
    Ok(stack.drain(first_argument..).collect())
}

/// `NaN` is never a valid answer, it only appears when an operation's
/// domain was violated.
fn check_result(
    result: f64,
    operation: &'static str,
    operands: &[f64],
) -> Result<f64, EvaluationError> {
    if result.is_nan() && !operands.iter().any(|v| v.is_nan()) {
        Err(EvaluationError::math(operation))
    } else {
        Ok(result)
    }
}

fn apply_unary<C>(
    op: Operator,
    operand: f64,
    ctx: &C,
) -> Result<f64, EvaluationError>
where
    C: Context,
{
    match op {
        Operator::Factorial => ctx.factorial(operand),
        Operator::Abs => Ok(operand.abs()),
        Operator::Negate => Ok(-operand),
        other => unreachable!("{:?} is not a unary operator", other),
    }
}

fn apply_binary(op: Operator, a: f64, b: f64) -> Result<f64, EvaluationError> {
    match op {
        Operator::Plus => Ok(a + b),
        Operator::Minus => Ok(a - b),
        Operator::Times => Ok(a * b),
        Operator::Divide if b == 0.0 => Err(EvaluationError::math("/")),
        Operator::Divide => Ok(a / b),
        Operator::Modulo if b == 0.0 => Err(EvaluationError::math("%")),
        Operator::Modulo => Ok(a % b),
        Operator::Power => Ok(a.powf(b)),
        // an equation is solved by finding where "lhs - rhs" is zero
        Operator::Equals => Ok(a - b),
        // grouping punctuation never survives conversion to postfix
        Operator::OpenParen | Operator::CloseParen | Operator::Comma => {
            Err(EvaluationError::MalformedExpression)
        },
        unary => unreachable!("{:?} is not a binary operator", unary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse::to_postfix, tokens::tokenize, Builtins};

    fn eval(src: &str) -> Result<f64, EvaluationError> {
        eval_at(src, None)
    }

    fn eval_at(src: &str, x: Option<f64>) -> Result<f64, EvaluationError> {
        let postfix = to_postfix(tokenize(src).unwrap()).unwrap();
        evaluate(&postfix, |_| x, &Builtins::default())
    }

    #[test]
    fn simple_arithmetic() {
        let inputs = vec![
            ("1", 1.0),
            ("1 + 1.5", 1.0 + 1.5),
            ("1 - 1.5", 1.0 - 1.5),
            ("2 * 3", 2.0 * 3.0),
            ("4 / 2", 4.0 / 2.0),
            ("7 % 4", 3.0),
            ("-7 % 4", -3.0),
            ("5.5 % 2", 1.5),
            ("2^10", 1024.0),
            ("2^3^2", 512.0),
            ("2+3*4", 14.0),
            ("(2+3)*4", 20.0),
            ("10 - 4 - 3", 3.0),
            ("-2^2", -4.0),
            ("2^-1", 0.5),
            ("-(1 + 2)", -3.0),
            ("5!", 120.0),
            ("0!", 1.0),
            ("3!!", 720.0),
            ("-3!", -6.0),
            ("|2-7|*2", 10.0),
            ("|-5|", 5.0),
            ("6 = 4", 2.0),
        ];

        for (src, should_be) in inputs {
            let got = eval(src).unwrap();

            assert_eq!(got, should_be, "{} -> {} != {}", src, got, should_be);
        }
    }

    #[test]
    fn variables_are_looked_up() {
        assert_eq!(eval_at("x^2 - 4", Some(3.0)).unwrap(), 5.0);
        assert_eq!(eval_at("2*x = 10", Some(5.0)).unwrap(), 0.0);
    }

    #[test]
    fn missing_variable() {
        let got = eval("x + 1").unwrap_err();

        assert_eq!(
            got,
            EvaluationError::UndefinedVariable { name: "x".into() }
        );
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(eval("1/0").unwrap_err(), EvaluationError::math("/"));
        assert_eq!(eval("1%0").unwrap_err(), EvaluationError::math("%"));
    }

    #[test]
    fn nan_results_are_errors() {
        assert_eq!(eval("(-8)^(1/3)").unwrap_err(), EvaluationError::math("^"));
    }

    #[test]
    fn overflow_is_still_a_number() {
        assert_eq!(eval("10^400").unwrap(), std::f64::INFINITY);
    }

    #[test]
    fn invalid_factorials() {
        assert_eq!(
            eval("(-1)!").unwrap_err(),
            EvaluationError::InvalidFactorial { value: -1.0 }
        );
        assert_eq!(
            eval("2.5!").unwrap_err(),
            EvaluationError::InvalidFactorial { value: 2.5 }
        );
    }

    #[test]
    fn leftover_or_missing_operands() {
        let inputs = vec!["2 3", "2 +", "*", "nPr(5)", "()", "e x"];

        for src in inputs {
            let got = eval_at(src, Some(1.0)).unwrap_err();

            assert_eq!(got, EvaluationError::MalformedExpression, "{}", src);
        }
    }

    #[test]
    fn stray_punctuation_in_postfix_is_malformed() {
        let postfix = vec![
            Token::Number(1.0),
            Token::Number(2.0),
            Token::Operator(Operator::Comma),
        ];

        let got = evaluate(&postfix, |_| None, &Builtins::default());

        assert_eq!(got, Err(EvaluationError::MalformedExpression));
    }

    #[test]
    fn repeated_evaluation_is_deterministic() {
        let src = "sin(30) + nCr(10, 3) * ln(x)";
        let first = eval_at(src, Some(2.5)).unwrap();

        for _ in 0..10 {
            assert_eq!(eval_at(src, Some(2.5)).unwrap(), first);
        }
    }
}
