use crate::{
    ops::{self, Context, EvaluationError},
    parse::{self, ParseError},
    tokens::{self, Token},
};
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// A parsed expression, stored in postfix order so it can be evaluated
/// repeatedly without re-parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    postfix: Vec<Token>,
}

impl Expression {
    pub fn from_tokens<I>(tokens: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = Token>,
    {
        Ok(Expression {
            postfix: parse::to_postfix(tokens)?,
        })
    }

    /// The expression's tokens, operands before operators.
    pub fn postfix(&self) -> &[Token] { &self.postfix }

    /// Does this expression mention the free variable, `x`?
    pub fn has_variable(&self) -> bool {
        self.postfix.iter().any(Token::is_variable)
    }

    /// Evaluate the expression, using `lookup_variable` to find the value
    /// of `x`.
    pub fn evaluate<F, C>(
        &self,
        lookup_variable: F,
        ctx: &C,
    ) -> Result<f64, EvaluationError>
    where
        F: Fn(&str) -> Option<f64>,
        C: Context,
    {
        ops::evaluate(&self.postfix, lookup_variable, ctx)
    }

    /// Evaluate the expression with `x` bound to a particular value.
    pub fn evaluate_at<C>(&self, x: f64, ctx: &C) -> Result<f64, EvaluationError>
    where
        C: Context,
    {
        self.evaluate(|_| Some(x), ctx)
    }
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::from_tokens(tokens::tokenize(s)?)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, token) in self.postfix.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", token)?;
        }

        Ok(())
    }
}

/// Anything that can go wrong while calculating the value of some text.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    Parse(ParseError),
    Eval(EvaluationError),
}

impl From<ParseError> for EvalError {
    fn from(e: ParseError) -> Self { EvalError::Parse(e) }
}

impl From<EvaluationError> for EvalError {
    fn from(e: EvaluationError) -> Self { EvalError::Eval(e) }
}

impl Display for EvalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Parse(inner) => write!(f, "{}", inner),
            EvalError::Eval(inner) => write!(f, "{}", inner),
        }
    }
}

impl Error for EvalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EvalError::Parse(inner) => Some(inner),
            EvalError::Eval(inner) => Some(inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Builtins;

    #[test]
    fn parse_once_evaluate_many_times() {
        let expr: Expression = "x^2 - 4".parse().unwrap();
        let ctx = Builtins::default();

        let got: Vec<f64> = (0..4)
            .map(|x| expr.evaluate_at(f64::from(x), &ctx).unwrap())
            .collect();

        assert_eq!(got, vec![-4.0, -3.0, 0.0, 5.0]);
    }

    #[test]
    fn display_is_the_postfix_form() {
        let expr: Expression = "nCr(5, 2) * (x + 1)".parse().unwrap();

        assert_eq!(expr.to_string(), "5 2 nCr x 1 + *");
    }

    #[test]
    fn detect_the_free_variable() {
        let inputs = vec![
            ("1 + 2", false),
            ("x", true),
            ("sin(2*x) = 0.5", true),
            ("exp(1)", false),
        ];

        for (src, should_be) in inputs {
            let expr: Expression = src.parse().unwrap();

            assert_eq!(expr.has_variable(), should_be, "{}", src);
        }
    }

    #[test]
    fn parse_errors_are_reported() {
        assert_eq!(
            "2 ? 3".parse::<Expression>().unwrap_err(),
            ParseError::InvalidCharacter {
                character: '?',
                index: 2
            }
        );
        assert_eq!(
            "(1 + 2".parse::<Expression>().unwrap_err(),
            ParseError::UnbalancedParentheses
        );
    }

    #[test]
    fn errors_expose_their_source() {
        let err = EvalError::from(EvaluationError::MalformedExpression);

        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Malformed expression");
    }
}
