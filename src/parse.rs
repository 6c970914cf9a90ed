use crate::tokens::{Operator, Token};
use smol_str::SmolStr;
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    ops::Range,
};

/// Rearrange an infix token stream into postfix (reverse polish) order using
/// the shunting-yard algorithm.
///
/// Besides the usual precedence and associativity rules:
///
/// - a function sits on the operator stack until the `)` closing its
///   argument list, and is emitted straight after that `)`
/// - `,` flushes the current argument, leaving the enclosing `(` in place
/// - a `-` (or `+`) where an operand is expected is a prefix sign
/// - a `|` where an operand is expected opens an absolute value group, and
///   the next `|` after an operand closes it, emitting [`Operator::Abs`]
///
/// ```text
/// precedence  operators
///     4       !
///     3       ^  neg  (right associative)
///     2       *  /  %
///     1       +  -
///     0       =
/// ```
pub fn to_postfix<I>(tokens: I) -> Result<Vec<Token>, ParseError>
where
    I: IntoIterator<Item = Token>,
{
    let mut converter = Converter::default();

    for token in tokens {
        converter.push(token)?;
    }

    converter.finish()
}

#[derive(Debug, Default)]
struct Converter {
    output: Vec<Token>,
    stack: Vec<Token>,
    /// Was the previous token an operand (or something closing one)?
    after_operand: bool,
    seen_anything: bool,
}

impl Converter {
    fn push(&mut self, token: Token) -> Result<(), ParseError> {
        self.seen_anything = true;

        match token {
            Token::Number(_) | Token::Variable => {
                self.output.push(token);
                self.after_operand = true;
            },
            Token::Function(_) => {
                self.stack.push(token);
                self.after_operand = false;
            },
            Token::Operator(op) => self.operator(op)?,
        }

        Ok(())
    }

    fn operator(&mut self, op: Operator) -> Result<(), ParseError> {
        match op {
            Operator::OpenParen => {
                self.stack.push(Token::Operator(op));
                self.after_operand = false;
            },
            Operator::CloseParen => {
                self.pop_until_open(Operator::OpenParen)?;
                if let Some(Token::Function(_)) = self.stack.last() {
                    self.emit_top();
                }
                self.after_operand = true;
            },
            Operator::Comma => {
                self.pop_until_open(Operator::OpenParen)?;
                // the bracket stays open for the next argument
                self.stack.push(Token::Operator(Operator::OpenParen));
                self.after_operand = false;
            },
            Operator::Abs if self.after_operand => {
                self.pop_until_open(Operator::Abs)?;
                self.output.push(Token::Operator(Operator::Abs));
                self.after_operand = true;
            },
            Operator::Abs => {
                self.stack.push(Token::Operator(Operator::Abs));
            },
            Operator::Plus if !self.after_operand => {},
            Operator::Minus | Operator::Negate if !self.after_operand => {
                // prefix operators can't pop their left neighbours because
                // they don't have one
                self.stack.push(Token::Operator(Operator::Negate));
            },
            binary => {
                self.pop_while_binds_tighter(binary);
                self.stack.push(Token::Operator(binary));
                // a factorial closes off its operand
                self.after_operand = binary == Operator::Factorial;
            },
        }

        Ok(())
    }

    fn pop_while_binds_tighter(&mut self, incoming: Operator) {
        let incoming_precedence = match incoming.precedence() {
            Some(p) => p,
            None => return,
        };

        while let Some(Token::Operator(top)) = self.stack.last().copied() {
            let top_precedence = match top.precedence() {
                Some(p) => p,
                // parens and bars act as a barrier
                None => break,
            };

            let should_pop = top_precedence > incoming_precedence
                || (top_precedence == incoming_precedence
                    && !incoming.is_right_associative());

            if !should_pop {
                break;
            }

            self.emit_top();
        }
    }

    /// Move operators to the output until we find the `opening` delimiter,
    /// which is removed from the stack and discarded.
    fn pop_until_open(&mut self, opening: Operator) -> Result<(), ParseError> {
        loop {
            match self.stack.pop() {
                Some(Token::Operator(op)) if op == opening => return Ok(()),
                // a ")" or "," can't close a "|" and vice versa
                Some(Token::Operator(Operator::OpenParen))
                | Some(Token::Operator(Operator::Abs))
                | None => return Err(ParseError::UnbalancedParentheses),
                Some(other) => self.output.push(other),
            }
        }
    }

    fn emit_top(&mut self) {
        if let Some(token) = self.stack.pop() {
            self.output.push(token);
        }
    }

    fn finish(mut self) -> Result<Vec<Token>, ParseError> {
        if !self.seen_anything {
            return Err(ParseError::EmptyExpression);
        }

        while let Some(token) = self.stack.pop() {
            match token {
                Token::Operator(Operator::OpenParen)
                | Token::Operator(Operator::Abs) => {
                    return Err(ParseError::UnbalancedParentheses)
                },
                other => self.output.push(other),
            }
        }

        log::trace!(
            "Postfix: {}",
            self.output
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        );

        Ok(self.output)
    }
}

/// Possible errors that may occur while parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    InvalidCharacter {
        character: char,
        index: usize,
    },
    /// A numeric literal which isn't a valid number (e.g. `1.2.3`).
    InvalidNumber {
        text: SmolStr,
        span: Range<usize>,
    },
    /// A bracket, absolute value bar or argument separator without its
    /// partner.
    UnbalancedParentheses,
    EmptyExpression,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidCharacter { character, index } => write!(
                f,
                "Invalid character '{}' at index {}",
                character, index
            ),
            ParseError::InvalidNumber { text, span } => write!(
                f,
                "\"{}\" at {}..{} is not a valid number",
                text, span.start, span.end
            ),
            ParseError::UnbalancedParentheses => {
                write!(f, "Unbalanced parentheses")
            },
            ParseError::EmptyExpression => write!(f, "Nothing to calculate"),
        }
    }
}

impl Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::tokenize;

    fn postfix(src: &str) -> Result<String, ParseError> {
        let tokens = tokenize(src)?;
        let got = to_postfix(tokens)?;

        Ok(got
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" "))
    }

    macro_rules! postfix_test {
        ($name:ident, $src:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let got = postfix($src).unwrap();

                assert_eq!(got, $should_be);
            }
        };
    }

    postfix_test!(single_number, "1", "1");
    postfix_test!(one_plus_one, "1 + 1", "1 1 +");
    postfix_test!(multiplication_binds_tighter, "2+3*4", "2 3 4 * +");
    postfix_test!(parens_override_precedence, "(2+3)*4", "2 3 + 4 *");
    postfix_test!(subtraction_is_left_associative, "5-3-1", "5 3 - 1 -");
    postfix_test!(power_is_right_associative, "2^3^2", "2 3 2 ^ ^");
    postfix_test!(modulo_with_times, "7%4*2", "7 4 % 2 *");
    postfix_test!(factorial_binds_tightest, "2^3!", "2 3 ! ^");
    postfix_test!(factorial_then_plus, "5!+1", "5 ! 1 +");
    postfix_test!(function_call, "sin(x)", "x sin");
    postfix_test!(function_of_expression, "log(10*x+1)", "10 x * 1 + log");
    postfix_test!(nested_calls, "abs(ln(x))", "x ln abs");
    postfix_test!(two_arguments, "nPr(5,2)", "5 2 nPr");
    postfix_test!(
        arguments_are_expressions,
        "nthRoot(1+2, 4*2)",
        "1 2 + 4 2 * nthRoot"
    );
    postfix_test!(equation, "2*x = 10", "2 x * 10 =");
    postfix_test!(equals_binds_loosest, "x+1 = x*3", "x 1 + x 3 * =");
    postfix_test!(leading_minus, "-5", "5 neg");
    postfix_test!(minus_after_open_paren, "(-1)!", "1 neg !");
    postfix_test!(minus_inside_call, "abs(-5)", "5 neg abs");
    postfix_test!(negation_is_weaker_than_power, "-2^2", "2 2 ^ neg");
    postfix_test!(negative_exponent, "2^-1", "2 1 neg ^");
    postfix_test!(negation_then_times, "-2*3", "2 neg 3 *");
    postfix_test!(binary_minus_after_factorial, "3!-1", "3 ! 1 -");
    postfix_test!(unary_plus_is_ignored, "+4", "4");
    postfix_test!(absolute_value_bars, "|2-7|*2", "2 7 - | 2 *");
    postfix_test!(absolute_value_of_negative, "|-5|", "5 neg |");
    postfix_test!(nested_bars, "|1 - |x||", "1 x | - |");

    #[test]
    fn unbalanced_parentheses_are_detected() {
        let inputs = vec!["(1+2", "1+2)", "sin(x))", "|x", "x|", "(|x)|", "1,2"];

        for src in inputs {
            let got = postfix(src).unwrap_err();

            assert_eq!(got, ParseError::UnbalancedParentheses, "{}", src);
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(postfix("   ").unwrap_err(), ParseError::EmptyExpression);
    }
}
