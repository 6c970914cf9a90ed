//! Turning text into a stream of [`Token`]s.

use crate::parse::ParseError;
use std::{
    f64::consts::{E, PI},
    fmt::{self, Display, Formatter},
    ops::Range,
};

/// The name of the only free variable an expression may contain.
pub const VARIABLE: &str = "x";

/// Split an expression into its [`Token`]s.
pub fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    Tokens::new(src).collect()
}

/// A single lexical element of an expression.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    /// The free variable, `x`.
    Variable,
    Function(Function),
    Operator(Operator),
}

impl Token {
    pub fn is_variable(&self) -> bool { *self == Token::Variable }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "{}", value),
            Token::Variable => write!(f, "{}", VARIABLE),
            Token::Function(function) => write!(f, "{}", function),
            Token::Operator(op) => write!(f, "{}", op),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Plus,
    Minus,
    Times,
    Divide,
    Modulo,
    Power,
    /// Postfix `!`.
    Factorial,
    /// The `|` bar. In postfix form this is the unary absolute value.
    Abs,
    OpenParen,
    CloseParen,
    /// The argument separator, `,`.
    Comma,
    /// `lhs = rhs`, evaluated as `lhs - rhs`.
    Equals,
    /// Prefix `-`. Never produced by the tokenizer, the parser introduces
    /// it when a `-` appears where an operand is expected.
    Negate,
}

impl Operator {
    fn from_char(c: char) -> Option<Operator> {
        let op = match c {
            '+' => Operator::Plus,
            '-' => Operator::Minus,
            '*' => Operator::Times,
            '/' => Operator::Divide,
            '%' => Operator::Modulo,
            '^' => Operator::Power,
            '!' => Operator::Factorial,
            '|' => Operator::Abs,
            '(' => Operator::OpenParen,
            ')' => Operator::CloseParen,
            ',' => Operator::Comma,
            '=' => Operator::Equals,
            _ => return None,
        };

        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Times => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Power => "^",
            Operator::Factorial => "!",
            Operator::Abs => "|",
            Operator::OpenParen => "(",
            Operator::CloseParen => ")",
            Operator::Comma => ",",
            Operator::Equals => "=",
            Operator::Negate => "neg",
        }
    }

    /// How tightly the operator binds, or `None` for grouping punctuation.
    pub fn precedence(self) -> Option<u8> {
        match self {
            Operator::Equals => Some(0),
            Operator::Plus | Operator::Minus => Some(1),
            Operator::Times | Operator::Divide | Operator::Modulo => Some(2),
            Operator::Power | Operator::Negate => Some(3),
            Operator::Factorial => Some(4),
            Operator::Abs
            | Operator::OpenParen
            | Operator::CloseParen
            | Operator::Comma => None,
        }
    }

    pub fn is_right_associative(self) -> bool {
        match self {
            Operator::Power | Operator::Negate => true,
            _ => false,
        }
    }

    /// Does this operator consume a single operand?
    pub fn is_unary(self) -> bool {
        match self {
            Operator::Factorial | Operator::Abs | Operator::Negate => true,
            _ => false,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The closed set of functions an expression can call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Function {
    StdevP,
    Stdev,
    NthRoot,
    Round,
    Floor,
    Ceil,
    Mean,
    Asin,
    Acos,
    Atan,
    Sin,
    Cos,
    Tan,
    Sec,
    Cosec,
    Cot,
    Log,
    Ln,
    Exp,
    Abs,
    NPr,
    NCr,
}

impl Function {
    pub const ALL: [Function; 22] = [
        Function::StdevP,
        Function::Stdev,
        Function::NthRoot,
        Function::Round,
        Function::Floor,
        Function::Ceil,
        Function::Mean,
        Function::Asin,
        Function::Acos,
        Function::Atan,
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Sec,
        Function::Cosec,
        Function::Cot,
        Function::Log,
        Function::Ln,
        Function::Exp,
        Function::Abs,
        Function::NPr,
        Function::NCr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Function::StdevP => "stdevp",
            Function::Stdev => "stdev",
            Function::NthRoot => "nthRoot",
            Function::Round => "round",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
            Function::Mean => "mean",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Sec => "sec",
            Function::Cosec => "cosec",
            Function::Cot => "cot",
            Function::Log => "log",
            Function::Ln => "ln",
            Function::Exp => "exp",
            Function::Abs => "abs",
            Function::NPr => "nPr",
            Function::NCr => "nCr",
        }
    }

    /// The number of arguments popped off the stack when this function is
    /// applied.
    pub fn arity(self) -> usize {
        match self {
            Function::NthRoot
            | Function::Mean
            | Function::Stdev
            | Function::StdevP
            | Function::NPr
            | Function::NCr => 2,
            _ => 1,
        }
    }

    /// Find the longest function name that `text` starts with.
    ///
    /// The whole table is always searched, so names sharing a prefix (`cos`,
    /// `cosec`, `cot`) can be declared in any order.
    pub fn longest_prefix_of(text: &str) -> Option<Function> {
        Function::ALL
            .iter()
            .copied()
            .filter(|f| text.starts_with(f.name()))
            .max_by_key(|f| f.name().len())
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An iterator over the [`Token`]s in some text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tokens<'a> {
    src: &'a str,
    cursor: usize,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(src: &'a str) -> Self { Tokens { src, cursor: 0 } }

    fn rest(&self) -> &'a str { &self.src[self.cursor..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    fn chomp(&mut self, token: Token) -> Option<Result<Token, ParseError>> {
        self.advance()?;
        Some(Ok(token))
    }

    fn take_while<P>(&mut self, mut predicate: P) -> (&'a str, Range<usize>)
    where
        P: FnMut(char) -> bool,
    {
        let start = self.cursor;

        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }

            self.advance();
        }

        let end = self.cursor;
        (&self.src[start..end], start..end)
    }

    fn chomp_number(&mut self) -> Result<Token, ParseError> {
        let (text, span) = self.take_while(|c| c.is_ascii_digit() || c == '.');

        // "1.2.3" and a lone "." are both rejected by the float parser
        text.parse()
            .map(Token::Number)
            .map_err(|_| ParseError::InvalidNumber {
                text: text.into(),
                span,
            })
    }

    fn chomp_word(&mut self, first: char) -> Result<Token, ParseError> {
        if let Some(function) = Function::longest_prefix_of(self.rest()) {
            self.cursor += function.name().len();
            return Ok(Token::Function(function));
        }

        let index = self.cursor;
        self.advance();

        match first {
            'x' => Ok(Token::Variable),
            'e' => Ok(Token::Number(E)),
            other => Err(ParseError::InvalidCharacter {
                character: other,
                index,
            }),
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            return match self.peek()? {
                space if space.is_whitespace() => {
                    self.advance();
                    continue;
                },
                '0'..='9' | '.' => Some(self.chomp_number()),
                'π' => self.chomp(Token::Number(PI)),
                letter if letter.is_alphabetic() => {
                    Some(self.chomp_word(letter))
                },
                other => match Operator::from_char(other) {
                    Some(op) => self.chomp(Token::Operator(op)),
                    None => {
                        let index = self.cursor;
                        // make sure we don't yield the same error forever
                        self.advance();
                        Some(Err(ParseError::InvalidCharacter {
                            character: other,
                            index,
                        }))
                    },
                },
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! tokenize_test {
        ($name:ident, $src:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let mut tokens = Tokens::new($src);

                let got = tokens.next().unwrap().unwrap();

                assert_eq!(got, $should_be);
                assert!(
                    tokens.next().is_none(),
                    "{:?} should be empty",
                    tokens
                );
            }
        };
    }

    tokenize_test!(open_paren, "(", Token::Operator(Operator::OpenParen));
    tokenize_test!(close_paren, ")", Token::Operator(Operator::CloseParen));
    tokenize_test!(plus, "+", Token::Operator(Operator::Plus));
    tokenize_test!(minus, "-", Token::Operator(Operator::Minus));
    tokenize_test!(modulo, "%", Token::Operator(Operator::Modulo));
    tokenize_test!(bar, "|", Token::Operator(Operator::Abs));
    tokenize_test!(equals, "=", Token::Operator(Operator::Equals));
    tokenize_test!(comma, ",", Token::Operator(Operator::Comma));
    tokenize_test!(single_digit_integer, "3", Token::Number(3.0));
    tokenize_test!(multi_digit_integer, "31", Token::Number(31.0));
    tokenize_test!(number_with_trailing_dot, "31.", Token::Number(31.0));
    tokenize_test!(number_with_leading_dot, ".5", Token::Number(0.5));
    tokenize_test!(simple_decimal, "3.14", Token::Number(3.14));
    tokenize_test!(pi, "π", Token::Number(PI));
    tokenize_test!(eulers_number, "e", Token::Number(E));
    tokenize_test!(variable, "x", Token::Variable);
    tokenize_test!(surrounded_by_whitespace, "  \t7 ", Token::Number(7.0));
    tokenize_test!(cos, "cos", Token::Function(Function::Cos));
    tokenize_test!(cosec, "cosec", Token::Function(Function::Cosec));
    tokenize_test!(cot, "cot", Token::Function(Function::Cot));
    tokenize_test!(stdev, "stdev", Token::Function(Function::Stdev));
    tokenize_test!(stdevp, "stdevp", Token::Function(Function::StdevP));
    tokenize_test!(exp, "exp", Token::Function(Function::Exp));
    tokenize_test!(n_th_root, "nthRoot", Token::Function(Function::NthRoot));

    #[test]
    fn every_function_name_tokenizes_as_itself() {
        for &function in Function::ALL.iter() {
            let got = tokenize(function.name()).unwrap();

            assert_eq!(got, vec![Token::Function(function)]);
        }
    }

    #[test]
    fn longest_match_does_not_depend_on_table_order() {
        let mut names: Vec<_> = Function::ALL.iter().map(|f| f.name()).collect();
        names.sort();

        for name in names {
            assert_eq!(
                Function::longest_prefix_of(name).map(Function::name),
                Some(name)
            );
        }
    }

    #[test]
    fn tokenize_a_full_expression() {
        let got = tokenize("2*sin(x) + 1.5").unwrap();

        let should_be = vec![
            Token::Number(2.0),
            Token::Operator(Operator::Times),
            Token::Function(Function::Sin),
            Token::Operator(Operator::OpenParen),
            Token::Variable,
            Token::Operator(Operator::CloseParen),
            Token::Operator(Operator::Plus),
            Token::Number(1.5),
        ];
        assert_eq!(got, should_be);
    }

    #[test]
    fn function_followed_by_constant() {
        let got = tokenize("ln e").unwrap();

        assert_eq!(
            got,
            vec![Token::Function(Function::Ln), Token::Number(E)]
        );
    }

    #[test]
    fn unknown_characters_are_rejected() {
        let inputs = vec![("2 # 3", '#', 2), ("y", 'y', 0), ("1 + $", '$', 4)];

        for (src, character, index) in inputs {
            let got = tokenize(src).unwrap_err();

            assert_eq!(got, ParseError::InvalidCharacter { character, index });
        }
    }

    #[test]
    fn multiple_decimal_points_are_rejected() {
        let got = tokenize("1 + 1.2.3").unwrap_err();

        assert_eq!(
            got,
            ParseError::InvalidNumber {
                text: "1.2.3".into(),
                span: 4..9,
            }
        );
    }

    #[test]
    fn a_lone_decimal_point_is_not_a_number() {
        let got = tokenize(".").unwrap_err();

        assert_eq!(
            got,
            ParseError::InvalidNumber {
                text: ".".into(),
                span: 0..1,
            }
        );
    }
}
