//! Parser for textual scoring expressions.
//!
//! The CLI accepts the objective as a string such as `vertices`,
//! `vertices+edges`, or `vertices + 2*edges^2`. The grammar deliberately
//! admits only `+`, `*`, `^`, non-negative literals, parentheses, and the two
//! count symbols, so every parsable expression is non-decreasing in both
//! counts and automatically satisfies the [`Valuation`] contract.

use std::str::FromStr;

use thiserror::Error;

use crate::valuation::Valuation;

/// Errors from tokenizing or parsing a scoring expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A character outside the grammar's alphabet.
    #[error("unexpected character '{found}' at byte {position}")]
    UnexpectedChar {
        /// Byte offset into the input.
        position: usize,
        /// The offending character.
        found: char,
    },

    /// An identifier other than `vertices` or `edges`.
    #[error("unknown symbol '{0}' (expected 'vertices' or 'edges')")]
    UnknownSymbol(String),

    /// A numeric literal that did not parse.
    #[error("invalid number at byte {position}")]
    InvalidNumber {
        /// Byte offset into the input.
        position: usize,
    },

    /// A structurally misplaced token.
    #[error("unexpected token at byte {position}")]
    UnexpectedToken {
        /// Byte offset into the input.
        position: usize,
    },

    /// Input ended mid-expression.
    #[error("unexpected end of expression")]
    UnexpectedEnd,
}

/// A parsed scoring expression over the matched vertex and edge counts.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreExpr {
    /// The matched vertex count.
    Vertices,
    /// The matched edge count.
    Edges,
    /// A non-negative literal.
    Const(f64),
    /// Sum of two subexpressions.
    Add(Box<ScoreExpr>, Box<ScoreExpr>),
    /// Product of two subexpressions.
    Mul(Box<ScoreExpr>, Box<ScoreExpr>),
    /// Left operand raised to the right operand.
    Pow(Box<ScoreExpr>, Box<ScoreExpr>),
}

impl ScoreExpr {
    /// Evaluates the expression for the given counts.
    #[must_use]
    pub fn eval(&self, vertices: usize, edges: usize) -> f64 {
        match self {
            Self::Vertices => vertices as f64,
            Self::Edges => edges as f64,
            Self::Const(c) => *c,
            Self::Add(a, b) => a.eval(vertices, edges) + b.eval(vertices, edges),
            Self::Mul(a, b) => a.eval(vertices, edges) * b.eval(vertices, edges),
            Self::Pow(a, b) => a.eval(vertices, edges).powf(b.eval(vertices, edges)),
        }
    }
}

impl Valuation for ScoreExpr {
    fn score(&self, vertices: usize, edges: usize) -> f64 {
        self.eval(vertices, edges)
    }
}

impl FromStr for ScoreExpr {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(input)?;
        let mut parser = Parser { tokens, cursor: 0 };
        let expr = parser.expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some(&(position, _)) => Err(ParseError::UnexpectedToken { position }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Vertices,
    Edges,
    Plus,
    Star,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(position, c)) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' => {
                chars.next();
            }
            '+' | '*' | '^' | '(' | ')' => {
                chars.next();
                let token = match c {
                    '+' => Token::Plus,
                    '*' => Token::Star,
                    '^' => Token::Caret,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                };
                tokens.push((position, token));
            }
            '0'..='9' | '.' => {
                let mut end = position;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &input[position..end];
                let value: f64 = literal
                    .parse()
                    .map_err(|_| ParseError::InvalidNumber { position })?;
                tokens.push((position, Token::Number(value)));
            }
            c if c.is_ascii_alphabetic() => {
                let mut end = position;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_alphabetic() {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let word = &input[position..end];
                let token = match word {
                    "vertices" => Token::Vertices,
                    "edges" => Token::Edges,
                    _ => return Err(ParseError::UnknownSymbol(word.to_string())),
                };
                tokens.push((position, token));
            }
            _ => return Err(ParseError::UnexpectedChar { position, found: c }),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> Option<&(usize, Token)> {
        self.tokens.get(self.cursor)
    }

    fn bump(&mut self) -> Option<(usize, Token)> {
        let token = self.tokens.get(self.cursor).cloned();
        self.cursor += 1;
        token
    }

    // expr := term ('+' term)*
    fn expr(&mut self) -> Result<ScoreExpr, ParseError> {
        let mut lhs = self.term()?;
        while matches!(self.peek(), Some((_, Token::Plus))) {
            self.cursor += 1;
            let rhs = self.term()?;
            lhs = ScoreExpr::Add(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // term := factor ('*' factor)*
    fn term(&mut self) -> Result<ScoreExpr, ParseError> {
        let mut lhs = self.factor()?;
        while matches!(self.peek(), Some((_, Token::Star))) {
            self.cursor += 1;
            let rhs = self.factor()?;
            lhs = ScoreExpr::Mul(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // factor := atom ('^' atom)?
    fn factor(&mut self) -> Result<ScoreExpr, ParseError> {
        let base = self.atom()?;
        if matches!(self.peek(), Some((_, Token::Caret))) {
            self.cursor += 1;
            let exponent = self.atom()?;
            return Ok(ScoreExpr::Pow(Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    // atom := NUMBER | 'vertices' | 'edges' | '(' expr ')'
    fn atom(&mut self) -> Result<ScoreExpr, ParseError> {
        match self.bump() {
            Some((_, Token::Number(value))) => Ok(ScoreExpr::Const(value)),
            Some((_, Token::Vertices)) => Ok(ScoreExpr::Vertices),
            Some((_, Token::Edges)) => Ok(ScoreExpr::Edges),
            Some((_, Token::LParen)) => {
                let inner = self.expr()?;
                match self.bump() {
                    Some((_, Token::RParen)) => Ok(inner),
                    Some((position, _)) => Err(ParseError::UnexpectedToken { position }),
                    None => Err(ParseError::UnexpectedEnd),
                }
            }
            Some((position, _)) => Err(ParseError::UnexpectedToken { position }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_single_symbol() {
        let expr: ScoreExpr = "vertices".parse().unwrap();
        assert_eq!(expr, ScoreExpr::Vertices);
        assert_eq!(expr.eval(7, 3), 7.0);
    }

    #[rstest]
    #[case::sum("vertices + edges", 2, 1, 3.0)]
    #[case::precedence("vertices + 2*edges^2", 1, 3, 19.0)]
    #[case::parens("(vertices + edges) * 2", 1, 2, 6.0)]
    #[case::constant("10", 4, 4, 10.0)]
    #[case::whitespace(" vertices\t*\nedges ", 3, 4, 12.0)]
    fn evaluates_expressions(
        #[case] input: &str,
        #[case] vertices: usize,
        #[case] edges: usize,
        #[case] expected: f64,
    ) {
        let expr: ScoreExpr = input.parse().unwrap();
        assert_eq!(expr.eval(vertices, edges), expected);
    }

    #[test]
    fn rejects_unknown_symbol() {
        let err = "nodes".parse::<ScoreExpr>().unwrap_err();
        assert_eq!(err, ParseError::UnknownSymbol("nodes".to_string()));
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(matches!(
            "vertices edges".parse::<ScoreExpr>(),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn rejects_dangling_operator() {
        assert_eq!(
            "vertices +".parse::<ScoreExpr>().unwrap_err(),
            ParseError::UnexpectedEnd
        );
    }

    #[test]
    fn parsed_expressions_are_monotone_samples() {
        let expr: ScoreExpr = "vertices + 3 * edges".parse().unwrap();
        for v in 0..5 {
            for e in 0..5 {
                assert!(expr.eval(v + 1, e) >= expr.eval(v, e));
                assert!(expr.eval(v, e + 1) >= expr.eval(v, e));
            }
        }
    }
}
