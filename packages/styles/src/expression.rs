//! # Numeric Expressions
//!
//! Numeric stylesheet values are small arithmetic expressions over unit
//! quantities:
//!
//! ```text
//! 3ch + 2px        // 3 × 7.2 + 2
//! (60ch - 2l) / 2  // (432 - 24) / 2
//! ```
//!
//! Units bind tighter than any operator. A bare number is in pixels.

use crate::error::ValueError;
use logos::Logos;

/// Width of one character cell
pub const CHARACTER_WIDTH: f64 = 7.2;
/// Height of one text line
pub const LINE_HEIGHT: f64 = 12.0;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum Token {
    #[regex(r"[0-9]+(\.[0-9]+)?|\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[token("ch")]
    Character,

    #[token("l")]
    Line,

    #[token("px")]
    Pixel,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,
}

/// Evaluate a numeric expression
pub fn evaluate(source: &str) -> Result<f64, ValueError> {
    let mut tokens = Vec::new();
    for (token, span) in Token::lexer(source).spanned() {
        match token {
            Ok(token) => tokens.push(token),
            Err(()) => {
                return Err(ValueError::expression(
                    source,
                    format!("unexpected '{}'", &source[span]),
                ))
            }
        }
    }

    let mut parser = ExpressionParser { tokens: &tokens, pos: 0, source };
    let value = parser.expression()?;
    if parser.pos != tokens.len() {
        return Err(parser.error("trailing input"));
    }
    if !value.is_finite() {
        return Err(parser.error("result is not a finite number"));
    }
    Ok(value)
}

struct ExpressionParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    source: &'a str,
}

impl<'a> ExpressionParser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn error(&self, message: &str) -> ValueError {
        ValueError::expression(self.source, message)
    }

    fn expression(&mut self) -> Result<f64, ValueError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ValueError> {
        let mut value = self.factor()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            if op == Token::Star {
                value *= rhs;
            } else if rhs == 0.0 {
                return Err(self.error("division by zero"));
            } else {
                value /= rhs;
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, ValueError> {
        let base = match self.bump() {
            Some(Token::Minus) => return Ok(-self.factor()?),
            Some(Token::Plus) => return self.factor(),
            Some(Token::Number(value)) => value,
            Some(Token::LParen) => {
                let value = self.expression()?;
                if self.bump() != Some(Token::RParen) {
                    return Err(self.error("missing ')'"));
                }
                value
            }
            Some(_) => return Err(self.error("expected a number")),
            None => return Err(self.error("unexpected end of expression")),
        };
        Ok(base * self.unit())
    }

    fn unit(&mut self) -> f64 {
        let scale = match self.peek() {
            Some(Token::Character) => CHARACTER_WIDTH,
            Some(Token::Line) => LINE_HEIGHT,
            Some(Token::Pixel) => 1.0,
            _ => return 1.0,
        };
        self.pos += 1;
        scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_units() {
        assert!(close(evaluate("10").unwrap(), 10.0));
        assert!(close(evaluate("10ch").unwrap(), 72.0));
        assert!(close(evaluate("2l").unwrap(), 24.0));
        assert!(close(evaluate("5px").unwrap(), 5.0));
        assert!(close(evaluate(".5l").unwrap(), 6.0));
    }

    #[test]
    fn test_precedence_and_parentheses() {
        assert!(close(evaluate("1 + 2 * 3").unwrap(), 7.0));
        assert!(close(evaluate("(1 + 2) * 3").unwrap(), 9.0));
        assert!(close(evaluate("(60ch - 2l) / 2").unwrap(), 204.0));
        assert!(close(evaluate("-1l + 20").unwrap(), 8.0));
        assert!(close(evaluate("(2)l").unwrap(), 24.0));
    }

    #[test]
    fn test_invalid_expressions() {
        assert!(evaluate("").is_err());
        assert!(evaluate("1 +").is_err());
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("3em").is_err());
        assert!(evaluate("4 / 0").is_err());
        assert!(evaluate("1 2").is_err());
    }
}
