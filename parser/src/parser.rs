//! FILENAME: parser/src/parser.rs
//! PURPOSE: Recursive descent parser that converts a stream of Tokens into an AST.
//! CONTEXT: This is the second stage of the parsing pipeline. It takes tokens
//! from the Lexer and builds an Expression tree that can be evaluated.
//!
//! GRAMMAR:
//!   expression --> term ( ("+" | "-") term )*
//!   term       --> factor ( ("*" | "/") factor )*
//!   factor     --> ("+" | "-") factor | primary
//!   primary    --> NUMBER | cell_ref | "(" expression ")"
//!   cell_ref   --> UPPERCASE_LETTERS DIGITS
//!
//! Binary operators are left-associative; the unary sign binds tighter
//! than "*" and "/". Whitespace between tokens is insignificant.

use crate::ast::{BinaryOperator, Expression, UnaryOperator};
use crate::lexer::Lexer;
use crate::token::Token;

/// Parser errors with descriptive messages.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a formula body (the text after the leading '=') into an AST.
pub fn parse(input: &str) -> ParseResult<Expression> {
    Parser::new(input).parse()
}

/// The Parser struct holds the lexer and current token state.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
}

impl<'a> Parser<'a> {
    /// Creates a new parser from an input string.
    /// Automatically advances to the first token.
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
        }
    }

    /// Parses the entire input and returns the AST.
    pub fn parse(&mut self) -> ParseResult<Expression> {
        if self.current_token == Token::EOF {
            return Err(ParseError::new("Empty expression"));
        }

        let expr = self.parse_expression()?;

        // Ensure we consumed all tokens
        if self.current_token != Token::EOF {
            return Err(ParseError::new(format!(
                "Unexpected token after expression: {:?}",
                self.current_token
            )));
        }

        Ok(expr)
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.current_token = self.lexer.next_token();
    }

    /// Checks if the current token matches the expected token.
    /// If it matches, advances and returns Ok. Otherwise returns an error.
    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.current_token == expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(format!(
                "Expected {:?}, found {:?}",
                expected, self.current_token
            )))
        }
    }

    /// Parses additive expressions (+ and -).
    fn parse_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_term()?;

        loop {
            let op = match &self.current_token {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_term()?;

            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses multiplicative expressions (* and /).
    fn parse_term(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_factor()?;

        loop {
            let op = match &self.current_token {
                Token::Asterisk => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.advance();
            let right = self.parse_factor()?;

            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses sign-prefixed factors (+x, -x).
    fn parse_factor(&mut self) -> ParseResult<Expression> {
        let op = match &self.current_token {
            Token::Plus => UnaryOperator::Plus,
            Token::Minus => UnaryOperator::Negate,
            _ => return self.parse_primary(),
        };

        self.advance();
        let operand = self.parse_factor()?;
        Ok(Expression::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    /// Parses primary expressions (literals, cell refs, parentheses).
    fn parse_primary(&mut self) -> ParseResult<Expression> {
        match self.current_token.clone() {
            // Number literal
            Token::Number(n) => {
                self.advance();
                Ok(Expression::Number(n))
            }

            // Identifier: the only identifiers this language has are cell
            // references (letters + digits like A1, AA100)
            Token::Identifier(name) => {
                self.advance();
                match split_cell_ref(&name) {
                    Some((col, row)) => Ok(Expression::CellRef { col, row }),
                    None => Err(ParseError::new(format!(
                        "Invalid cell reference: {}",
                        name
                    ))),
                }
            }

            // Parenthesized expression
            Token::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }

            other => Err(ParseError::new(format!(
                "Unexpected token: {:?}",
                other
            ))),
        }
    }
}

/// Splits a cell-reference word into its column letters and 1-based row.
/// The accepted shape is one or more uppercase letters followed by one or
/// more digits, with nothing else: A1, XFD16384, ZZZZ99 (the last resolves
/// to an out-of-range position later, but it parses).
/// Rows too large for u32 saturate; they are out of range either way.
fn split_cell_ref(name: &str) -> Option<(String, u32)> {
    let letters: String = name.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let digits = &name[letters.len()..];

    if letters.is_empty() || digits.is_empty() {
        return None;
    }
    if !letters.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let row = digits.parse::<u32>().unwrap_or(u32::MAX);
    Some((letters, row))
}
