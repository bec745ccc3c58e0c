//! Formula parser
//!
//! A recursive descent parser over the token stream produced by
//! [`tokenize`](crate::lexer::tokenize).

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{tokenize, Token, TokenKind};
use gridcalc_core::{CellAddress, CellRange};

/// Deepest expression tree accepted
///
/// Parentheses, unary operators, calls and each operator in a binary chain
/// all count as one level.
const MAX_DEPTH: usize = 256;

/// Parse a formula string into an AST
///
/// A single leading `=` is optional; `"=1+2"` and `"1+2"` parse the same.
/// The whole input must form one expression.
///
/// # Example
/// ```rust
/// use gridcalc_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=SUM(A1:A10)").unwrap();
/// let ast = parse_formula("=IF(A1>0,\"Yes\",\"No\")").unwrap();
/// assert!(parse_formula("=(").is_err());
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let mut parser = FormulaParser::new(tokenize(formula));
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if parser.current_token() != &TokenKind::Eof {
        return Err(FormulaError::Parse(format!(
            "Unexpected {} after expression",
            parser.current_token()
        )));
    }

    Ok(expr)
}

/// Formula parser
struct FormulaParser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl FormulaParser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    // === Helper methods ===

    fn current_token(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn consume(&mut self) -> TokenKind {
        let token = self.current_token().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &TokenKind, message: &str) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume();
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "{}, got {}",
                message,
                self.current_token()
            )))
        }
    }

    fn enter(&mut self) -> FormulaResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(FormulaError::Parse("Formula is nested too deeply".into()));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Comparison: =, <>, <, <=, >, >= (single, not chained)
    // 2. Addition/Subtraction: +, -
    // 3. Multiplication/Division: *, /
    // 4. Unary: +, -
    // 5. Range: :
    // 6. Primary: literals, references, function calls, parentheses

    fn parse_expression(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> FormulaResult<FormulaExpr> {
        let left = self.parse_additive()?;

        let op = match self.current_token() {
            TokenKind::Equal => BinaryOperator::Equal,
            TokenKind::NotEqual => BinaryOperator::NotEqual,
            TokenKind::LessThan => BinaryOperator::LessThan,
            TokenKind::LessEqual => BinaryOperator::LessEqual,
            TokenKind::GreaterThan => BinaryOperator::GreaterThan,
            TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
            _ => return Ok(left),
        };

        self.consume();
        self.enter()?;
        let right = self.parse_additive()?;
        self.leave();

        Ok(FormulaExpr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_additive(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_multiplicative()?;
        let mut chained = 0;

        loop {
            let op = match self.current_token() {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume();
            // The left spine grows one level per operator
            self.enter()?;
            chained += 1;
            let right = self.parse_multiplicative()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.depth -= chained;
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_unary()?;
        let mut chained = 0;

        loop {
            let op = match self.current_token() {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume();
            // The left spine grows one level per operator
            self.enter()?;
            chained += 1;
            let right = self.parse_unary()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.depth -= chained;
        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<FormulaExpr> {
        let op = match self.current_token() {
            TokenKind::Minus => UnaryOperator::Negate,
            TokenKind::Plus => UnaryOperator::Plus,
            _ => return self.parse_range(),
        };

        self.consume();
        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();

        Ok(FormulaExpr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_range(&mut self) -> FormulaResult<FormulaExpr> {
        let left = self.parse_primary()?;

        if !matches!(self.current_token(), TokenKind::Colon) {
            return Ok(left);
        }

        self.consume();
        let right = self.parse_primary()?;

        match (left, right) {
            (FormulaExpr::CellRef(start), FormulaExpr::CellRef(end)) => {
                Ok(FormulaExpr::Range(CellRange::new(start, end)))
            }
            _ => Err(FormulaError::Parse(
                "Range operator ':' requires cell references on both sides".into(),
            )),
        }
    }

    fn parse_primary(&mut self) -> FormulaResult<FormulaExpr> {
        match self.current_token().clone() {
            TokenKind::Number(text) => {
                self.consume();
                text.parse::<f64>()
                    .map(FormulaExpr::Number)
                    .map_err(|_| FormulaError::Parse(format!("Invalid number literal '{}'", text)))
            }

            TokenKind::String(s) => {
                self.consume();
                Ok(FormulaExpr::String(s))
            }

            TokenKind::LeftParen => {
                self.consume();
                self.enter()?;
                let expr = self.parse_expression()?;
                self.leave();
                self.expect(&TokenKind::RightParen, "Expected ')'")?;
                Ok(expr)
            }

            TokenKind::Identifier(name) => {
                self.consume();
                self.parse_identifier(name)
            }

            other => Err(FormulaError::Parse(format!("Unexpected {}", other))),
        }
    }

    fn parse_identifier(&mut self, name: String) -> FormulaResult<FormulaExpr> {
        if matches!(self.current_token(), TokenKind::LeftParen) {
            return self.parse_function_call(name);
        }

        // Bare TRUE / FALSE are zero-argument calls
        let upper = name.to_uppercase();
        if upper == "TRUE" || upper == "FALSE" {
            return Ok(FormulaExpr::Function {
                name: upper,
                args: Vec::new(),
            });
        }

        CellAddress::parse(&name)
            .map(FormulaExpr::CellRef)
            .map_err(|_| FormulaError::Parse(format!("Unknown identifier '{}'", name)))
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<FormulaExpr> {
        self.consume(); // (
        self.enter()?;

        let mut args = Vec::new();

        if !matches!(self.current_token(), TokenKind::RightParen) {
            args.push(self.parse_expression()?);

            while matches!(self.current_token(), TokenKind::Comma) {
                self.consume();
                args.push(self.parse_expression()?);
            }
        }

        self.leave();
        self.expect(&TokenKind::RightParen, "Expected ')' after function arguments")?;

        Ok(FormulaExpr::Function {
            name: name.to_uppercase(),
            args,
        })
    }
}
