//! FILENAME: engine/src/evaluator.rs
//! PURPOSE: Evaluates AST expressions to compute cell values.
//! CONTEXT: After a formula is parsed into an AST, this module traverses
//! the tree and computes the final result. It handles cell lookups with
//! numeric coercion of text values, the arithmetic operators, and the
//! error semantics: an operand error propagates outward, and any
//! non-finite result becomes an arithmetic error.
//!
//! EVALUATION RULES:
//! - Missing or empty referenced cells count as 0.
//! - A text cell whose visible value parses entirely as a finite number
//!   is that number; any other text is a Value error.
//! - A referenced formula cell contributes its (possibly memoized) value,
//!   or its error.
//! - References outside the sheet limits are a Ref error.
//! - Division by zero, overflow, and NaN are Arithmetic errors.

use parser::ast::{BinaryOperator, Expression, UnaryOperator};

use crate::cell::{CellError, CellValue};
use crate::dependency_extractor::resolve_reference;
use crate::sheet::Sheet;

/// Walks expression trees against a sheet. Evaluation is read-only from
/// the borrow checker's perspective; referenced formula cells may still
/// memoize their results through interior mutability.
pub struct Evaluator<'a> {
    sheet: &'a Sheet,
}

impl<'a> Evaluator<'a> {
    pub fn new(sheet: &'a Sheet) -> Self {
        Evaluator { sheet }
    }

    /// Evaluates an AST expression and returns the numeric result.
    pub fn evaluate(&self, expr: &Expression) -> Result<f64, CellError> {
        match expr {
            Expression::Number(n) => Ok(*n),
            Expression::CellRef { col, row } => self.eval_cell_ref(col, *row),
            Expression::UnaryOp { op, operand } => self.eval_unary_op(*op, operand),
            Expression::BinaryOp { left, op, right } => self.eval_binary_op(left, *op, right),
        }
    }

    /// Evaluates a cell reference by looking up its value in the sheet.
    fn eval_cell_ref(&self, col: &str, row: u32) -> Result<f64, CellError> {
        let pos = resolve_reference(col, row);
        if !pos.is_valid() {
            return Err(CellError::Ref);
        }

        let Some(cell) = self.sheet.get_cell(pos) else {
            // Cells that were never written are treated as 0
            return Ok(0.0);
        };

        match cell.value(self.sheet) {
            CellValue::Number(n) => Ok(n),
            CellValue::Text(s) => coerce_text(&s),
            CellValue::Error(e) => Err(e),
        }
    }

    fn eval_unary_op(&self, op: UnaryOperator, operand: &Expression) -> Result<f64, CellError> {
        let value = self.evaluate(operand)?;
        match op {
            UnaryOperator::Plus => Ok(value),
            UnaryOperator::Negate => Ok(-value),
        }
    }

    /// Evaluates both operands (left first, so its error wins) and applies
    /// the operator, rejecting any result that is not a finite real.
    fn eval_binary_op(
        &self,
        left: &Expression,
        op: BinaryOperator,
        right: &Expression,
    ) -> Result<f64, CellError> {
        let lhs = self.evaluate(left)?;
        let rhs = self.evaluate(right)?;

        let value = match op {
            BinaryOperator::Add => lhs + rhs,
            BinaryOperator::Subtract => lhs - rhs,
            BinaryOperator::Multiply => lhs * rhs,
            BinaryOperator::Divide => lhs / rhs,
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(CellError::Arithmetic)
        }
    }
}

/// Coerces the visible text of a referenced cell to a number.
/// Empty text counts as 0; anything else must parse in its entirety as a
/// finite number.
fn coerce_text(text: &str) -> Result<f64, CellError> {
    if text.is_empty() {
        return Ok(0.0);
    }
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(CellError::Value),
    }
}
